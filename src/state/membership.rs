//! Membership: joining, leaving, and the disconnect grace windows.
//!
//! Names are unauthenticated and duplicates are allowed; a reconnection is
//! recognized purely by a matching name inside the grace window, which is
//! good enough for a party game and deliberately nothing more.

use super::{AppState, DepartedPlayer, Room};
use crate::error::GameError;
use crate::protocol::ServerMessage;
use crate::types::*;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// How long a departed player's name can still claim their seat back.
pub const RECONNECT_WINDOW: Duration = Duration::from_secs(120);
/// How long a lobby owner keeps their seat after dropping.
pub const OWNER_LOBBY_GRACE: Duration = Duration::from_secs(30);
/// "left" notices are suppressed for outages shorter than this.
const LEFT_NOTICE_AFTER: Duration = Duration::from_secs(5);
/// "reconnected" notices are suppressed for outages shorter than this.
const RECONNECT_NOTICE_AFTER: Duration = Duration::from_secs(10);

impl AppState {
    /// Create a room and admit the caller as its owner.
    pub async fn create_room_for(
        &self,
        session_id: &str,
        name: &str,
        settings: RoomSettings,
        tx: mpsc::UnboundedSender<ServerMessage>,
    ) -> Result<RoomId, GameError> {
        if name.trim().is_empty() {
            return Err(GameError::InvalidName);
        }

        let (room_id, room) = self.create_room(settings).await;
        let mut room = room.lock().await;
        room.players.push(Player {
            id: session_id.to_string(),
            name: name.to_string(),
            score: 0,
            is_owner: true,
        });
        room.register_sender(session_id.to_string(), tx);
        room.send_to(
            session_id,
            ServerMessage::RoomCreated {
                room_id: room_id.clone(),
                room: room.info(),
            },
        );
        room.broadcast_players();
        tracing::info!("Room {} created by {}", room_id, name);
        Ok(room_id)
    }

    /// Admit a player, re-admitting a recently-disconnected one under the
    /// new session id with score and ownership carried over.
    pub async fn join_room(
        self: &Arc<Self>,
        room_id: &str,
        name: &str,
        session_id: &str,
        tx: mpsc::UnboundedSender<ServerMessage>,
    ) -> Result<(), GameError> {
        if name.trim().is_empty() {
            return Err(GameError::InvalidName);
        }
        let room = self.room(room_id).await.ok_or(GameError::RoomNotFound)?;
        let mut room = room.lock().await;

        // An empty room is mid-teardown
        if room.players.is_empty() {
            return Err(GameError::RoomNotFound);
        }
        if room.players.len() >= room.settings.max_players {
            return Err(GameError::RoomFull);
        }

        room.departed
            .retain(|d| d.left_at.elapsed() <= RECONNECT_WINDOW);

        // Reconnection candidate: a retained entry still inside its grace
        // window (lobby owner), or a departed record under the same name.
        let mut carried: Option<(u32, bool, Instant)> = None;
        let retained = room.players.iter().position(|p| {
            p.name == name
                && room
                    .disconnected_at
                    .get(&p.id)
                    .is_some_and(|t| t.elapsed() <= RECONNECT_WINDOW)
        });
        if let Some(idx) = retained {
            let old = room.players.remove(idx);
            let since = room.disconnected_at.remove(&old.id);
            room.unregister_sender(&old.id);
            carried = Some((old.score, old.is_owner, since.unwrap_or_else(Instant::now)));
        } else if let Some(idx) = room.departed.iter().position(|d| d.name == name) {
            let d = room.departed.remove(idx);
            carried = Some((d.score, d.is_owner, d.left_at));
        }

        let reconnection = carried.is_some();
        let (score, is_owner, since) = carried.unwrap_or((0, false, Instant::now()));

        room.players.push(Player {
            id: session_id.to_string(),
            name: name.to_string(),
            score,
            is_owner,
        });
        room.register_sender(session_id.to_string(), tx);
        room.send_to(session_id, ServerMessage::RoomJoined { room: room.info() });
        room.broadcast_players();

        if !reconnection {
            room.system_chat(format!("{} joined the room", name));
        } else if since.elapsed() > RECONNECT_NOTICE_AFTER {
            room.system_chat(format!("{} reconnected", name));
        } else {
            tracing::debug!("{} quick reconnection - no notice sent", name);
        }
        Ok(())
    }

    /// Record a transport-level disconnect. A lobby owner keeps their seat
    /// for a grace period; everyone else is removed immediately. If the
    /// active drawer drops mid-game the current turn is force-ended.
    pub async fn mark_disconnected(self: &Arc<Self>, room_id: &str, session_id: &str) {
        let Some(room) = self.room(room_id).await else {
            return;
        };
        let mut room = room.lock().await;
        room.unregister_sender(session_id);

        let Some(player) = room.player(session_id).cloned() else {
            return;
        };
        room.disconnected_at
            .insert(session_id.to_string(), Instant::now());

        if player.is_owner && room.phase == RoomPhase::Lobby {
            tracing::info!(
                "Owner {} disconnected from room {}, keeping seat for {:?}",
                player.name,
                room_id,
                OWNER_LOBBY_GRACE
            );
            let state = self.clone();
            let room_id = room_id.to_string();
            let session_id = session_id.to_string();
            tokio::spawn(async move {
                tokio::time::sleep(OWNER_LOBBY_GRACE).await;
                state.purge_disconnected(&room_id, &session_id).await;
            });
            return;
        }

        self.remove_member_locked(&mut room, session_id);
        let empty = room.players.is_empty();
        drop(room);
        if empty {
            self.remove_room_if_empty(room_id).await;
        }
    }

    /// Grace-period expiry for a retained seat. A no-op if the player
    /// reconnected (the disconnect record is gone) or was already removed.
    pub(crate) async fn purge_disconnected(self: &Arc<Self>, room_id: &str, session_id: &str) {
        let Some(room) = self.room(room_id).await else {
            return;
        };
        let mut room = room.lock().await;
        if !room.disconnected_at.contains_key(session_id) || room.player(session_id).is_none() {
            return;
        }

        self.remove_member_locked(&mut room, session_id);
        let empty = room.players.is_empty();
        drop(room);
        if empty {
            self.remove_room_if_empty(room_id).await;
        }
    }

    /// Remove a member, keep their record for reconnection, and notify the
    /// room. Caller handles empty-room teardown after releasing the lock.
    fn remove_member_locked(self: &Arc<Self>, room: &mut Room, session_id: &str) {
        let Some(idx) = room.players.iter().position(|p| p.id == session_id) else {
            return;
        };
        let player = room.players.remove(idx);
        room.guessed.remove(session_id);
        let since = room
            .disconnected_at
            .remove(session_id)
            .unwrap_or_else(Instant::now);
        room.departed.push(DepartedPlayer {
            name: player.name.clone(),
            score: player.score,
            is_owner: player.is_owner,
            left_at: since,
        });

        if since.elapsed() > LEFT_NOTICE_AFTER {
            room.system_chat(format!("{} left the room", player.name));
        }
        room.broadcast_players();

        if room.phase == RoomPhase::Playing && room.current_drawer.as_deref() == Some(session_id) {
            tracing::info!("Drawer {} left room {}, ending turn", player.name, room.id);
            self.end_turn_locked(room);
        }
    }
}
