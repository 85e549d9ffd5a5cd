//! Event delivery for a room: broadcast, broadcast-except-sender, and
//! unicast. Delivery is fire-and-forget; a session that is gone simply
//! receives nothing.

use super::{AppState, Room};
use crate::protocol::{ChatKind, ServerMessage};
use crate::types::{RoomPhase, SessionId};
use serde_json::Value;
use tokio::sync::mpsc;

impl Room {
    pub(crate) fn register_sender(
        &mut self,
        session_id: SessionId,
        tx: mpsc::UnboundedSender<ServerMessage>,
    ) {
        self.senders.insert(session_id, tx);
    }

    pub(crate) fn unregister_sender(&mut self, session_id: &str) {
        self.senders.remove(session_id);
    }

    /// Deliver to every connected member.
    pub fn broadcast(&self, msg: ServerMessage) {
        for tx in self.senders.values() {
            let _ = tx.send(msg.clone());
        }
    }

    /// Deliver to everyone except the originating session. Used to relay
    /// strokes so the origin does not double-apply its own action.
    pub fn broadcast_except(&self, except: &str, msg: ServerMessage) {
        for (id, tx) in &self.senders {
            if id != except {
                let _ = tx.send(msg.clone());
            }
        }
    }

    /// Deliver to a single session, e.g. the private word reveal.
    pub fn send_to(&self, session_id: &str, msg: ServerMessage) {
        if let Some(tx) = self.senders.get(session_id) {
            let _ = tx.send(msg);
        }
    }

    pub fn broadcast_players(&self) {
        self.broadcast(ServerMessage::PlayersUpdated {
            players: self.players.clone(),
        });
    }

    pub fn system_chat(&self, message: impl Into<String>) {
        self.broadcast(ServerMessage::Chat {
            kind: ChatKind::System,
            player: None,
            message: message.into(),
            encouragement: None,
        });
    }
}

impl AppState {
    /// Relay a stroke to everyone but its author. Drawer-only; stray
    /// events from anyone else are dropped without comment.
    pub async fn relay_draw(&self, room_id: &str, session_id: &str, payload: Value) {
        let Some(room) = self.room(room_id).await else {
            return;
        };
        let room = room.lock().await;
        if room.is_drawer(session_id) {
            room.broadcast_except(session_id, ServerMessage::Draw { payload });
        }
    }

    /// A canvas wipe goes to the whole room, sender included, so every
    /// client converges on the same blank state.
    pub async fn relay_clear_canvas(&self, room_id: &str, session_id: &str) {
        let Some(room) = self.room(room_id).await else {
            return;
        };
        let room = room.lock().await;
        if room.is_drawer(session_id) {
            room.broadcast(ServerMessage::ClearCanvas);
        }
    }

    pub async fn relay_undo(&self, room_id: &str, session_id: &str, payload: Value) {
        let Some(room) = self.room(room_id).await else {
            return;
        };
        let room = room.lock().await;
        if room.is_drawer(session_id) {
            room.broadcast_except(session_id, ServerMessage::Undo { payload });
        }
    }

    pub async fn relay_redo(&self, room_id: &str, session_id: &str, payload: Value) {
        let Some(room) = self.room(room_id).await else {
            return;
        };
        let room = room.lock().await;
        if room.is_drawer(session_id) {
            room.broadcast_except(session_id, ServerMessage::Redo { payload });
        }
    }

    /// Audience reactions during play; the drawer cannot react to their
    /// own drawing.
    pub async fn relay_reaction(&self, room_id: &str, session_id: &str, reaction: String) {
        let Some(room) = self.room(room_id).await else {
            return;
        };
        let room = room.lock().await;
        if room.phase == RoomPhase::Playing
            && !room.is_drawer(session_id)
            && room.player(session_id).is_some()
        {
            room.broadcast(ServerMessage::Reaction {
                player_id: session_id.to_string(),
                reaction,
            });
        }
    }
}
