mod events;
mod membership;
mod registry;
mod rounds;

pub use rounds::TimerEvent;

use crate::protocol::{RoomInfo, ServerMessage};
use crate::types::*;
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tokio::sync::{mpsc, Mutex, RwLock};

/// Shared application state: the process-wide room registry.
///
/// The outer `RwLock` guards only the id→room map. Each room is its own
/// serialization unit behind a `Mutex`; client actions and timer firings
/// alike mutate a room only while holding its lock, so turn transitions,
/// score updates, and timer expiry never interleave. Lock order is always
/// registry before room.
pub struct AppState {
    pub(crate) rooms: RwLock<HashMap<RoomId, SharedRoom>>,
}

pub type SharedRoom = std::sync::Arc<Mutex<Room>>;

impl AppState {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Look up a live room by id.
    pub async fn room(&self, id: &str) -> Option<SharedRoom> {
        self.rooms.read().await.get(id).cloned()
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// A player who already left but may still reconnect under the same name.
#[derive(Debug, Clone)]
pub struct DepartedPlayer {
    pub name: String,
    pub score: u32,
    pub is_owner: bool,
    pub left_at: Instant,
}

/// One isolated game instance. All fields are mutated only under the room's
/// mutex; `timer_epoch` invalidates every previously scheduled timer when
/// bumped, so a stale firing can never resurrect an ended turn.
pub struct Room {
    pub id: RoomId,
    pub phase: RoomPhase,
    pub settings: RoomSettings,
    /// Vec order is join order; drawer rotation and tiebreaks depend on it
    pub players: Vec<Player>,
    pub current_round: u32,
    pub current_drawer: Option<SessionId>,
    pub current_word: Option<String>,
    pub word_choices: Vec<String>,
    pub guessed: HashSet<SessionId>,
    pub turn_started_at: Option<Instant>,
    pub deadline: Option<chrono::DateTime<chrono::Utc>>,
    pub history: Vec<TurnRecord>,
    pub disconnected_at: HashMap<SessionId, Instant>,
    pub departed: Vec<DepartedPlayer>,
    pub timer_epoch: u64,
    pub(crate) senders: HashMap<SessionId, mpsc::UnboundedSender<ServerMessage>>,
}

impl Room {
    pub fn new(id: RoomId, settings: RoomSettings) -> Self {
        Self {
            id,
            phase: RoomPhase::Lobby,
            settings: settings.normalized(),
            players: Vec::new(),
            current_round: 0,
            current_drawer: None,
            current_word: None,
            word_choices: Vec::new(),
            guessed: HashSet::new(),
            turn_started_at: None,
            deadline: None,
            history: Vec::new(),
            disconnected_at: HashMap::new(),
            departed: Vec::new(),
            timer_epoch: 0,
            senders: HashMap::new(),
        }
    }

    pub fn player(&self, session_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == session_id)
    }

    pub fn player_mut(&mut self, session_id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == session_id)
    }

    pub fn is_drawer(&self, session_id: &str) -> bool {
        self.current_drawer.as_deref() == Some(session_id)
    }

    /// Players sorted by score descending. The sort is stable, so ties
    /// resolve in join order.
    pub fn scoreboard(&self) -> Vec<Player> {
        let mut scores = self.players.clone();
        scores.sort_by(|a, b| b.score.cmp(&a.score));
        scores
    }

    pub fn info(&self) -> RoomInfo {
        RoomInfo {
            id: self.id.clone(),
            phase: self.phase,
            settings: self.settings.clone(),
            players: self.players.clone(),
            current_round: self.current_round,
            current_drawer: self.current_drawer.clone(),
        }
    }

    /// Invalidate any pending timer and return the epoch for the next one.
    pub(crate) fn next_epoch(&mut self) -> u64 {
        self.timer_epoch += 1;
        self.timer_epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_registry() {
        let state = AppState::new();
        assert_eq!(state.room_count().await, 0);
        assert!(state.room("ABC123").await.is_none());
    }

    #[test]
    fn test_scoreboard_ties_resolve_in_join_order() {
        let mut room = Room::new("TEST".to_string(), RoomSettings::default());
        for (id, score) in [("a", 30), ("b", 50), ("c", 50)] {
            room.players.push(Player {
                id: id.to_string(),
                name: id.to_uppercase(),
                score,
                is_owner: false,
            });
        }
        let board = room.scoreboard();
        assert_eq!(board[0].id, "b");
        assert_eq!(board[1].id, "c");
        assert_eq!(board[2].id, "a");
    }

    #[test]
    fn test_settings_are_normalized_at_creation() {
        let room = Room::new(
            "TEST".to_string(),
            RoomSettings {
                rounds: 0,
                draw_seconds: 0,
                max_players: 100,
            },
        );
        assert_eq!(room.settings.rounds, 1);
        assert_eq!(room.settings.draw_seconds, 5);
        assert_eq!(room.settings.max_players, 16);
    }
}
