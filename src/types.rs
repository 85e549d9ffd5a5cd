use serde::{Deserialize, Serialize};

/// Opaque ID types for type safety
pub type RoomId = String;
pub type SessionId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoomPhase {
    Lobby,
    Playing,
    Ended,
}

/// Per-room game settings, fixed at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSettings {
    pub rounds: u32,
    pub draw_seconds: u32,
    pub max_players: usize,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            rounds: 3,
            draw_seconds: 80,
            max_players: 8,
        }
    }
}

impl RoomSettings {
    /// Clamp settings into a usable range. `draw_seconds` feeds score
    /// arithmetic as a divisor and must stay positive.
    pub fn normalized(mut self) -> Self {
        self.rounds = self.rounds.max(1);
        self.draw_seconds = self.draw_seconds.max(5);
        self.max_players = self.max_players.clamp(2, 16);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: SessionId,
    pub name: String,
    pub score: u32,
    pub is_owner: bool,
}

/// One concluded turn, appended to the room history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRecord {
    pub round: u32,
    /// None when the turn ended before a word was chosen
    pub word: Option<String>,
    pub drawer: Option<String>,
    pub guessers: Vec<String>,
    pub ended_at: String,
}
