use crate::types::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    CreateRoom {
        name: String,
        #[serde(default)]
        settings: RoomSettings,
    },
    JoinRoom {
        room_id: RoomId,
        name: String,
    },
    StartGame,
    ChooseWord {
        word: String,
    },
    /// Opaque stroke payload, relayed verbatim to the rest of the room
    Draw {
        payload: Value,
    },
    ClearCanvas,
    Undo {
        payload: Value,
    },
    Redo {
        payload: Value,
    },
    /// Chat doubles as the guess channel during a turn
    Chat {
        message: String,
    },
    Reaction {
        reaction: String,
    },
    ResetGame,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    System,
    Player,
    Close,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    /// First message on every connection
    Welcome {
        protocol: String,
        session_id: SessionId,
        server_now: String,
    },
    RoomCreated {
        room_id: RoomId,
        room: RoomInfo,
    },
    RoomJoined {
        room: RoomInfo,
    },
    PlayersUpdated {
        players: Vec<Player>,
    },
    GameStarted,
    NewTurn {
        round: u32,
        total_rounds: u32,
        drawer: String,
        drawer_id: SessionId,
    },
    /// Sent to the drawer alone with the three candidate words
    ChooseWord {
        words: Vec<String>,
    },
    WordChosen {
        drawer: String,
        drawer_id: SessionId,
        word_hint: String,
        seconds_left: u32,
    },
    /// Private full-word reveal for the drawer
    YourWord {
        word: String,
    },
    Draw {
        payload: Value,
    },
    ClearCanvas,
    Undo {
        payload: Value,
    },
    Redo {
        payload: Value,
    },
    Chat {
        kind: ChatKind,
        #[serde(skip_serializing_if = "Option::is_none")]
        player: Option<String>,
        message: String,
        /// Encouragement line, present only on close guesses
        #[serde(skip_serializing_if = "Option::is_none")]
        encouragement: Option<String>,
    },
    CorrectGuess {
        player: String,
        points: u32,
    },
    TurnEnded {
        word: Option<String>,
        drawer: Option<String>,
        scores: Vec<Player>,
    },
    GameEnded {
        winner: Player,
        scores: Vec<Player>,
        history: Vec<TurnRecord>,
    },
    GameReset,
    Reaction {
        player_id: SessionId,
        reaction: String,
    },
    Error {
        code: String,
        msg: String,
    },
}

/// Public room snapshot sent on create/join and over the HTTP API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomInfo {
    pub id: RoomId,
    pub phase: RoomPhase,
    pub settings: RoomSettings,
    pub players: Vec<Player>,
    pub current_round: u32,
    pub current_drawer: Option<SessionId>,
}
