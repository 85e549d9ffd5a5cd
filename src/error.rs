use crate::protocol::ServerMessage;
use thiserror::Error;

/// Recoverable game errors, surfaced to the originating client only.
/// None of these take down a room or the process.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("Room not found. Please create a new room or check the room code.")]
    RoomNotFound,
    #[error("Room is full")]
    RoomFull,
    #[error("Player name is required. Please enter your name and try again.")]
    InvalidName,
    #[error("Only the room owner can do that")]
    NotOwner,
    #[error("Only the current drawer can do that")]
    NotDrawer,
    #[error("Need at least 2 players to start the game!")]
    InsufficientPlayers,
    #[error("That action is not available right now")]
    InvalidState,
}

impl GameError {
    /// Stable machine-readable code for clients.
    pub fn code(&self) -> &'static str {
        match self {
            GameError::RoomNotFound => "ROOM_NOT_FOUND",
            GameError::RoomFull => "ROOM_FULL",
            GameError::InvalidName => "INVALID_NAME",
            GameError::NotOwner => "NOT_OWNER",
            GameError::NotDrawer => "NOT_DRAWER",
            GameError::InsufficientPlayers => "INSUFFICIENT_PLAYERS",
            GameError::InvalidState => "INVALID_STATE",
        }
    }
}

impl From<&GameError> for ServerMessage {
    fn from(e: &GameError) -> Self {
        ServerMessage::Error {
            code: e.code().to_string(),
            msg: e.to_string(),
        }
    }
}
