//! WebSocket message dispatch
//!
//! Routes each client action to the room identified by the caller's
//! session. Actions that need user feedback return a `GameError` (sent back
//! to the caller alone); actions where silence is safe are no-ops when the
//! caller lacks a room or the required role.

use crate::error::GameError;
use crate::protocol::ClientMessage;
use crate::state::AppState;
use crate::ws::Session;
use std::sync::Arc;

pub async fn handle_message(
    state: &Arc<AppState>,
    session: &mut Session,
    msg: ClientMessage,
) -> Result<(), GameError> {
    match msg {
        ClientMessage::CreateRoom { name, settings } => {
            let room_id = state
                .create_room_for(&session.id, &name, settings, session.tx.clone())
                .await?;
            session.room_id = Some(room_id);
            Ok(())
        }

        ClientMessage::JoinRoom { room_id, name } => {
            state
                .join_room(&room_id, &name, &session.id, session.tx.clone())
                .await?;
            session.room_id = Some(room_id);
            Ok(())
        }

        ClientMessage::StartGame => {
            let room_id = session.room_id.as_ref().ok_or(GameError::RoomNotFound)?;
            state.start_game(room_id, &session.id).await
        }

        ClientMessage::ChooseWord { word } => {
            if let Some(room_id) = &session.room_id {
                state.choose_word(room_id, &session.id, word).await;
            }
            Ok(())
        }

        ClientMessage::Draw { payload } => {
            if let Some(room_id) = &session.room_id {
                state.relay_draw(room_id, &session.id, payload).await;
            }
            Ok(())
        }

        ClientMessage::ClearCanvas => {
            if let Some(room_id) = &session.room_id {
                state.relay_clear_canvas(room_id, &session.id).await;
            }
            Ok(())
        }

        ClientMessage::Undo { payload } => {
            if let Some(room_id) = &session.room_id {
                state.relay_undo(room_id, &session.id, payload).await;
            }
            Ok(())
        }

        ClientMessage::Redo { payload } => {
            if let Some(room_id) = &session.room_id {
                state.relay_redo(room_id, &session.id, payload).await;
            }
            Ok(())
        }

        ClientMessage::Chat { message } => {
            if let Some(room_id) = &session.room_id {
                state.submit_guess(room_id, &session.id, message).await;
            }
            Ok(())
        }

        ClientMessage::Reaction { reaction } => {
            if let Some(room_id) = &session.room_id {
                state.relay_reaction(room_id, &session.id, reaction).await;
            }
            Ok(())
        }

        ClientMessage::ResetGame => {
            let room_id = session.room_id.as_ref().ok_or(GameError::RoomNotFound)?;
            state.reset_game(room_id, &session.id).await
        }
    }
}
