pub mod handlers;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;
use crate::types::{RoomId, SessionId};

/// One connected client: its session id, the room it has entered (if any),
/// and the channel the room uses to reach it.
pub struct Session {
    pub id: SessionId,
    pub room_id: Option<RoomId>,
    pub tx: mpsc::UnboundedSender<ServerMessage>,
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection for its whole lifetime.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut session = Session {
        id: ulid::Ulid::new().to_string(),
        room_id: None,
        tx,
    };
    tracing::info!("WebSocket connected: session {}", session.id);

    let welcome = ServerMessage::Welcome {
        protocol: "1.0".to_string(),
        session_id: session.id.clone(),
        server_now: chrono::Utc::now().to_rfc3339(),
    };
    if let Ok(msg) = serde_json::to_string(&welcome) {
        if sender.send(Message::Text(msg.into())).await.is_err() {
            tracing::error!("Failed to send welcome message");
            return;
        }
    }

    loop {
        tokio::select! {
            // Outbound: events the room (or our own error path) queued for us
            queued = rx.recv() => {
                match queued {
                    Some(msg) => {
                        if let Ok(json) = serde_json::to_string(&msg) {
                            if sender.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                    }
                    None => break,
                }
            }

            // Inbound: client actions
            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!("Received message: {}", text);

                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => {
                                if let Err(e) =
                                    handlers::handle_message(&state, &mut session, client_msg).await
                                {
                                    // Errors go to the originating client only
                                    let _ = session.tx.send(ServerMessage::from(&e));
                                }
                            }
                            Err(e) => {
                                tracing::error!("Failed to parse client message: {}", e);
                                let _ = session.tx.send(ServerMessage::Error {
                                    code: "PARSE_ERROR".to_string(),
                                    msg: format!("Invalid message format: {}", e),
                                });
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("WebSocket closed: session {}", session.id);
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    // Transport-level disconnect: hand off to the grace-window logic
    if let Some(room_id) = session.room_id.take() {
        state.mark_disconnected(&room_id, &session.id).await;
    }
    tracing::info!("WebSocket connection closed: session {}", session.id);
}
