use super::{AppState, Room, SharedRoom};
use crate::types::*;
use rand::Rng;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Safe character set for room codes (excludes 0/O, 1/I/L to avoid confusion)
const CODE_CHARS: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const CODE_LENGTH: usize = 6;

fn generate_room_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_CHARS[rng.random_range(0..CODE_CHARS.len())] as char)
        .collect()
}

impl AppState {
    /// Create a room with a code unique among currently-live rooms.
    pub async fn create_room(&self, settings: RoomSettings) -> (RoomId, SharedRoom) {
        let mut rooms = self.rooms.write().await;

        // Collision retry; practically a single iteration at this pool size
        let id = loop {
            let code = generate_room_code();
            if !rooms.contains_key(&code) {
                break code;
            }
        };

        let room = Arc::new(Mutex::new(Room::new(id.clone(), settings)));
        rooms.insert(id.clone(), room.clone());
        tracing::info!("Created room {} ({} rooms live)", id, rooms.len());
        (id, room)
    }

    /// Drop a room once its last member is gone. Re-checks emptiness under
    /// the registry write lock so a concurrent join cannot be lost.
    pub(crate) async fn remove_room_if_empty(&self, room_id: &str) {
        let mut rooms = self.rooms.write().await;
        if let Some(room) = rooms.get(room_id) {
            let empty = room.lock().await.players.is_empty();
            if empty {
                rooms.remove(room_id);
                tracing::info!("Cleaning up empty room: {}", room_id);
            }
        }
    }
}
