//! Room registry: creates, finds, and tears down room actors by code.

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::actor::{spawn_room, RoomHandle};

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

struct RoomEntry {
    handle: RoomHandle,
    /// Live connections addressed to this room. The room exists exactly
    /// as long as this is non-zero.
    connections: usize,
}

/// Tracks every active room and the number of connections attached to
/// each one.
///
/// Rooms are created lazily by the first connection to a code and torn
/// down when the last connection leaves: the registry drops the last
/// long-lived handle, the actor's channel closes, and its task exits.
/// Rooms hold no cross-room state, so the registry is the only shared
/// structure in the server.
pub struct RoomRegistry {
    rooms: Mutex<HashMap<String, RoomEntry>>,
}

impl RoomRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self { rooms: Mutex::new(HashMap::new()) }
    }

    /// Registers a new connection to `code` and returns the room's
    /// handle, spawning the room actor if this is the first connection.
    pub async fn connect(&self, code: &str) -> RoomHandle {
        let mut rooms = self.rooms.lock().await;
        let entry =
            rooms.entry(code.to_string()).or_insert_with(|| {
                tracing::info!(room = %code, "room created");
                RoomEntry {
                    handle: spawn_room(code, DEFAULT_CHANNEL_SIZE),
                    connections: 0,
                }
            });
        entry.connections += 1;
        entry.handle.clone()
    }

    /// Unregisters one connection from `code`, tearing the room down
    /// when none remain.
    pub async fn disconnect(&self, code: &str) {
        let mut rooms = self.rooms.lock().await;
        if let Some(entry) = rooms.get_mut(code) {
            entry.connections -= 1;
            if entry.connections == 0 {
                rooms.remove(code);
                tracing::info!(room = %code, "room torn down");
            }
        }
    }

    /// Number of active rooms.
    pub async fn room_count(&self) -> usize {
        self.rooms.lock().await.len()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
