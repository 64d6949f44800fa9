//! In-memory per-room chat log.
//!
//! Messages live only for the lifetime of the process; there is no
//! persistence layer. Joining participants get the recent tail of the
//! log replayed as `chat_history`.

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::events::ChatMessage;

/// How many messages are replayed to a joining participant.
const REPLAY_LIMIT: usize = 50;

/// Cap on stored messages per room; older messages are dropped.
const ROOM_LOG_CAP: usize = 500;

/// Per-room message log behind a single mutex.
#[derive(Default)]
pub struct ChatLog {
    rooms: Mutex<HashMap<String, Vec<ChatMessage>>>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to a room's log.
    pub async fn append(&self, room_id: &str, message: ChatMessage) {
        let mut rooms = self.rooms.lock().await;
        let log = rooms.entry(room_id.to_string()).or_default();
        log.push(message);
        if log.len() > ROOM_LOG_CAP {
            let excess = log.len() - ROOM_LOG_CAP;
            log.drain(..excess);
        }
    }

    /// The most recent messages of a room, oldest first.
    pub async fn recent(&self, room_id: &str) -> Vec<ChatMessage> {
        let rooms = self.rooms.lock().await;
        match rooms.get(room_id) {
            Some(log) => {
                let start = log.len().saturating_sub(REPLAY_LIMIT);
                log[start..].to_vec()
            }
            None => Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
