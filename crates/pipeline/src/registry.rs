//! Room and participant bookkeeping.
//!
//! Pure in-memory mapping behind one `RwLock`. Mutated only by the
//! connection-lifecycle path (join/leave/set_language), never by
//! pollers, so no cross-component lock ordering exists.

use std::collections::HashMap;

use circle_core::types::ConnId;
use tokio::sync::RwLock;

/// One participant of a room.
#[derive(Debug, Clone)]
pub struct Participant {
    /// Connection handle this participant is reachable on.
    pub conn: ConnId,
    pub username: String,
    pub room_id: String,
    /// The language this participant speaks.
    pub language: String,
    /// The language this participant listens in. Starts equal to
    /// `language`; changed independently via `set_language` to support
    /// listen-in-a-different-language.
    pub target_language: String,
}

#[derive(Default)]
struct RegistryInner {
    /// Participants per room.
    rooms: HashMap<String, Vec<Participant>>,
    /// Connection handle to its participant record.
    sessions: HashMap<ConnId, Participant>,
}

/// Tracks which participants are in which room and their languages.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc`
/// and shared between the transport layer and the dispatcher.
#[derive(Default)]
pub struct RoomRegistry {
    inner: RwLock<RegistryInner>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a participant to a room.
    ///
    /// Idempotent per display name: if the same username rejoins the
    /// room (reconnect without a clean disconnect), the stale entry is
    /// replaced. Returns the stored participant record.
    pub async fn join(
        &self,
        room_id: &str,
        conn: &str,
        username: &str,
        language: &str,
    ) -> Participant {
        let participant = Participant {
            conn: conn.to_string(),
            username: username.to_string(),
            room_id: room_id.to_string(),
            language: language.to_string(),
            target_language: language.to_string(),
        };

        let mut inner = self.inner.write().await;
        let members = inner.rooms.entry(room_id.to_string()).or_default();
        members.retain(|p| p.username != username && p.conn != conn);
        members.push(participant.clone());
        inner.sessions.insert(conn.to_string(), participant.clone());
        participant
    }

    /// Remove a connection from every room it was recorded in.
    ///
    /// Scans all rooms rather than trusting the session's `room_id`,
    /// defending against inconsistent bookkeeping. Returns the ids of
    /// the rooms the connection was actually removed from. No-op if
    /// the connection is unknown.
    pub async fn leave(&self, conn: &str) -> Vec<String> {
        let mut inner = self.inner.write().await;
        let mut affected = Vec::new();
        for (room_id, members) in inner.rooms.iter_mut() {
            let before = members.len();
            members.retain(|p| p.conn != conn);
            if members.len() != before {
                affected.push(room_id.clone());
            }
        }
        inner.sessions.remove(conn);
        affected
    }

    /// Snapshot of a room's participants, excluding one connection.
    pub async fn listeners_of(&self, room_id: &str, excluding: &str) -> Vec<Participant> {
        let inner = self.inner.read().await;
        inner
            .rooms
            .get(room_id)
            .map(|members| {
                members
                    .iter()
                    .filter(|p| p.conn != excluding)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Snapshot of all participants currently in a room.
    pub async fn roster(&self, room_id: &str) -> Vec<Participant> {
        let inner = self.inner.read().await;
        inner.rooms.get(room_id).cloned().unwrap_or_default()
    }

    /// Look up the participant record for a connection.
    pub async fn session(&self, conn: &str) -> Option<Participant> {
        self.inner.read().await.sessions.get(conn).cloned()
    }

    /// Change the language a participant listens in.
    ///
    /// Affects future dub routing only; in-flight jobs keep the target
    /// language they were submitted with. No-op for unknown connections.
    pub async fn set_language(&self, conn: &str, language: &str) {
        let mut inner = self.inner.write().await;
        if let Some(session) = inner.sessions.get_mut(conn) {
            session.target_language = language.to_string();
        }
        for members in inner.rooms.values_mut() {
            for p in members.iter_mut() {
                if p.conn == conn {
                    p.target_language = language.to_string();
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
