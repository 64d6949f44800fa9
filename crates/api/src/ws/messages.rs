//! Inbound client messages.
//!
//! JSON objects with a `type` discriminator, the inbound counterpart
//! of the pipeline's `WireEvent`. Unknown or malformed messages are
//! answered with an `error` event rather than closing the connection.

use serde::Deserialize;

fn default_format() -> String {
    "wav".to_string()
}

/// A message received from a connected client.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Join a room (idempotent per username within the room).
    JoinCircle {
        room_id: String,
        username: String,
        language: String,
    },

    /// An utterance to relay/translate to the rest of the room.
    AudioData {
        room_id: String,
        /// Base64-encoded audio payload.
        audio: String,
        /// Container format of the payload, for client-side playback.
        #[serde(default = "default_format")]
        format: String,
    },

    /// A text chat message for the sender's room.
    SendMessage { message: String },

    /// Typing indicator for the sender's room.
    Typing {
        #[serde(default)]
        typing: bool,
    },

    /// Change the language the sender listens in.
    SetLanguage { language: String },

    /// Ask for the sender's still-pending dub jobs.
    GetPendingJobs,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
