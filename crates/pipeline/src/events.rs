//! Outbound wire events pushed to WebSocket clients.
//!
//! Serialized as JSON objects with a `type` discriminator, e.g.
//! `{"type":"dubbing_status","status":"processing",...}`. These are the
//! only payload shapes the pipeline ever emits.

use circle_core::types::Timestamp;
use serde::{Deserialize, Serialize};

/// One entry in a room roster snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub username: String,
    /// The language this participant currently listens in.
    pub language: String,
}

/// A text chat message stored in the in-memory room log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub username: String,
    pub message: String,
    pub timestamp: Timestamp,
    pub language: String,
}

/// A pending dub job as reported to its owning listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingJob {
    pub job_id: String,
    pub speaker: String,
    pub status: String,
    pub created_at: Timestamp,
}

/// An event addressed to one connection or broadcast to a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireEvent {
    /// Verbatim relay of an utterance to a same-language listener.
    VoiceMessage {
        speaker: String,
        /// Base64-encoded audio payload, exactly as the speaker sent it.
        audio_data: String,
        language: String,
        timestamp: Timestamp,
        message_id: String,
        source_language: String,
        format: String,
    },

    /// Progress notice for a dub in flight (`queued` / `processing`).
    DubbingStatus {
        status: String,
        message: String,
        speaker: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        job_id: Option<String>,
    },

    /// Terminal failure notice for one dub job.
    DubbingError { error: String, speaker: String },

    /// The dubbed rendering of an utterance, addressed to its listener.
    TranslatedAudio {
        /// Base64-encoded artifact in whatever format the service produced.
        audio_data: String,
        speaker: String,
        target_language: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        message_id: Option<String>,
    },

    /// Room roster update after a join.
    UserJoined {
        username: String,
        language: String,
        users: Vec<RosterEntry>,
    },

    /// Room roster update after a leave/disconnect.
    UserLeft { users: Vec<RosterEntry> },

    /// Recent chat log replayed to a joining participant.
    ChatHistory { messages: Vec<ChatMessage> },

    /// A new chat message broadcast to the room.
    NewMessage { message: ChatMessage },

    /// Typing indicator relayed to the rest of the room.
    UserTyping { username: String, typing: bool },

    /// Snapshot of the listener's still-pending dub jobs.
    PendingJobsList { jobs: Vec<PendingJob> },

    /// A request-level error addressed to the sender.
    Error { message: String },
}

impl WireEvent {
    /// Wire name of the event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::VoiceMessage { .. } => "voice_message",
            Self::DubbingStatus { .. } => "dubbing_status",
            Self::DubbingError { .. } => "dubbing_error",
            Self::TranslatedAudio { .. } => "translated_audio",
            Self::UserJoined { .. } => "user_joined",
            Self::UserLeft { .. } => "user_left",
            Self::ChatHistory { .. } => "chat_history",
            Self::NewMessage { .. } => "new_message",
            Self::UserTyping { .. } => "user_typing",
            Self::PendingJobsList { .. } => "pending_jobs_list",
            Self::Error { .. } => "error",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
