//! Translation/dubbing job orchestration.
//!
//! Everything between the transport layer and the external dubbing
//! service lives here: the room registry, the in-flight job tracker,
//! the per-job poll tasks, the dispatch orchestrator that routes each
//! utterance (verbatim relay vs. dub job), and result delivery back to
//! the owning listener.

pub mod chat;
pub mod config;
pub mod delivery;
pub mod dispatch;
pub mod emitter;
pub mod error;
pub mod events;
pub mod poller;
pub mod registry;
pub mod tracker;

pub use chat::ChatLog;
pub use config::DubConfig;
pub use dispatch::Dispatcher;
pub use emitter::Emitter;
pub use error::DubError;
pub use events::WireEvent;
pub use registry::{Participant, RoomRegistry};
pub use tracker::{JobPhase, JobTracker, TrackerError, TranslationJob};
