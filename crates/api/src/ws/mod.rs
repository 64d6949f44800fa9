//! WebSocket infrastructure for real-time communication.
//!
//! Provides connection management, heartbeat monitoring, the HTTP
//! upgrade handler, and inbound client-message dispatch.

mod handler;
mod heartbeat;
pub mod manager;
pub mod messages;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
