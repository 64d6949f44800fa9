use std::sync::Arc;

use circle_pipeline::{ChatLog, Dispatcher, JobTracker, RoomRegistry};

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (browser clients).
    pub ws_manager: Arc<WsManager>,
    /// Room and participant bookkeeping.
    pub registry: Arc<RoomRegistry>,
    /// In-flight dub job table.
    pub tracker: Arc<JobTracker>,
    /// In-memory chat logs per room.
    pub chat: Arc<ChatLog>,
    /// Utterance routing and dub-job creation.
    pub dispatcher: Arc<Dispatcher>,
}
