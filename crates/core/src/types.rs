/// Opaque handle for one WebSocket connection (a UUID string assigned
/// at upgrade time). Participants, jobs, and emitted events are all
/// addressed by this handle.
pub type ConnId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
