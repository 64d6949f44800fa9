//! Addressed-emit boundary between the pipeline and the transport.
//!
//! Real-time delivery targets are transient: a listener can vanish
//! between job submission and completion. The contract is therefore
//! no-op-on-absent-destination -- emitting to a connection that no
//! longer exists must neither fail nor propagate an error upstream.

use circle_core::types::ConnId;

use crate::events::WireEvent;

/// Pushes [`WireEvent`]s to connected clients.
///
/// Implemented by the WebSocket connection manager in the API crate
/// and by recording fakes in tests.
#[async_trait::async_trait]
pub trait Emitter: Send + Sync {
    /// Emit an event to a single connection. Silently does nothing if
    /// the connection is gone.
    async fn emit(&self, conn: &str, event: WireEvent);

    /// Emit an event to each connection in a room snapshot.
    async fn emit_many(&self, conns: &[ConnId], event: WireEvent) {
        for conn in conns {
            self.emit(conn, event.clone()).await;
        }
    }
}
