use std::sync::Arc;
use std::time::Duration;

use crate::ws::manager::WsManager;

/// Spawn a background task that sends a Ping frame to every connected
/// client at a fixed interval.
///
/// A listener waiting on a slow dub can legitimately send nothing for
/// minutes; the ping keeps idle proxies from reaping the connection
/// mid-job. The interval is a `ServerConfig` tunable
/// (`HEARTBEAT_INTERVAL_SECS`). The task runs until the returned handle
/// is aborted, which main does after the graceful-shutdown drain.
pub fn start_heartbeat(
    ws_manager: Arc<WsManager>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);

        loop {
            ticker.tick().await;
            let connections = ws_manager.connection_count().await;
            if connections > 0 {
                tracing::debug!(connections, "Pinging connected clients");
            }
            ws_manager.ping_all().await;
        }
    })
}
