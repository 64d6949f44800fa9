//! Tunables for the dubbing pipeline.

use std::time::Duration;

/// Default interval between status polls.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default maximum number of status polls before a job is declared
/// timed out (30 x 5s = a ~150-second overall budget).
const DEFAULT_MAX_ATTEMPTS: u32 = 30;

/// Default timeout for downloading a completed artifact. Independent
/// of the poll interval -- artifacts can be large.
const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Default cap on concurrently pending jobs per listener.
const DEFAULT_MAX_JOBS_PER_LISTENER: usize = 8;

/// Configuration for job polling and dispatch limits.
#[derive(Debug, Clone)]
pub struct DubConfig {
    /// Fixed delay between consecutive status polls for one job.
    pub poll_interval: Duration,
    /// Maximum poll attempts before the job is treated as timed out.
    pub max_attempts: u32,
    /// Timeout applied to the artifact download request.
    pub download_timeout: Duration,
    /// Upper bound on pending jobs per listener; dispatch refuses new
    /// submissions for a listener at the bound instead of queueing
    /// unboundedly behind a slow gateway.
    pub max_jobs_per_listener: usize,
}

impl Default for DubConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
            max_jobs_per_listener: DEFAULT_MAX_JOBS_PER_LISTENER,
        }
    }
}
