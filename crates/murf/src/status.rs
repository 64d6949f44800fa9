//! Typed status payloads returned by the dubbing API.

use serde::Deserialize;

/// Lifecycle status of a dubbing job as reported by the service.
///
/// Statuses the service may add later deserialize into
/// [`DubJobStatus::Other`] and are treated as non-terminal by the
/// poller, so an API extension never strands a job in a panic path.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DubJobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
    #[serde(untagged)]
    Other(String),
}

impl DubJobStatus {
    /// Whether this status ends the job's lifecycle at the gateway.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// One downloadable artifact produced by a completed job.
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadDetail {
    /// URL for fetching the dubbed audio.
    pub download_url: String,
    /// Locale of this artifact (one job can target several).
    #[serde(default)]
    pub locale: Option<String>,
}

/// Response from the job status endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    /// Server-assigned job identifier.
    pub job_id: String,
    /// Current lifecycle status.
    pub status: DubJobStatus,
    /// Present once the job has completed.
    #[serde(default)]
    pub download_details: Vec<DownloadDetail>,
    /// Error description when `status` is `FAILED`.
    #[serde(default)]
    pub failure_reason: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
