//! The dubbing-service boundary as a trait.
//!
//! The orchestration pipeline only ever touches the external service
//! through [`DubbingGateway`], so tests can script status sequences
//! without a live API.

use std::time::Duration;

use crate::api::{MurfApiError, MurfDubApi, SubmitResponse};
use crate::status::StatusResponse;

/// Submit / poll / fetch contract of the external dubbing service.
#[async_trait::async_trait]
pub trait DubbingGateway: Send + Sync {
    /// Submit an audio clip for dubbing; returns the queued job.
    async fn submit(
        &self,
        audio: Vec<u8>,
        target_locale: &str,
        file_name: &str,
        priority: &str,
    ) -> Result<SubmitResponse, MurfApiError>;

    /// Check the current status of a submitted job.
    async fn status(&self, job_id: &str) -> Result<StatusResponse, MurfApiError>;

    /// Download a completed artifact from its signed URL.
    async fn download(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, MurfApiError>;
}

#[async_trait::async_trait]
impl DubbingGateway for MurfDubApi {
    async fn submit(
        &self,
        audio: Vec<u8>,
        target_locale: &str,
        file_name: &str,
        priority: &str,
    ) -> Result<SubmitResponse, MurfApiError> {
        self.create_job(audio, target_locale, file_name, priority)
            .await
    }

    async fn status(&self, job_id: &str) -> Result<StatusResponse, MurfApiError> {
        self.job_status(job_id).await
    }

    async fn download(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, MurfApiError> {
        self.download_artifact(url, timeout).await
    }
}
