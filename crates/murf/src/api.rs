//! REST API client for the Murf dubbing endpoints.
//!
//! Wraps the Murf HTTP API (job creation, status polling, artifact
//! download) using [`reqwest`].

use std::time::Duration;

use serde::Deserialize;

use crate::status::StatusResponse;

/// Default base URL for the Murf API.
pub const DEFAULT_API_URL: &str = "https://api.murf.ai";

/// HTTP client for the Murf dubbing service.
pub struct MurfDubApi {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

/// Response returned by the job-creation endpoint after successfully
/// queuing a dub.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    /// Server-assigned identifier for the dubbing job.
    pub job_id: String,
}

/// Errors from the Murf REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum MurfApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Murf returned a non-2xx status code.
    #[error("Murf API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl MurfDubApi {
    /// Create a new API client.
    ///
    /// * `api_url` - Base HTTP URL, e.g. `https://api.murf.ai`.
    /// * `api_key` - Account API key, sent as the `api-key` header.
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
        }
    }

    /// Create an API client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling).
    pub fn with_client(client: reqwest::Client, api_url: String, api_key: String) -> Self {
        Self {
            client,
            api_url,
            api_key,
        }
    }

    /// Submit an audio clip for dubbing into `target_locale`.
    ///
    /// Sends a multipart `POST /v1/murfdub/jobs/create` request with the
    /// raw audio bytes. Returns the server-assigned `job_id`.
    pub async fn create_job(
        &self,
        audio: Vec<u8>,
        target_locale: &str,
        file_name: &str,
        priority: &str,
    ) -> Result<SubmitResponse, MurfApiError> {
        let file_part = reqwest::multipart::Part::bytes(audio)
            .file_name(file_name.to_string())
            .mime_str("audio/wav")?;

        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("file_name", file_name.to_string())
            .text("target_locales", target_locale.to_string())
            .text("priority", priority.to_string());

        let response = self
            .client
            .post(format!("{}/v1/murfdub/jobs/create", self.api_url))
            .header("api-key", &self.api_key)
            .multipart(form)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Retrieve the current status of a dubbing job.
    ///
    /// Sends a `GET /v1/murfdub/jobs/{job_id}/status` request. The
    /// returned payload carries the lifecycle status and, once
    /// completed, the artifact download URLs.
    pub async fn job_status(&self, job_id: &str) -> Result<StatusResponse, MurfApiError> {
        let response = self
            .client
            .get(format!("{}/v1/murfdub/jobs/{}/status", self.api_url, job_id))
            .header("api-key", &self.api_key)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Download a dubbed-audio artifact from its signed URL.
    ///
    /// The `timeout` here is independent of the poll interval: artifact
    /// downloads can be large and must not inherit the short
    /// status-check budget.
    pub async fn download_artifact(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<Vec<u8>, MurfApiError> {
        let response = self.client.get(url).timeout(timeout).send().await?;

        let response = Self::ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`MurfApiError::Api`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, MurfApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(MurfApiError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, MurfApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
