//! In-flight dubbing job table.
//!
//! One entry per submitted dub request, keyed by the opaque job id the
//! gateway returned. All access serializes through a single mutex;
//! reads hand out clones so callers never iterate under the lock.

use std::collections::HashMap;

use chrono::Utc;
use circle_core::types::{ConnId, Timestamp};
use serde::Serialize;
use tokio::sync::Mutex;

/// Lifecycle phase of a tracked job.
///
/// An entry is removed from the tracker when it reaches a terminal
/// phase, so in practice pending entries are always `Processing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobPhase {
    Processing,
    Completed,
    Failed,
}

impl JobPhase {
    /// Wire rendering of the phase.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// One in-flight dubbing request.
#[derive(Debug, Clone)]
pub struct TranslationJob {
    /// Opaque identifier assigned by the gateway.
    pub job_id: String,
    /// Connection that will receive the result.
    pub listener: ConnId,
    /// Display name of the speaker, for client-side attribution.
    pub speaker: String,
    /// Language the result is being dubbed into.
    pub target_language: String,
    pub status: JobPhase,
    pub created_at: Timestamp,
    /// Correlates the eventual audio with the original utterance.
    pub message_id: Option<String>,
}

impl TranslationJob {
    pub fn new(
        job_id: impl Into<String>,
        listener: impl Into<ConnId>,
        speaker: impl Into<String>,
        target_language: impl Into<String>,
        message_id: Option<String>,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            listener: listener.into(),
            speaker: speaker.into(),
            target_language: target_language.into(),
            status: JobPhase::Processing,
            created_at: Utc::now(),
            message_id,
        }
    }
}

/// Errors from the job tracker.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// The gateway guarantees unique job ids; a duplicate means the
    /// invariant was violated upstream and the job must not be tracked
    /// twice (two pollers would race on one entry).
    #[error("job {0} is already registered")]
    DuplicateJob(String),

    /// The listener already has the maximum number of pending jobs.
    #[error("listener {0} is at the pending-job bound")]
    ListenerAtCapacity(ConnId),
}

/// Owns the table of in-flight jobs.
#[derive(Default)]
pub struct JobTracker {
    jobs: Mutex<HashMap<String, TranslationJob>>,
}

impl JobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new job. Fails if the job id is already present.
    pub async fn register(&self, job: TranslationJob) -> Result<(), TrackerError> {
        let mut jobs = self.jobs.lock().await;
        if jobs.contains_key(&job.job_id) {
            return Err(TrackerError::DuplicateJob(job.job_id));
        }
        jobs.insert(job.job_id.clone(), job);
        Ok(())
    }

    /// Insert a new job unless the listener already has
    /// `max_per_listener` pending entries.
    ///
    /// The count check and the insert happen under one lock, so
    /// concurrent registrations for the same listener can never exceed
    /// the bound.
    pub async fn register_bounded(
        &self,
        job: TranslationJob,
        max_per_listener: usize,
    ) -> Result<(), TrackerError> {
        let mut jobs = self.jobs.lock().await;
        if jobs.contains_key(&job.job_id) {
            return Err(TrackerError::DuplicateJob(job.job_id));
        }
        let pending = jobs
            .values()
            .filter(|j| j.listener == job.listener)
            .count();
        if pending >= max_per_listener {
            return Err(TrackerError::ListenerAtCapacity(job.listener));
        }
        jobs.insert(job.job_id.clone(), job);
        Ok(())
    }

    /// Look up a job by id.
    pub async fn get(&self, job_id: &str) -> Option<TranslationJob> {
        self.jobs.lock().await.get(job_id).cloned()
    }

    /// Remove a job. Idempotent -- retiring an absent id is a no-op.
    pub async fn retire(&self, job_id: &str) {
        self.jobs.lock().await.remove(job_id);
    }

    /// Snapshot of all jobs owned by one listener connection.
    pub async fn jobs_for(&self, listener: &str) -> Vec<TranslationJob> {
        self.jobs
            .lock()
            .await
            .values()
            .filter(|job| job.listener == listener)
            .cloned()
            .collect()
    }

    /// Number of jobs currently in flight.
    pub async fn len(&self) -> usize {
        self.jobs.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
