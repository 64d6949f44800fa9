//! Per-job status polling.
//!
//! One independent task per submitted job: jobs have unpredictable
//! completion times at the external service, so a shared poll loop
//! would either serialize unrelated latencies or need multiplexed
//! timer bookkeeping. A task per job keeps each state machine trivial
//! and isolates one job's failure from all others.
//!
//! State machine: submitted -> (poll) -> processing* -> completed |
//! failed | timed-out. Each terminal transition triggers exactly one
//! delivery action followed by exactly one retire.

use std::sync::Arc;

use circle_murf::{DubJobStatus, DubbingGateway};

use crate::config::DubConfig;
use crate::delivery::{deliver_failure, deliver_success};
use crate::emitter::Emitter;
use crate::error::DubError;
use crate::tracker::{JobTracker, TranslationJob};

/// The polling task for a single registered job.
pub(crate) struct PollTask {
    pub job_id: String,
    pub tracker: Arc<JobTracker>,
    pub gateway: Arc<dyn DubbingGateway>,
    pub emitter: Arc<dyn Emitter>,
    pub config: DubConfig,
}

impl PollTask {
    /// Spawn the poll loop as an independent, fire-and-forget task.
    /// The task owns its failure path entirely; nothing propagates to
    /// the caller.
    pub fn spawn(self) {
        tokio::spawn(self.run());
    }

    /// Poll the gateway until a terminal state or the attempt budget
    /// runs out.
    async fn run(self) {
        let Some(job) = self.tracker.get(&self.job_id).await else {
            // Single-owner invariant: only this task retires the job,
            // so a missing entry means registration never happened.
            tracing::error!(job_id = %self.job_id, "Poll task started for untracked job");
            return;
        };

        for attempt in 1..=self.config.max_attempts {
            match self.gateway.status(&self.job_id).await {
                Ok(response) => match response.status {
                    DubJobStatus::Completed => {
                        tracing::info!(
                            job_id = %self.job_id,
                            attempt,
                            "Dub job completed",
                        );
                        self.finish_completed(&job, response.download_details).await;
                        return;
                    }
                    DubJobStatus::Failed => {
                        let error = match response.failure_reason {
                            Some(reason) => DubError::GatewayPoll(reason),
                            None => DubError::JobFailed,
                        };
                        self.finish_failed(&job, error).await;
                        return;
                    }
                    status => {
                        tracing::debug!(
                            job_id = %self.job_id,
                            attempt,
                            status = ?status,
                            "Dub job still pending",
                        );
                    }
                },
                Err(e) => {
                    // Any error while querying the gateway is fatal for
                    // this job; no further polling.
                    self.finish_failed(&job, DubError::GatewayPoll(e.to_string()))
                        .await;
                    return;
                }
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }

        tracing::warn!(
            job_id = %self.job_id,
            max_attempts = self.config.max_attempts,
            "Dub job timed out",
        );
        self.finish_failed(&job, DubError::TimedOut).await;
    }

    /// Terminal path for a completed job: fetch the artifact and
    /// deliver it. A failure at the fetch stage is a delivery failure,
    /// distinct from a job failure, but still retires the job.
    async fn finish_completed(
        &self,
        job: &TranslationJob,
        download_details: Vec<circle_murf::DownloadDetail>,
    ) {
        let Some(detail) = download_details.into_iter().next() else {
            self.finish_failed(job, DubError::Delivery("no download details".to_string()))
                .await;
            return;
        };

        match self
            .gateway
            .download(&detail.download_url, self.config.download_timeout)
            .await
        {
            Ok(artifact) => {
                deliver_success(self.emitter.as_ref(), job, artifact).await;
                self.tracker.retire(&self.job_id).await;
            }
            Err(e) => {
                self.finish_failed(job, DubError::Delivery(e.to_string()))
                    .await;
            }
        }
    }

    /// Terminal failure path: report to the listener, then retire.
    async fn finish_failed(&self, job: &TranslationJob, error: DubError) {
        deliver_failure(self.emitter.as_ref(), job, &error).await;
        self.tracker.retire(&self.job_id).await;
    }
}
