//! Terminal failure modes of one dub job.

use circle_core::classify::GatewayErrorKind;

/// The ways a dub job can terminally fail.
///
/// Every variant is terminal for the job and surfaced to exactly the
/// affected listener. There is no retry at any level -- the poll
/// loop's repeated status checks are iterations of a single pending
/// operation, not retries of a failed one.
#[derive(Debug, thiserror::Error)]
pub enum DubError {
    /// The gateway rejected the submission or returned no job id.
    /// Reported immediately; no job is ever registered.
    #[error("submission failed: {0}")]
    Submission(String),

    /// A status poll raised an error (transient or permanent); the
    /// poller stops and reports without further polling.
    #[error("gateway poll failed: {0}")]
    GatewayPoll(String),

    /// The gateway explicitly reported the job as failed.
    #[error("job reported failed by gateway")]
    JobFailed,

    /// The poll attempt budget was exhausted without a terminal status.
    #[error("poll budget exhausted")]
    TimedOut,

    /// The job completed at the gateway but the artifact could not be
    /// fetched. Distinct from a job failure, but still terminal.
    #[error("artifact download failed: {0}")]
    Delivery(String),
}

impl DubError {
    /// The message shown to the affected listener.
    ///
    /// Gateway-originated error text is classified against the known
    /// categories; everything else has a fixed rendering.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Submission(raw) | Self::GatewayPoll(raw) => {
                GatewayErrorKind::classify(raw).user_message()
            }
            Self::JobFailed => "Translation job failed",
            Self::TimedOut => "Translation service timed out",
            Self::Delivery(_) => "Failed to download translated audio",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_error_text_is_classified() {
        let err = DubError::GatewayPoll("INSUFFICIENT_CREDITS".to_string());
        assert_eq!(err.user_message(), "Translation service credits exhausted");
    }

    #[test]
    fn unclassified_poll_error_is_generic() {
        let err = DubError::GatewayPoll("connection refused".to_string());
        assert_eq!(err.user_message(), "Translation failed");
    }

    #[test]
    fn timeout_has_fixed_message() {
        assert_eq!(
            DubError::TimedOut.user_message(),
            "Translation service timed out"
        );
    }

    #[test]
    fn delivery_failure_is_distinct_from_job_failure() {
        assert_ne!(
            DubError::Delivery("404".to_string()).user_message(),
            DubError::JobFailed.user_message()
        );
    }
}
