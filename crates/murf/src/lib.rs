//! Murf dubbing API client library.
//!
//! Thin adapter around the external dubbing service: job submission,
//! status polling, and artifact download over REST using [`reqwest`].
//! The [`gateway::DubbingGateway`] trait abstracts the three calls so
//! the orchestration pipeline can be tested against a fake service.

pub mod api;
pub mod gateway;
pub mod status;

pub use api::{MurfApiError, MurfDubApi, SubmitResponse};
pub use gateway::DubbingGateway;
pub use status::{DownloadDetail, DubJobStatus, StatusResponse};
