//! Result delivery back to the owning listener.
//!
//! Exactly one delivery action happens per job, immediately before the
//! job is retired. Delivery never retries: by the time a result or
//! failure reaches this module the poller has already spent its whole
//! attempt budget.

use base64::Engine;

use crate::emitter::Emitter;
use crate::error::DubError;
use crate::events::WireEvent;
use crate::tracker::TranslationJob;

/// Package a completed artifact for playback and emit it to the job's
/// listener, tagged for client-side correlation with the original
/// utterance.
pub(crate) async fn deliver_success(emitter: &dyn Emitter, job: &TranslationJob, artifact: Vec<u8>) {
    let audio_data = base64::engine::general_purpose::STANDARD.encode(artifact);
    tracing::info!(
        job_id = %job.job_id,
        listener = %job.listener,
        bytes = audio_data.len(),
        "Delivering translated audio",
    );

    emitter
        .emit(
            &job.listener,
            WireEvent::TranslatedAudio {
                audio_data,
                speaker: job.speaker.clone(),
                target_language: job.target_language.clone(),
                message_id: job.message_id.clone(),
            },
        )
        .await;
}

/// Emit a structured failure notice to the job's listener.
pub(crate) async fn deliver_failure(emitter: &dyn Emitter, job: &TranslationJob, error: &DubError) {
    tracing::warn!(
        job_id = %job.job_id,
        listener = %job.listener,
        error = %error,
        "Dub job failed",
    );

    emitter
        .emit(
            &job.listener,
            WireEvent::DubbingError {
                error: error.user_message().to_string(),
                speaker: job.speaker.clone(),
            },
        )
        .await;
}
