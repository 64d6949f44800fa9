//! Utterance routing.
//!
//! Entry point for every utterance that arrives from a speaker: for
//! each other participant of the room, either relay the payload
//! verbatim (same language) or submit a dubbing job and hand it to a
//! poll task (different language). Routing never blocks on pipeline
//! state -- job completion is delivered asynchronously.

use std::sync::Arc;

use base64::Engine;
use chrono::Utc;
use circle_core::audio::validate_audio_payload;
use circle_core::locale::locale_for;
use circle_murf::DubbingGateway;

use crate::config::DubConfig;
use crate::emitter::Emitter;
use crate::error::DubError;
use crate::events::WireEvent;
use crate::poller::PollTask;
use crate::registry::{Participant, RoomRegistry};
use crate::tracker::{JobTracker, TrackerError, TranslationJob};

/// Submission priority requested from the dubbing service.
const DUB_PRIORITY: &str = "HIGH";

/// Routes utterances and owns dub-job creation.
///
/// Cheap to share: all fields are behind `Arc`.
pub struct Dispatcher {
    registry: Arc<RoomRegistry>,
    tracker: Arc<JobTracker>,
    gateway: Arc<dyn DubbingGateway>,
    emitter: Arc<dyn Emitter>,
    config: DubConfig,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<RoomRegistry>,
        tracker: Arc<JobTracker>,
        gateway: Arc<dyn DubbingGateway>,
        emitter: Arc<dyn Emitter>,
        config: DubConfig,
    ) -> Self {
        Self {
            registry,
            tracker,
            gateway,
            emitter,
            config,
        }
    }

    /// Route one utterance from `speaker_conn` to every other
    /// participant of `room_id`.
    ///
    /// `audio_b64` is the base64 payload exactly as the client sent it;
    /// it is decoded once for validation and job submission and relayed
    /// untouched on the same-language path. A malformed or under-length
    /// payload is rejected with an `error` event to the speaker before
    /// any job is created.
    pub async fn route(&self, room_id: &str, speaker_conn: &str, audio_b64: &str, format: &str) {
        let Some(speaker) = self.registry.session(speaker_conn).await else {
            tracing::warn!(conn = %speaker_conn, "Audio from connection with no session");
            return;
        };

        let audio = match base64::engine::general_purpose::STANDARD.decode(audio_b64) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(conn = %speaker_conn, error = %e, "Undecodable audio payload");
                self.emitter
                    .emit(
                        speaker_conn,
                        WireEvent::Error {
                            message: "Invalid audio payload encoding".to_string(),
                        },
                    )
                    .await;
                return;
            }
        };

        if let Err(e) = validate_audio_payload(&audio) {
            self.emitter
                .emit(
                    speaker_conn,
                    WireEvent::Error {
                        message: e.to_string(),
                    },
                )
                .await;
            return;
        }

        let message_id = uuid::Uuid::new_v4().to_string();
        let timestamp = Utc::now();
        let listeners = self.registry.listeners_of(room_id, speaker_conn).await;

        tracing::debug!(
            room_id,
            speaker = %speaker.username,
            listeners = listeners.len(),
            message_id = %message_id,
            "Routing utterance",
        );

        for listener in listeners {
            if listener.target_language == speaker.language {
                // Same language: direct relay, no job.
                self.emitter
                    .emit(
                        &listener.conn,
                        WireEvent::VoiceMessage {
                            speaker: speaker.username.clone(),
                            audio_data: audio_b64.to_string(),
                            language: speaker.language.clone(),
                            timestamp,
                            message_id: message_id.clone(),
                            source_language: speaker.language.clone(),
                            format: format.to_string(),
                        },
                    )
                    .await;
            } else {
                self.submit_job(&speaker, &listener, audio.clone(), &message_id)
                    .await;
            }
        }
    }

    /// Submit one dub job for one listener and spawn its poll task.
    ///
    /// The `queued` notice goes out synchronously before the gateway
    /// call so the client can render progress regardless of gateway
    /// latency; `processing` (with the job id) follows registration.
    async fn submit_job(
        &self,
        speaker: &Participant,
        listener: &Participant,
        audio: Vec<u8>,
        message_id: &str,
    ) {
        // Fast-path refusal before spending a gateway call. The
        // authoritative check happens in `register_bounded` under the
        // tracker's own lock.
        let pending = self.tracker.jobs_for(&listener.conn).await.len();
        if pending >= self.config.max_jobs_per_listener {
            tracing::warn!(
                listener = %listener.conn,
                pending,
                "Listener at pending-job bound, refusing submission",
            );
            self.emitter
                .emit(
                    &listener.conn,
                    WireEvent::DubbingError {
                        error: "Too many translations pending, try again shortly".to_string(),
                        speaker: speaker.username.clone(),
                    },
                )
                .await;
            return;
        }

        self.emitter
            .emit(
                &listener.conn,
                WireEvent::DubbingStatus {
                    status: "queued".to_string(),
                    message: format!("Queuing translation for {}...", speaker.username),
                    speaker: speaker.username.clone(),
                    job_id: None,
                },
            )
            .await;

        let target_locale = locale_for(&listener.target_language);
        let file_name = format!("voice_{}_{}", speaker.username, Utc::now().timestamp());

        let job_id = match self
            .gateway
            .submit(audio, target_locale, &file_name, DUB_PRIORITY)
            .await
        {
            Ok(response) => response.job_id,
            Err(e) => {
                let error = DubError::Submission(e.to_string());
                tracing::error!(
                    listener = %listener.conn,
                    target_locale,
                    error = %e,
                    "Dub submission failed",
                );
                self.emitter
                    .emit(
                        &listener.conn,
                        WireEvent::DubbingError {
                            error: error.user_message().to_string(),
                            speaker: speaker.username.clone(),
                        },
                    )
                    .await;
                return;
            }
        };

        let job = TranslationJob::new(
            job_id.clone(),
            listener.conn.clone(),
            speaker.username.clone(),
            listener.target_language.clone(),
            Some(message_id.to_string()),
        );

        if let Err(e) = self
            .tracker
            .register_bounded(job, self.config.max_jobs_per_listener)
            .await
        {
            let message = match &e {
                // A concurrent dispatch filled the last slot between the
                // fast-path check and here.
                TrackerError::ListenerAtCapacity(_) => {
                    tracing::warn!(job_id = %job_id, error = %e, "Dub job refused at the bound");
                    "Too many translations pending, try again shortly"
                }
                // Gateway uniqueness was violated; the existing poller
                // owns the id, so this submission is dropped.
                TrackerError::DuplicateJob(_) => {
                    tracing::error!(job_id = %job_id, error = %e, "Duplicate job id from gateway");
                    "Translation failed"
                }
            };
            self.emitter
                .emit(
                    &listener.conn,
                    WireEvent::DubbingError {
                        error: message.to_string(),
                        speaker: speaker.username.clone(),
                    },
                )
                .await;
            return;
        }

        tracing::info!(
            job_id = %job_id,
            listener = %listener.conn,
            target_locale,
            "Dub job registered",
        );

        self.emitter
            .emit(
                &listener.conn,
                WireEvent::DubbingStatus {
                    status: "processing".to_string(),
                    message: format!("Translating {}'s voice...", speaker.username),
                    speaker: speaker.username.clone(),
                    job_id: Some(job_id.clone()),
                },
            )
            .await;

        PollTask {
            job_id,
            tracker: Arc::clone(&self.tracker),
            gateway: Arc::clone(&self.gateway),
            emitter: Arc::clone(&self.emitter),
            config: self.config.clone(),
        }
        .spawn();
    }
}
