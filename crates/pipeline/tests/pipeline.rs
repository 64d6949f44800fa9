//! Integration tests for the dubbing pipeline.
//!
//! These drive the dispatcher end-to-end against a scripted fake
//! gateway and a recording emitter: no live dubbing service, no
//! WebSocket transport. Poll intervals are shrunk to milliseconds so
//! full job lifecycles resolve within the test.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use circle_murf::{
    DownloadDetail, DubJobStatus, DubbingGateway, MurfApiError, StatusResponse, SubmitResponse,
};
use circle_pipeline::{Dispatcher, DubConfig, Emitter, JobTracker, RoomRegistry, WireEvent};
use tokio::sync::Mutex;

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// One scripted poll outcome.
#[derive(Clone)]
enum PollStep {
    Pending,
    Completed { url: Option<String> },
    Failed { reason: Option<String> },
    Error(String),
}

/// A recorded job submission.
#[allow(dead_code)]
struct Submission {
    target_locale: String,
    audio_len: usize,
    priority: String,
}

/// Scripted stand-in for the dubbing service.
///
/// Every submitted job receives its own copy of the status script;
/// each poll consumes one step. A script that runs out keeps
/// reporting `Pending`.
struct FakeGateway {
    submit_error: Option<String>,
    script: Vec<PollStep>,
    download_result: Result<Vec<u8>, String>,
    next_job: AtomicUsize,
    submissions: Mutex<Vec<Submission>>,
    scripts: Mutex<HashMap<String, VecDeque<PollStep>>>,
    polls: AtomicUsize,
}

impl FakeGateway {
    fn new(script: Vec<PollStep>) -> Self {
        Self {
            submit_error: None,
            script,
            download_result: Ok(b"dubbed-audio".to_vec()),
            next_job: AtomicUsize::new(1),
            submissions: Mutex::new(Vec::new()),
            scripts: Mutex::new(HashMap::new()),
            polls: AtomicUsize::new(0),
        }
    }

    fn failing_submit(message: &str) -> Self {
        let mut gateway = Self::new(Vec::new());
        gateway.submit_error = Some(message.to_string());
        gateway
    }

    fn with_download_error(mut self, message: &str) -> Self {
        self.download_result = Err(message.to_string());
        self
    }

    async fn submission_count(&self) -> usize {
        self.submissions.lock().await.len()
    }

    fn poll_count(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    fn api_error(message: &str) -> MurfApiError {
        MurfApiError::Api {
            status: 500,
            body: message.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl DubbingGateway for FakeGateway {
    async fn submit(
        &self,
        audio: Vec<u8>,
        target_locale: &str,
        _file_name: &str,
        priority: &str,
    ) -> Result<SubmitResponse, MurfApiError> {
        if let Some(message) = &self.submit_error {
            return Err(Self::api_error(message));
        }

        let job_id = format!("dub-{}", self.next_job.fetch_add(1, Ordering::SeqCst));
        self.submissions.lock().await.push(Submission {
            target_locale: target_locale.to_string(),
            audio_len: audio.len(),
            priority: priority.to_string(),
        });
        self.scripts
            .lock()
            .await
            .insert(job_id.clone(), self.script.iter().cloned().collect());
        Ok(SubmitResponse { job_id })
    }

    async fn status(&self, job_id: &str) -> Result<StatusResponse, MurfApiError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let step = self
            .scripts
            .lock()
            .await
            .get_mut(job_id)
            .and_then(|steps| steps.pop_front())
            .unwrap_or(PollStep::Pending);

        match step {
            PollStep::Pending => Ok(StatusResponse {
                job_id: job_id.to_string(),
                status: DubJobStatus::Processing,
                download_details: Vec::new(),
                failure_reason: None,
            }),
            PollStep::Completed { url } => Ok(StatusResponse {
                job_id: job_id.to_string(),
                status: DubJobStatus::Completed,
                download_details: url
                    .into_iter()
                    .map(|download_url| DownloadDetail {
                        download_url,
                        locale: None,
                    })
                    .collect(),
                failure_reason: None,
            }),
            PollStep::Failed { reason } => Ok(StatusResponse {
                job_id: job_id.to_string(),
                status: DubJobStatus::Failed,
                download_details: Vec::new(),
                failure_reason: reason,
            }),
            PollStep::Error(message) => Err(Self::api_error(&message)),
        }
    }

    async fn download(&self, _url: &str, _timeout: Duration) -> Result<Vec<u8>, MurfApiError> {
        match &self.download_result {
            Ok(bytes) => Ok(bytes.clone()),
            Err(message) => Err(Self::api_error(message)),
        }
    }
}

/// Emitter that records every event per connection. Connections can be
/// "disconnected", after which emits to them are dropped silently --
/// the same no-op-on-absent contract the real transport has.
#[derive(Default)]
struct RecordingEmitter {
    events: Mutex<Vec<(String, WireEvent)>>,
    gone: Mutex<HashSet<String>>,
}

impl RecordingEmitter {
    async fn disconnect(&self, conn: &str) {
        self.gone.lock().await.insert(conn.to_string());
    }

    async fn events_for(&self, conn: &str) -> Vec<WireEvent> {
        self.events
            .lock()
            .await
            .iter()
            .filter(|(c, _)| c == conn)
            .map(|(_, e)| e.clone())
            .collect()
    }

    async fn count_for(&self, conn: &str, name: &str) -> usize {
        self.events_for(conn)
            .await
            .iter()
            .filter(|e| e.name() == name)
            .count()
    }
}

#[async_trait::async_trait]
impl Emitter for RecordingEmitter {
    async fn emit(&self, conn: &str, event: WireEvent) {
        if self.gone.lock().await.contains(conn) {
            return;
        }
        self.events.lock().await.push((conn.to_string(), event));
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct Harness {
    registry: Arc<RoomRegistry>,
    tracker: Arc<JobTracker>,
    gateway: Arc<FakeGateway>,
    emitter: Arc<RecordingEmitter>,
    dispatcher: Dispatcher,
}

fn test_config() -> DubConfig {
    DubConfig {
        poll_interval: Duration::from_millis(5),
        max_attempts: 30,
        download_timeout: Duration::from_secs(1),
        max_jobs_per_listener: 8,
    }
}

/// Build a dispatcher around the given fake gateway, with speaker
/// "A" (`en`, conn `c-a`) and listener "B" (`es`, conn `c-b`) already
/// joined to room `R1`.
async fn harness_with(gateway: FakeGateway, config: DubConfig) -> Harness {
    let registry = Arc::new(RoomRegistry::new());
    let tracker = Arc::new(JobTracker::new());
    let gateway = Arc::new(gateway);
    let emitter = Arc::new(RecordingEmitter::default());

    registry.join("R1", "c-a", "A", "en").await;
    registry.join("R1", "c-b", "B", "es").await;

    let dispatcher = Dispatcher::new(
        Arc::clone(&registry),
        Arc::clone(&tracker),
        Arc::clone(&gateway) as Arc<dyn DubbingGateway>,
        Arc::clone(&emitter) as Arc<dyn Emitter>,
        config,
    );

    Harness {
        registry,
        tracker,
        gateway,
        emitter,
        dispatcher,
    }
}

fn audio_b64(len: usize) -> String {
    base64::engine::general_purpose::STANDARD.encode(vec![7u8; len])
}

/// Wait for all in-flight jobs to resolve (deliver + retire).
async fn wait_for_drain(tracker: &JobTracker) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !tracker.is_empty().await {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("in-flight jobs should resolve");
}

// ---------------------------------------------------------------------------
// Test: same-language listeners get a direct relay, never a job
// ---------------------------------------------------------------------------

#[tokio::test]
async fn same_language_listener_gets_direct_relay_and_no_job() {
    let h = harness_with(FakeGateway::new(Vec::new()), test_config()).await;
    h.registry.join("R1", "c-c", "C", "en").await;

    h.dispatcher.route("R1", "c-a", &audio_b64(200), "wav").await;
    wait_for_drain(&h.tracker).await;

    // C speaks English like A: exactly one verbatim relay.
    let events = h.emitter.events_for("c-c").await;
    assert_eq!(events.len(), 1);
    match &events[0] {
        WireEvent::VoiceMessage {
            speaker,
            language,
            source_language,
            ..
        } => {
            assert_eq!(speaker, "A");
            assert_eq!(language, "en");
            assert_eq!(source_language, "en");
        }
        other => panic!("expected voice_message, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Test: under-length payload is rejected before any registration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn short_payload_rejected_before_any_registration() {
    let h = harness_with(FakeGateway::new(Vec::new()), test_config()).await;

    h.dispatcher.route("R1", "c-a", &audio_b64(10), "wav").await;

    // The speaker gets the error; nothing reaches the gateway.
    assert_eq!(h.emitter.count_for("c-a", "error").await, 1);
    assert!(h.emitter.events_for("c-b").await.is_empty());
    assert_eq!(h.gateway.submission_count().await, 0);
    assert!(h.tracker.is_empty().await);
}

#[tokio::test]
async fn undecodable_payload_rejected() {
    let h = harness_with(FakeGateway::new(Vec::new()), test_config()).await;

    h.dispatcher.route("R1", "c-a", "!!not-base64!!", "wav").await;

    assert_eq!(h.emitter.count_for("c-a", "error").await, 1);
    assert_eq!(h.gateway.submission_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: completion on attempt 3 delivers exactly one translated_audio
// ---------------------------------------------------------------------------

#[tokio::test]
async fn completed_job_delivers_exactly_one_translated_audio() {
    let script = vec![
        PollStep::Pending,
        PollStep::Pending,
        PollStep::Completed {
            url: Some("https://cdn.example/dub-1.mp3".to_string()),
        },
    ];
    let h = harness_with(FakeGateway::new(script), test_config()).await;

    h.dispatcher.route("R1", "c-a", &audio_b64(200), "wav").await;

    // The queued/processing notices are synchronous with dispatch.
    let statuses = h.emitter.events_for("c-b").await;
    let status_values: Vec<_> = statuses
        .iter()
        .filter_map(|e| match e {
            WireEvent::DubbingStatus {
                status, speaker, ..
            } => {
                assert_eq!(speaker, "A");
                Some(status.clone())
            }
            _ => None,
        })
        .collect();
    assert_eq!(status_values, vec!["queued", "processing"]);

    wait_for_drain(&h.tracker).await;

    assert_eq!(h.emitter.count_for("c-b", "translated_audio").await, 1);
    assert_eq!(h.emitter.count_for("c-b", "dubbing_error").await, 0);

    let events = h.emitter.events_for("c-b").await;
    let translated = events
        .iter()
        .find_map(|e| match e {
            WireEvent::TranslatedAudio {
                audio_data,
                speaker,
                target_language,
                message_id,
            } => Some((audio_data, speaker, target_language, message_id)),
            _ => None,
        })
        .expect("translated_audio should be delivered");
    assert_eq!(translated.1, "A");
    assert_eq!(translated.2, "es");
    assert!(translated.3.is_some());
    assert_eq!(
        base64::engine::general_purpose::STANDARD
            .decode(translated.0)
            .unwrap(),
        b"dubbed-audio"
    );

    // Submitted with the mapped locale.
    assert_eq!(h.gateway.submissions.lock().await[0].target_locale, "es_ES");
    assert!(h.tracker.jobs_for("c-b").await.is_empty());
}

// ---------------------------------------------------------------------------
// Test: gateway-reported failure emits exactly one dubbing_error
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_job_emits_exactly_one_dubbing_error() {
    let script = vec![PollStep::Failed { reason: None }];
    let h = harness_with(FakeGateway::new(script), test_config()).await;

    h.dispatcher.route("R1", "c-a", &audio_b64(200), "wav").await;
    wait_for_drain(&h.tracker).await;

    assert_eq!(h.emitter.count_for("c-b", "dubbing_error").await, 1);
    assert_eq!(h.emitter.count_for("c-b", "translated_audio").await, 0);
    assert!(h.tracker.jobs_for("c-b").await.is_empty());

    let events = h.emitter.events_for("c-b").await;
    let error = events
        .iter()
        .find_map(|e| match e {
            WireEvent::DubbingError { error, speaker } => Some((error.clone(), speaker.clone())),
            _ => None,
        })
        .unwrap();
    assert_eq!(error.0, "Translation job failed");
    assert_eq!(error.1, "A");
}

#[tokio::test]
async fn failure_reason_is_classified_for_the_listener() {
    let script = vec![PollStep::Failed {
        reason: Some("SPEECH_NOT_PRESENT".to_string()),
    }];
    let h = harness_with(FakeGateway::new(script), test_config()).await;

    h.dispatcher.route("R1", "c-a", &audio_b64(200), "wav").await;
    wait_for_drain(&h.tracker).await;

    let events = h.emitter.events_for("c-b").await;
    assert!(events.iter().any(|e| matches!(
        e,
        WireEvent::DubbingError { error, .. } if error == "No speech detected in audio"
    )));
}

// ---------------------------------------------------------------------------
// Test: attempt budget exhaustion reports a timeout
// ---------------------------------------------------------------------------

#[tokio::test]
async fn timeout_after_max_attempts() {
    let mut config = test_config();
    config.max_attempts = 3;
    // Script stays pending forever.
    let h = harness_with(FakeGateway::new(Vec::new()), config).await;

    h.dispatcher.route("R1", "c-a", &audio_b64(200), "wav").await;
    wait_for_drain(&h.tracker).await;

    assert_eq!(h.gateway.poll_count(), 3);
    assert_eq!(h.emitter.count_for("c-b", "translated_audio").await, 0);

    let events = h.emitter.events_for("c-b").await;
    assert!(events.iter().any(|e| matches!(
        e,
        WireEvent::DubbingError { error, .. } if error == "Translation service timed out"
    )));
}

// ---------------------------------------------------------------------------
// Test: a poll error is classified, reported once, and terminal
// ---------------------------------------------------------------------------

#[tokio::test]
async fn poll_error_is_classified_and_terminal() {
    let script = vec![PollStep::Error("INSUFFICIENT_CREDITS".to_string())];
    let h = harness_with(FakeGateway::new(script), test_config()).await;

    h.dispatcher.route("R1", "c-a", &audio_b64(200), "wav").await;
    wait_for_drain(&h.tracker).await;

    // One poll, then the job stopped -- no further polling.
    assert_eq!(h.gateway.poll_count(), 1);
    let events = h.emitter.events_for("c-b").await;
    assert!(events.iter().any(|e| matches!(
        e,
        WireEvent::DubbingError { error, .. }
            if error == "Translation service credits exhausted"
    )));
}

// ---------------------------------------------------------------------------
// Test: artifact download failure is a delivery failure, still retires
// ---------------------------------------------------------------------------

#[tokio::test]
async fn download_failure_is_a_delivery_failure() {
    let script = vec![PollStep::Completed {
        url: Some("https://cdn.example/dub-1.mp3".to_string()),
    }];
    let gateway = FakeGateway::new(script).with_download_error("connection reset");
    let h = harness_with(gateway, test_config()).await;

    h.dispatcher.route("R1", "c-a", &audio_b64(200), "wav").await;
    wait_for_drain(&h.tracker).await;

    assert_eq!(h.emitter.count_for("c-b", "translated_audio").await, 0);
    let events = h.emitter.events_for("c-b").await;
    assert!(events.iter().any(|e| matches!(
        e,
        WireEvent::DubbingError { error, .. } if error == "Failed to download translated audio"
    )));
    assert!(h.tracker.is_empty().await);
}

#[tokio::test]
async fn completed_without_download_details_is_a_delivery_failure() {
    let script = vec![PollStep::Completed { url: None }];
    let h = harness_with(FakeGateway::new(script), test_config()).await;

    h.dispatcher.route("R1", "c-a", &audio_b64(200), "wav").await;
    wait_for_drain(&h.tracker).await;

    assert_eq!(h.emitter.count_for("c-b", "dubbing_error").await, 1);
    assert_eq!(h.emitter.count_for("c-b", "translated_audio").await, 0);
}

// ---------------------------------------------------------------------------
// Test: submission failure reports immediately, registers nothing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submission_failure_reports_immediately_without_registering() {
    let h = harness_with(
        FakeGateway::failing_submit("LANGUAGE_NOT_SUPPORTED"),
        test_config(),
    )
    .await;

    h.dispatcher.route("R1", "c-a", &audio_b64(200), "wav").await;

    assert!(h.tracker.is_empty().await);
    assert_eq!(h.gateway.poll_count(), 0);

    let events = h.emitter.events_for("c-b").await;
    // Queued notice went out before the submit, then the failure.
    assert!(events.iter().any(|e| matches!(
        e,
        WireEvent::DubbingStatus { status, .. } if status == "queued"
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        WireEvent::DubbingError { error, .. }
            if error == "Language not supported for translation"
    )));
}

// ---------------------------------------------------------------------------
// Test: N concurrent jobs for one listener resolve without corruption
// ---------------------------------------------------------------------------

#[tokio::test]
async fn concurrent_jobs_for_one_listener_all_resolve() {
    let script = vec![
        PollStep::Pending,
        PollStep::Completed {
            url: Some("https://cdn.example/out.mp3".to_string()),
        },
    ];
    let h = harness_with(FakeGateway::new(script), test_config()).await;

    for _ in 0..5 {
        h.dispatcher.route("R1", "c-a", &audio_b64(200), "wav").await;
    }
    wait_for_drain(&h.tracker).await;

    assert_eq!(h.emitter.count_for("c-b", "translated_audio").await, 5);
    assert_eq!(h.emitter.count_for("c-b", "dubbing_error").await, 0);
    assert!(h.tracker.jobs_for("c-b").await.is_empty());
}

// ---------------------------------------------------------------------------
// Test: the per-listener bound refuses excess submissions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn listener_at_pending_bound_is_refused() {
    let mut config = test_config();
    config.max_jobs_per_listener = 1;
    // Slow poll so the first job stays pending during the second route.
    config.poll_interval = Duration::from_secs(30);
    let h = harness_with(FakeGateway::new(Vec::new()), config).await;

    h.dispatcher.route("R1", "c-a", &audio_b64(200), "wav").await;
    assert_eq!(h.tracker.jobs_for("c-b").await.len(), 1);

    h.dispatcher.route("R1", "c-a", &audio_b64(200), "wav").await;

    // Only the first submission reached the gateway.
    assert_eq!(h.gateway.submission_count().await, 1);
    assert_eq!(h.tracker.jobs_for("c-b").await.len(), 1);
    let events = h.emitter.events_for("c-b").await;
    assert!(events.iter().any(|e| matches!(
        e,
        WireEvent::DubbingError { error, .. }
            if error == "Too many translations pending, try again shortly"
    )));
}

// ---------------------------------------------------------------------------
// Test: delivery to a vanished listener is a silent no-op
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delivery_to_vanished_listener_is_silent() {
    let script = vec![
        PollStep::Pending,
        PollStep::Completed {
            url: Some("https://cdn.example/out.mp3".to_string()),
        },
    ];
    let h = harness_with(FakeGateway::new(script), test_config()).await;

    h.dispatcher.route("R1", "c-a", &audio_b64(200), "wav").await;

    // B disconnects mid-poll; the poller still runs to completion.
    h.emitter.disconnect("c-b").await;
    h.registry.leave("c-b").await;
    wait_for_drain(&h.tracker).await;

    // The job resolved and retired; the final emit went nowhere.
    assert_eq!(h.emitter.count_for("c-b", "translated_audio").await, 0);
    assert!(h.tracker.is_empty().await);
}
