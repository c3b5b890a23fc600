//! Full dictation cycle: scripted microphone, real HTTP adapters against a
//! mock server, in-memory SQLite history.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ppq_voice::application::ports::{
    AudioCapture, DictationPreferences, HistoryError, PasteError, Paster, RecordingError,
    SecretStore, TranscriptionError, TranscriptionHistory, TranscriptionRecord,
};
use ppq_voice::application::{
    ApiKeyResolver, DictationError, DictationOrchestrator, StartOutcome,
};
use ppq_voice::domain::dictation::{DictationState, TextSource};
use ppq_voice::domain::retry::RetryPolicy;
use ppq_voice::domain::transcription::{AudioClip, AudioMimeType, LanguageHint};
use ppq_voice::infrastructure::{
    ChatCompletionReasoner, MemorySecretStore, SqliteHistory, WhisperApiTranscriber,
};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct ScriptedMicrophone {
    recording: AtomicBool,
}

#[async_trait]
impl AudioCapture for ScriptedMicrophone {
    async fn start(&self) -> Result<(), RecordingError> {
        self.recording.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<AudioClip, RecordingError> {
        self.recording.store(false, Ordering::SeqCst);
        Ok(AudioClip::new(b"spoken words".to_vec(), AudioMimeType::Wav))
    }

    async fn cancel(&self) -> Result<(), RecordingError> {
        self.recording.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }

    fn elapsed_ms(&self) -> u64 {
        0
    }
}

/// Remembers every pasted text; clones share the log
#[derive(Default, Clone)]
struct RecordingPaster {
    pasted: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Paster for RecordingPaster {
    async fn paste(&self, text: &str) -> Result<(), PasteError> {
        self.pasted.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// History handle the test keeps while the orchestrator owns a clone
#[derive(Clone)]
struct SharedHistory(Arc<SqliteHistory>);

#[async_trait]
impl TranscriptionHistory for SharedHistory {
    async fn save(&self, text: &str) -> Result<TranscriptionRecord, HistoryError> {
        self.0.save(text).await
    }

    async fn list(&self, limit: usize) -> Result<Vec<TranscriptionRecord>, HistoryError> {
        self.0.list(limit).await
    }

    async fn delete(&self, id: i64) -> Result<bool, HistoryError> {
        self.0.delete(id).await
    }

    async fn clear(&self) -> Result<usize, HistoryError> {
        self.0.clear().await
    }
}

type TestOrchestrator = DictationOrchestrator<
    ScriptedMicrophone,
    WhisperApiTranscriber,
    ChatCompletionReasoner,
    RecordingPaster,
    SharedHistory,
    DictationPreferences,
>;

struct Harness {
    orchestrator: TestOrchestrator,
    paster: RecordingPaster,
    history: SharedHistory,
}

fn harness(server: &MockServer, preferences: DictationPreferences) -> Harness {
    let sources: Vec<Arc<dyn SecretStore>> =
        vec![Arc::new(MemorySecretStore::with_api_key("sk-test-key"))];
    let keys = Arc::new(ApiKeyResolver::new(sources));
    let retry = RetryPolicy {
        max_retries: 1,
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(2),
        backoff_multiplier: 2.0,
    };

    let transcriber = WhisperApiTranscriber::new(Arc::clone(&keys), &server.uri())
        .with_retry_policy(retry)
        .without_transcoding();
    let reasoner = ChatCompletionReasoner::new(keys, &server.uri()).with_retry_policy(retry);
    let paster = RecordingPaster::default();
    let history = SharedHistory(Arc::new(SqliteHistory::in_memory().unwrap()));

    Harness {
        orchestrator: DictationOrchestrator::new(
            ScriptedMicrophone::default(),
            transcriber,
            reasoner,
            paster.clone(),
            history.clone(),
            preferences,
        ),
        paster,
        history,
    }
}

fn preferences(use_reasoning: bool) -> DictationPreferences {
    DictationPreferences {
        language: LanguageHint::parse("en"),
        use_reasoning,
        paste: true,
        save_history: true,
        ..DictationPreferences::default()
    }
}

async fn mount_transcript(server: &MockServer, text: &str) {
    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "text": text })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn reasoned_cycle_pastes_and_saves() {
    let server = MockServer::start().await;
    mount_transcript(&server, "so  um the meeting is at three").await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "The meeting is at three." } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, preferences(true));
    assert_eq!(
        h.orchestrator.start_recording().await.unwrap(),
        StartOutcome::Started
    );
    assert_eq!(h.orchestrator.state(), DictationState::Recording);

    let output = h.orchestrator.stop_and_process().await.unwrap();
    assert_eq!(output.text, "The meeting is at three.");
    assert_eq!(output.source, TextSource::CloudReasoned);
    assert!(output.pasted);
    assert!(output.saved_id.is_some());
    assert_eq!(h.orchestrator.state(), DictationState::Idle);

    assert_eq!(
        h.paster.pasted.lock().unwrap().as_slice(),
        ["The meeting is at three."]
    );
    let saved = h.history.list(10).await.unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].text, "The meeting is at three.");
}

#[tokio::test]
async fn reasoning_failure_falls_back_to_local_cleanup() {
    let server = MockServer::start().await;
    mount_transcript(&server, "  send the   draft tonight ").await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(502))
        .expect(2)
        .mount(&server)
        .await;

    let h = harness(&server, preferences(true));
    h.orchestrator.start_recording().await.unwrap();
    let output = h.orchestrator.stop_and_process().await.unwrap();

    assert_eq!(output.text, "Send the draft tonight");
    assert_eq!(output.source, TextSource::Cloud);
    assert_eq!(h.history.list(10).await.unwrap()[0].text, "Send the draft tonight");
}

#[tokio::test]
async fn reasoning_disabled_never_calls_chat() {
    let server = MockServer::start().await;
    mount_transcript(&server, "plain dictation").await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let h = harness(&server, preferences(false));
    h.orchestrator.start_recording().await.unwrap();
    let output = h.orchestrator.stop_and_process().await.unwrap();
    assert_eq!(output.text, "Plain dictation");
    assert_eq!(output.source, TextSource::Cloud);
}

#[tokio::test]
async fn transcription_failure_returns_to_idle_without_side_effects() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, preferences(true));
    h.orchestrator.start_recording().await.unwrap();
    let err = h.orchestrator.stop_and_process().await.unwrap_err();

    assert!(matches!(
        err,
        DictationError::Transcription(TranscriptionError::Api(_))
    ));
    assert_eq!(h.orchestrator.state(), DictationState::Idle);
    assert!(h.paster.pasted.lock().unwrap().is_empty());
    assert!(h.history.list(10).await.unwrap().is_empty());

    // Next cycle can start right away
    assert_eq!(
        h.orchestrator.start_recording().await.unwrap(),
        StartOutcome::Started
    );
}

#[tokio::test]
async fn history_opt_out_skips_save() {
    let server = MockServer::start().await;
    mount_transcript(&server, "private note").await;

    let h = harness(
        &server,
        DictationPreferences {
            save_history: false,
            paste: false,
            ..preferences(false)
        },
    );
    h.orchestrator.start_recording().await.unwrap();
    let output = h.orchestrator.stop_and_process().await.unwrap();

    assert_eq!(output.saved_id, None);
    assert!(!output.pasted);
    assert!(h.paster.pasted.lock().unwrap().is_empty());
    assert!(h.history.list(10).await.unwrap().is_empty());
}
