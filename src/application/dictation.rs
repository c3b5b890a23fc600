//! Dictation orchestrator use case
//!
//! Owns the recording state and runs one dictation cycle:
//! capture, transcribe, optionally refine, then paste and save.

use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use super::ports::{
    AudioCapture, DictationPreferences, HistoryError, PasteError, Paster, Reasoner,
    RecordingError, SettingsProvider, Transcriber, TranscriptionError, TranscriptionHistory,
};
use crate::domain::dictation::{DictationSession, DictationState, InvalidStateTransition, TextSource};
use crate::domain::transcription::{clean_transcription_fallback, normalize_transcription, AudioClip};

/// Errors that end a dictation cycle
#[derive(Debug, Error)]
pub enum DictationError {
    #[error(transparent)]
    Recording(#[from] RecordingError),

    #[error("No audio was captured. Check your microphone and try again")]
    EmptyRecording,

    #[error(transparent)]
    Transcription(#[from] TranscriptionError),

    #[error(transparent)]
    InvalidState(#[from] InvalidStateTransition),
}

/// Result of asking the orchestrator to start recording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRecording,
    /// The previous cycle has not finished processing yet
    StillProcessing,
}

/// Text delivered by one completed cycle
#[derive(Debug, Clone)]
pub struct DictationOutput {
    pub text: String,
    pub source: TextSource,
    pub pasted: bool,
    pub paste_error: Option<PasteError>,
    pub saved_id: Option<i64>,
    pub history_error: Option<HistoryError>,
    pub audio_size: String,
}

pub struct DictationOrchestrator<R, T, M, P, H, S>
where
    R: AudioCapture,
    T: Transcriber,
    M: Reasoner,
    P: Paster,
    H: TranscriptionHistory,
    S: SettingsProvider,
{
    recorder: R,
    transcriber: T,
    reasoner: M,
    paster: P,
    history: H,
    settings: S,
    session: Mutex<DictationSession>,
    state_tx: watch::Sender<DictationState>,
}

impl<R, T, M, P, H, S> DictationOrchestrator<R, T, M, P, H, S>
where
    R: AudioCapture,
    T: Transcriber,
    M: Reasoner,
    P: Paster,
    H: TranscriptionHistory,
    S: SettingsProvider,
{
    pub fn new(recorder: R, transcriber: T, reasoner: M, paster: P, history: H, settings: S) -> Self {
        let (state_tx, _) = watch::channel(DictationState::Idle);
        Self {
            recorder,
            transcriber,
            reasoner,
            paster,
            history,
            settings,
            session: Mutex::new(DictationSession::new()),
            state_tx,
        }
    }

    pub fn state(&self) -> DictationState {
        *self.state_tx.borrow()
    }

    /// Receiver that observes every state transition
    pub fn subscribe(&self) -> watch::Receiver<DictationState> {
        self.state_tx.subscribe()
    }

    /// Elapsed capture time while recording
    pub fn recording_elapsed_ms(&self) -> u64 {
        self.recorder.elapsed_ms()
    }

    fn publish(&self, session: &DictationSession) {
        let state = session.state();
        self.state_tx.send_replace(state);
        debug!(%state, "Dictation state changed");
    }

    /// Idle -> Recording. Returns a non-`Started` outcome, without changing
    /// state, when a cycle is already open.
    pub async fn start_recording(&self) -> Result<StartOutcome, DictationError> {
        let mut session = self.session.lock().await;
        match session.state() {
            DictationState::Recording => return Ok(StartOutcome::AlreadyRecording),
            DictationState::Processing => return Ok(StartOutcome::StillProcessing),
            DictationState::Idle => {}
        }

        session.start()?;
        self.publish(&session);

        if let Err(e) = self.recorder.start().await {
            warn!(error = %e, "Failed to start audio capture");
            session.reset();
            self.publish(&session);
            return Err(e.into());
        }

        info!("Recording started");
        Ok(StartOutcome::Started)
    }

    /// Recording -> Processing, returning the captured clip.
    ///
    /// A capture failure or an empty clip completes the cycle immediately.
    pub async fn stop_recording(&self) -> Result<AudioClip, DictationError> {
        let mut session = self.session.lock().await;
        session.stop()?;
        self.publish(&session);

        let captured = match self.recorder.stop().await {
            Ok(clip) if clip.is_empty() => Err(DictationError::EmptyRecording),
            Ok(clip) => Ok(clip),
            Err(e) => Err(e.into()),
        };

        if captured.is_err() {
            session.reset();
            self.publish(&session);
        }
        captured
    }

    /// Run the pipeline on a clip obtained from [`Self::stop_recording`].
    /// Always returns to `Idle`, whatever the outcome.
    pub async fn process_clip(&self, clip: AudioClip) -> Result<DictationOutput, DictationError> {
        {
            let session = self.session.lock().await;
            if !session.is_processing() {
                return Err(InvalidStateTransition {
                    current_state: session.state(),
                    action: "process audio",
                }
                .into());
            }
        }

        let result = self.run_pipeline(clip).await;

        let mut session = self.session.lock().await;
        if let Err(e) = session.complete() {
            warn!(error = %e, "Unexpected state after processing");
            session.reset();
        }
        self.publish(&session);
        result
    }

    pub async fn stop_and_process(&self) -> Result<DictationOutput, DictationError> {
        let clip = self.stop_recording().await?;
        self.process_clip(clip).await
    }

    /// Discard an open recording. Returns false when nothing was recording.
    pub async fn cancel(&self) -> Result<bool, DictationError> {
        let mut session = self.session.lock().await;
        if !session.is_recording() {
            return Ok(false);
        }

        let cancelled = self.recorder.cancel().await;
        session.cancel()?;
        self.publish(&session);
        cancelled?;

        info!("Recording cancelled");
        Ok(true)
    }

    async fn run_pipeline(&self, clip: AudioClip) -> Result<DictationOutput, DictationError> {
        if clip.is_empty() {
            return Err(DictationError::EmptyRecording);
        }

        let preferences = self.settings.preferences().await;
        let audio_size = clip.human_readable_size();

        let raw = self
            .transcriber
            .transcribe(&clip, &preferences.language)
            .await?;
        drop(clip);
        info!(chars = raw.chars().count(), "Transcription received");

        let (text, source) = self.refine(&raw, &preferences).await;
        let mut output = DictationOutput {
            text,
            source,
            pasted: false,
            paste_error: None,
            saved_id: None,
            history_error: None,
            audio_size,
        };

        if preferences.paste {
            match self.paster.paste(&output.text).await {
                Ok(()) => output.pasted = true,
                Err(e) => {
                    warn!(error = %e, "Paste failed");
                    output.paste_error = Some(e);
                }
            }
        }

        if preferences.save_history {
            match self.history.save(&output.text).await {
                Ok(record) => {
                    debug!(id = record.id, "Transcription saved");
                    output.saved_id = Some(record.id);
                }
                Err(e) => {
                    warn!(error = %e, "Failed to save transcription");
                    output.history_error = Some(e);
                }
            }
        }

        Ok(output)
    }

    /// Choose the delivered text for a raw transcript.
    ///
    /// Reasoning runs only when enabled and a credential is present; any
    /// reasoning failure falls back to local cleanup.
    pub async fn refine(&self, raw: &str, preferences: &DictationPreferences) -> (String, TextSource) {
        if preferences.use_reasoning {
            if self.reasoner.is_available().await {
                let prepared = normalize_transcription(raw);
                match self
                    .reasoner
                    .clean(
                        &prepared,
                        &preferences.reasoning_model,
                        preferences.agent_name.as_deref(),
                        &preferences.reasoning,
                    )
                    .await
                {
                    Ok(text) if !text.trim().is_empty() => {
                        return (text.trim().to_string(), TextSource::CloudReasoned)
                    }
                    Ok(_) => warn!("Reasoning returned empty text, using standard cleanup"),
                    Err(e) => warn!(error = %e, "Reasoning failed, using standard cleanup"),
                }
            } else {
                debug!("Reasoning enabled but no credential available, using standard cleanup");
            }
        }

        (clean_transcription_fallback(raw), TextSource::Cloud)
    }
}
