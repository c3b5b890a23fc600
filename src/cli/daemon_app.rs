//! Daemon runner: hotkey-driven dictation over the control socket

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::application::ports::{
    AudioCapture, ConfigStore, NotificationIcon, Notifier, Paster, Reasoner, SettingsProvider,
    Transcriber, TranscriptionHistory,
};
use crate::application::{DictationOrchestrator, StartOutcome};
use crate::domain::config::AppConfig;
use crate::domain::dictation::DictationState;
use crate::domain::recording::Duration;
use crate::infrastructure::{create_notifier, FileSettingsProvider};

use super::app::{
    build_key_resolver, build_orchestrator, env_overrides, notify, open_history,
    report_side_effects, EXIT_ERROR, EXIT_SUCCESS,
};
use super::pid_file::{PidFile, PidFileError};
use super::presenter::Presenter;
use super::signals::{DaemonSignal, DaemonSignalHandler};
use super::socket::{DaemonSocketServer, SocketPath};

/// Granularity of the max-duration check while recording
const MAX_DURATION_POLL: u64 = 100;

/// How long shutdown waits for an in-flight cycle before abandoning it
const SHUTDOWN_GRACE: StdDuration = StdDuration::from_secs(60);

pub async fn run_daemon(
    config: AppConfig,
    store: Arc<dyn ConfigStore>,
    cli_overrides: AppConfig,
    max_duration: Duration,
) -> ExitCode {
    let presenter = Presenter::new();

    let pid_file = PidFile::new();
    if let Err(e) = pid_file.acquire() {
        match e {
            PidFileError::AlreadyRunning(pid) => {
                presenter.error(&format!("Another daemon is already running (PID: {})", pid));
            }
            _ => presenter.error(&e.to_string()),
        }
        return ExitCode::from(EXIT_ERROR);
    }

    let keys = build_key_resolver(Arc::clone(&store), &config);
    if !keys.has_key().await {
        presenter.warn("No API key configured yet; set one before the first recording");
    }

    let history = match open_history() {
        Ok(history) => history,
        Err(e) => {
            presenter.error(&format!("Failed to open history: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    // Preferences are re-read from the file on every cycle
    let settings = FileSettingsProvider::new(Arc::clone(&store), env_overrides().merge(cli_overrides));
    let orchestrator = Arc::new(build_orchestrator(&config, keys, history, settings));
    let notifier: Arc<dyn Notifier> = Arc::from(create_notifier(config.notify_or_default()));

    let (mut signals, signal_tx) = match DaemonSignalHandler::new().await {
        Ok(s) => s,
        Err(e) => {
            presenter.error(&format!("Failed to setup signal handler: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let socket_path = SocketPath::new();
    let mut socket_server = DaemonSocketServer::new(socket_path.clone());
    if let Err(e) = socket_server.bind() {
        presenter.error(&format!("Failed to bind socket: {}", e));
        return ExitCode::from(EXIT_ERROR);
    }

    let state_rx = orchestrator.subscribe();
    let server_task = tokio::spawn(async move {
        let _ = socket_server.run(signal_tx, state_rx).await;
    });

    presenter.daemon_status("Started, waiting for commands...");
    presenter.info(&format!(
        "PID: {} | Socket: {} | Max recording: {}",
        std::process::id(),
        socket_path.path().display(),
        max_duration
    ));

    let clean_exit = daemon_loop(
        &orchestrator,
        &notifier,
        &mut signals,
        &presenter,
        max_duration.as_millis(),
        SHUTDOWN_GRACE,
    )
    .await;

    // Dropping the server removes the socket file
    server_task.abort();
    let _ = server_task.await;
    let _ = pid_file.release();

    if clean_exit {
        ExitCode::from(EXIT_SUCCESS)
    } else {
        ExitCode::from(EXIT_ERROR)
    }
}

async fn daemon_loop<R, T, M, P, H, S>(
    orchestrator: &Arc<DictationOrchestrator<R, T, M, P, H, S>>,
    notifier: &Arc<dyn Notifier>,
    signals: &mut DaemonSignalHandler,
    presenter: &Presenter,
    max_duration_ms: u64,
    shutdown_grace: StdDuration,
) -> bool
where
    R: AudioCapture + 'static,
    T: Transcriber + 'static,
    M: Reasoner + 'static,
    P: Paster + 'static,
    H: TranscriptionHistory + 'static,
    S: SettingsProvider + 'static,
{
    let mut processing = JoinSet::new();

    let clean_exit = loop {
        while processing.try_join_next().is_some() {}

        let signal = if orchestrator.state() == DictationState::Recording {
            let remaining_ms = max_duration_ms.saturating_sub(orchestrator.recording_elapsed_ms());
            if remaining_ms == 0 {
                presenter.warn("Max duration reached, auto-stopping");
                Some(DaemonSignal::Toggle)
            } else {
                let wait = StdDuration::from_millis(remaining_ms.min(MAX_DURATION_POLL));
                match timeout(wait, signals.recv()).await {
                    Ok(signal) => signal,
                    Err(_) => continue,
                }
            }
        } else {
            signals.recv().await
        };

        match signal {
            Some(DaemonSignal::Toggle) => {
                handle_toggle(orchestrator, notifier, presenter, &mut processing).await
            }
            Some(DaemonSignal::Cancel) => match orchestrator.cancel().await {
                Ok(true) => presenter.daemon_status("Recording cancelled"),
                Ok(false) => presenter.warn("Not recording, nothing to cancel"),
                Err(e) => presenter.error(&format!("Failed to cancel: {}", e)),
            },
            Some(DaemonSignal::Shutdown) => {
                if let Err(e) = orchestrator.cancel().await {
                    presenter.error(&format!("Failed to cancel recording: {}", e));
                }
                presenter.daemon_status("Shutting down...");
                break true;
            }
            None => break false,
        }
    };

    drain_processing(&mut processing, notifier, presenter, shutdown_grace).await;
    clean_exit
}

/// Let an in-flight cycle deliver its text, up to `grace`; abort it after that.
async fn drain_processing(
    processing: &mut JoinSet<()>,
    notifier: &Arc<dyn Notifier>,
    presenter: &Presenter,
    grace: StdDuration,
) {
    if processing.is_empty() {
        return;
    }

    presenter.daemon_status("Waiting for the current transcription to finish...");
    let drained = timeout(grace, async {
        while processing.join_next().await.is_some() {}
    })
    .await;

    if drained.is_err() {
        processing.abort_all();
        let message = "Shutdown interrupted processing; the last recording was not transcribed";
        warn!(grace_secs = grace.as_secs(), "Abandoned in-flight dictation");
        presenter.warn(message);
        notify(notifier.as_ref(), "Transcription abandoned", message, NotificationIcon::Warning)
            .await;
    }
}

async fn handle_toggle<R, T, M, P, H, S>(
    orchestrator: &Arc<DictationOrchestrator<R, T, M, P, H, S>>,
    notifier: &Arc<dyn Notifier>,
    presenter: &Presenter,
    processing: &mut JoinSet<()>,
) where
    R: AudioCapture + 'static,
    T: Transcriber + 'static,
    M: Reasoner + 'static,
    P: Paster + 'static,
    H: TranscriptionHistory + 'static,
    S: SettingsProvider + 'static,
{
    match orchestrator.start_recording().await {
        Ok(StartOutcome::Started) => {
            presenter.daemon_status("Recording...");
            notify(notifier.as_ref(), "Recording", "Speak now", NotificationIcon::Recording).await;
        }
        Ok(StartOutcome::AlreadyRecording) => {
            stop_and_spawn_processing(orchestrator, notifier, presenter, processing).await
        }
        Ok(StartOutcome::StillProcessing) => {
            presenter.warn("Still processing the previous recording");
        }
        Err(e) => {
            presenter.error(&format!("Failed to start recording: {}", e));
            notify(notifier.as_ref(), "Recording failed", &e.to_string(), NotificationIcon::Error)
                .await;
        }
    }
}

/// Stop capture inline, then run the pipeline on a task so the loop keeps
/// answering status and refusing toggles while processing.
async fn stop_and_spawn_processing<R, T, M, P, H, S>(
    orchestrator: &Arc<DictationOrchestrator<R, T, M, P, H, S>>,
    notifier: &Arc<dyn Notifier>,
    presenter: &Presenter,
    processing: &mut JoinSet<()>,
) where
    R: AudioCapture + 'static,
    T: Transcriber + 'static,
    M: Reasoner + 'static,
    P: Paster + 'static,
    H: TranscriptionHistory + 'static,
    S: SettingsProvider + 'static,
{
    let clip = match orchestrator.stop_recording().await {
        Ok(clip) => clip,
        Err(e) => {
            presenter.error(&format!("Failed to stop recording: {}", e));
            presenter.daemon_status("Idle (error)");
            notify(notifier.as_ref(), "Recording failed", &e.to_string(), NotificationIcon::Error)
                .await;
            return;
        }
    };

    presenter.daemon_status(&format!("Processing ({})...", clip.human_readable_size()));
    notify(notifier.as_ref(), "Processing", "Transcribing...", NotificationIcon::Processing).await;

    let orchestrator = Arc::clone(orchestrator);
    let notifier = Arc::clone(notifier);
    processing.spawn(async move {
        let presenter = Presenter::new();
        match orchestrator.process_clip(clip).await {
            Ok(output) => {
                info!(source = %output.source, "Dictation delivered");
                presenter.output(&output.text);
                report_side_effects(&presenter, &output);
                presenter.daemon_status("Idle");
                notify(notifier.as_ref(), "Transcribed", &output.text, NotificationIcon::Success)
                    .await;
            }
            Err(e) => {
                presenter.error(&format!("Transcription failed: {}", e));
                presenter.daemon_status("Idle (error)");
                notify(notifier.as_ref(), "Transcription failed", &e.to_string(), NotificationIcon::Error)
                    .await;
            }
        }
        debug!(state = %orchestrator.state(), "Processing task finished");
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        DictationPreferences, NotificationError, PasteError, RecordingError, ReasoningError,
        TranscriptionError,
    };
    use crate::domain::reasoning::ReasoningConfig;
    use crate::domain::transcription::{AudioClip, AudioMimeType, LanguageHint};
    use crate::infrastructure::SqliteHistory;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex as StdMutex;
    use tokio::time::Instant;

    #[derive(Default)]
    struct FakeMicrophone {
        started_at: StdMutex<Option<Instant>>,
        starts: Arc<AtomicU32>,
        silent: bool,
    }

    #[async_trait]
    impl AudioCapture for FakeMicrophone {
        async fn start(&self) -> Result<(), RecordingError> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            *self.started_at.lock().unwrap() = Some(Instant::now());
            Ok(())
        }

        async fn stop(&self) -> Result<AudioClip, RecordingError> {
            self.started_at.lock().unwrap().take();
            let data = if self.silent { Vec::new() } else { vec![7; 32] };
            Ok(AudioClip::new(data, AudioMimeType::Wav))
        }

        async fn cancel(&self) -> Result<(), RecordingError> {
            self.started_at.lock().unwrap().take();
            Ok(())
        }

        fn is_recording(&self) -> bool {
            self.started_at.lock().unwrap().is_some()
        }

        fn elapsed_ms(&self) -> u64 {
            self.started_at
                .lock()
                .unwrap()
                .map(|t| t.elapsed().as_millis() as u64)
                .unwrap_or(0)
        }
    }

    struct SlowTranscriber {
        delay: StdDuration,
    }

    #[async_trait]
    impl Transcriber for SlowTranscriber {
        async fn transcribe(
            &self,
            _clip: &AudioClip,
            _language: &LanguageHint,
        ) -> Result<String, TranscriptionError> {
            tokio::time::sleep(self.delay).await;
            Ok("daemon dictation".to_string())
        }
    }

    struct OfflineReasoner;

    #[async_trait]
    impl Reasoner for OfflineReasoner {
        async fn is_available(&self) -> bool {
            false
        }

        async fn clean(
            &self,
            _text: &str,
            _model_id: &str,
            _persona: Option<&str>,
            _config: &ReasoningConfig,
        ) -> Result<String, ReasoningError> {
            Err(ReasoningError::CredentialNotFound)
        }
    }

    #[derive(Clone, Default)]
    struct SharedPaster(Arc<StdMutex<Vec<String>>>);

    impl SharedPaster {
        fn pasted(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Paster for SharedPaster {
        async fn paste(&self, text: &str) -> Result<(), PasteError> {
            self.0.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        shown: StdMutex<Vec<(String, NotificationIcon)>>,
    }

    impl RecordingNotifier {
        fn titles(&self) -> Vec<String> {
            self.shown.lock().unwrap().iter().map(|(t, _)| t.clone()).collect()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(
            &self,
            title: &str,
            _message: &str,
            icon: NotificationIcon,
        ) -> Result<(), NotificationError> {
            self.shown.lock().unwrap().push((title.to_string(), icon));
            Ok(())
        }
    }

    type TestOrchestrator = DictationOrchestrator<
        FakeMicrophone,
        SlowTranscriber,
        OfflineReasoner,
        SharedPaster,
        SqliteHistory,
        DictationPreferences,
    >;

    struct Daemon {
        orchestrator: Arc<TestOrchestrator>,
        notifier: Arc<RecordingNotifier>,
        paster: SharedPaster,
        starts: Arc<AtomicU32>,
    }

    impl Daemon {
        fn new(silent: bool, processing_time: StdDuration) -> Self {
            let microphone = FakeMicrophone {
                silent,
                ..FakeMicrophone::default()
            };
            let starts = Arc::clone(&microphone.starts);
            let paster = SharedPaster::default();
            let preferences = DictationPreferences {
                paste: true,
                save_history: false,
                ..DictationPreferences::default()
            };
            let orchestrator = DictationOrchestrator::new(
                microphone,
                SlowTranscriber {
                    delay: processing_time,
                },
                OfflineReasoner,
                paster.clone(),
                SqliteHistory::in_memory().unwrap(),
                preferences,
            );
            Self {
                orchestrator: Arc::new(orchestrator),
                notifier: Arc::new(RecordingNotifier::default()),
                paster,
                starts,
            }
        }

        /// Queue `commands`, then run the loop until it exits
        async fn run(&self, commands: &[DaemonSignal], max_duration_ms: u64, grace: StdDuration) -> bool {
            let (mut signals, tx) = DaemonSignalHandler::detached();
            for command in commands {
                tx.send(*command).await.unwrap();
            }
            drop(tx);
            self.run_with(&mut signals, max_duration_ms, grace).await
        }

        async fn run_with(
            &self,
            signals: &mut DaemonSignalHandler,
            max_duration_ms: u64,
            grace: StdDuration,
        ) -> bool {
            let notifier: Arc<dyn Notifier> = self.notifier.clone();
            daemon_loop(
                &self.orchestrator,
                &notifier,
                signals,
                &Presenter::new(),
                max_duration_ms,
                grace,
            )
            .await
        }
    }

    use DaemonSignal::{Shutdown, Toggle};

    #[tokio::test(start_paused = true)]
    async fn shutdown_waits_for_in_flight_processing() {
        let daemon = Daemon::new(false, StdDuration::from_secs(2));

        let clean = daemon
            .run(&[Toggle, Toggle, Shutdown], 60_000, SHUTDOWN_GRACE)
            .await;

        assert!(clean);
        assert_eq!(daemon.paster.pasted(), vec!["Daemon dictation".to_string()]);
        assert_eq!(daemon.orchestrator.state(), DictationState::Idle);
        assert!(daemon.notifier.titles().contains(&"Transcribed".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_while_processing_is_refused() {
        let daemon = Daemon::new(false, StdDuration::from_secs(2));

        daemon
            .run(&[Toggle, Toggle, Toggle, Shutdown], 60_000, SHUTDOWN_GRACE)
            .await;

        assert_eq!(daemon.starts.load(Ordering::SeqCst), 1);
        assert_eq!(daemon.paster.pasted().len(), 1);
        assert_eq!(daemon.orchestrator.state(), DictationState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn max_duration_stops_and_processes() {
        let daemon = Daemon::new(false, StdDuration::from_millis(100));
        let (mut signals, tx) = DaemonSignalHandler::detached();
        tx.send(Toggle).await.unwrap();
        tokio::spawn(async move {
            tokio::time::sleep(StdDuration::from_secs(10)).await;
            let _ = tx.send(Shutdown).await;
        });

        let started = Instant::now();
        let clean = daemon
            .run_with(&mut signals, 1_000, SHUTDOWN_GRACE)
            .await;

        assert!(clean);
        assert_eq!(daemon.starts.load(Ordering::SeqCst), 1);
        assert_eq!(daemon.paster.pasted(), vec!["Daemon dictation".to_string()]);
        assert!(started.elapsed() >= StdDuration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_abandons_processing_after_grace() {
        let daemon = Daemon::new(false, StdDuration::from_secs(600));

        let started = Instant::now();
        let clean = daemon
            .run(&[Toggle, Toggle, Shutdown], 60_000, StdDuration::from_secs(5))
            .await;

        assert!(clean);
        assert!(started.elapsed() < StdDuration::from_secs(600));
        assert!(daemon.paster.pasted().is_empty());
        assert!(daemon
            .notifier
            .titles()
            .contains(&"Transcription abandoned".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_recording_is_notified() {
        let daemon = Daemon::new(true, StdDuration::from_millis(10));

        daemon.run(&[Toggle, Toggle, Shutdown], 60_000, SHUTDOWN_GRACE).await;

        let shown = daemon.notifier.shown.lock().unwrap().clone();
        assert!(shown.contains(&("Recording failed".to_string(), NotificationIcon::Error)));
        assert!(daemon.paster.pasted().is_empty());
        assert_eq!(daemon.orchestrator.state(), DictationState::Idle);
    }
}
