//! Composition root and the one-shot runner

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use tokio::time::{interval, sleep};
use tracing::warn;

use crate::application::ports::{
    ConfigStore, NotificationIcon, Notifier, SecretStore, SettingsProvider,
};
use crate::application::{ApiKeyResolver, CredentialError, DictationOrchestrator, DictationOutput};
use crate::domain::config::endpoint::base_url_from_env;
use crate::domain::config::AppConfig;
use crate::domain::recording::Duration;
use crate::infrastructure::config::{env_file_path, preferences_from};
use crate::infrastructure::{
    create_notifier, ChatCompletionReasoner, ClipboardPaster, ConfigFileSecretStore, CpalRecorder,
    EnvFileSecretStore, SqliteHistory, WhisperApiTranscriber,
};

use super::presenter::Presenter;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

const PROGRESS_TICK: StdDuration = StdDuration::from_millis(100);

/// The orchestrator wired to the production adapters
pub type AppOrchestrator<S> = DictationOrchestrator<
    CpalRecorder,
    WhisperApiTranscriber,
    ChatCompletionReasoner,
    ClipboardPaster,
    SqliteHistory,
    S,
>;

/// Environment layer of the config
pub fn env_overrides() -> AppConfig {
    AppConfig {
        base_url: base_url_from_env(),
        ..AppConfig::empty()
    }
}

/// Merge: defaults < file < env < cli
pub async fn load_merged_config(store: &dyn ConfigStore, cli_overrides: AppConfig) -> AppConfig {
    let file_config = store.load().await.unwrap_or_else(|e| {
        warn!(error = %e, path = %store.path().display(), "Ignoring unreadable config file");
        AppConfig::empty()
    });

    AppConfig::defaults()
        .merge(file_config)
        .merge(env_overrides())
        .merge(cli_overrides)
}

/// Key sources in priority order: environment and `.env`, then the config file
pub fn build_key_resolver(store: Arc<dyn ConfigStore>, config: &AppConfig) -> Arc<ApiKeyResolver> {
    let sources: Vec<Arc<dyn SecretStore>> = vec![
        Arc::new(EnvFileSecretStore::new(env_file_path())),
        Arc::new(ConfigFileSecretStore::new(store)),
    ];
    Arc::new(ApiKeyResolver::with_ttl(sources, config.cache_ttl_or_default()))
}

/// History database, or an in-memory one when the file cannot be opened
pub fn open_history() -> Result<SqliteHistory, String> {
    let path = SqliteHistory::default_path();
    SqliteHistory::open(&path).or_else(|e| {
        warn!(error = %e, path = %path.display(), "History unavailable, using in-memory store");
        SqliteHistory::in_memory().map_err(|e| e.to_string())
    })
}

pub fn build_orchestrator<S: SettingsProvider>(
    config: &AppConfig,
    keys: Arc<ApiKeyResolver>,
    history: SqliteHistory,
    settings: S,
) -> AppOrchestrator<S> {
    let base_url = config.base_url_or_default();
    let timeout = config.request_timeout_or_default();

    let transcriber = WhisperApiTranscriber::new(Arc::clone(&keys), &base_url)
        .with_model(config.transcription_model_or_default())
        .with_retry_policy(config.retry_policy())
        .with_timeout(timeout);
    let reasoner = ChatCompletionReasoner::new(keys, &base_url)
        .with_retry_policy(config.retry_policy())
        .with_token_limits(config.token_limits())
        .with_timeout(timeout);

    DictationOrchestrator::new(
        CpalRecorder::new(),
        transcriber,
        reasoner,
        ClipboardPaster::new(),
        history,
        settings,
    )
}

/// Report paste/history side effects of a finished cycle
pub fn report_side_effects(presenter: &Presenter, output: &DictationOutput) {
    if output.pasted {
        presenter.info("Pasted into focused window");
    }
    if let Some(ref e) = output.paste_error {
        presenter.warn(&e.to_string());
    }
    if let Some(ref e) = output.history_error {
        presenter.warn(&format!("Not saved to history: {}", e));
    }
}

pub async fn notify(notifier: &dyn Notifier, title: &str, message: &str, icon: NotificationIcon) {
    if let Err(e) = notifier.notify(title, message, icon).await {
        warn!(error = %e, "Notification failed");
    }
}

/// Record for `duration` (or until Ctrl+C), then transcribe and deliver
pub async fn run_oneshot(
    config: AppConfig,
    store: Arc<dyn ConfigStore>,
    duration: Duration,
) -> ExitCode {
    let mut presenter = Presenter::new();

    let keys = build_key_resolver(store, &config);
    if !keys.has_key().await {
        presenter.error(&CredentialError::NotFound.to_string());
        return ExitCode::from(EXIT_ERROR);
    }

    let history = match open_history() {
        Ok(history) => history,
        Err(e) => {
            presenter.error(&format!("Failed to open history: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let notifier = create_notifier(config.notify_or_default());
    let orchestrator = build_orchestrator(&config, keys, history, preferences_from(&config));

    if let Err(e) = orchestrator.start_recording().await {
        presenter.error(&e.to_string());
        notify(notifier.as_ref(), "Recording failed", &e.to_string(), NotificationIcon::Error).await;
        return ExitCode::from(EXIT_ERROR);
    }
    notify(notifier.as_ref(), "Recording", "Speak now", NotificationIcon::Recording).await;

    let total_ms = duration.as_millis();
    presenter.start_spinner("Recording...");
    {
        let deadline = sleep(duration.as_std());
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(deadline);
        tokio::pin!(ctrl_c);
        let mut ticker = interval(PROGRESS_TICK);

        loop {
            tokio::select! {
                _ = &mut deadline => break,
                _ = &mut ctrl_c => break,
                _ = ticker.tick() => {
                    presenter.update_recording_progress(orchestrator.recording_elapsed_ms(), total_ms);
                }
            }
        }
    }

    let clip = match orchestrator.stop_recording().await {
        Ok(clip) => clip,
        Err(e) => {
            presenter.spinner_fail(&e.to_string());
            notify(notifier.as_ref(), "Recording failed", &e.to_string(), NotificationIcon::Error)
                .await;
            return ExitCode::from(EXIT_ERROR);
        }
    };

    presenter.update_spinner(&format!("Transcribing ({})...", clip.human_readable_size()));
    notify(notifier.as_ref(), "Processing", "Transcribing...", NotificationIcon::Processing).await;

    match orchestrator.process_clip(clip).await {
        Ok(output) => {
            presenter.spinner_success(&format!("Transcribed ({})", output.source));
            presenter.output(&output.text);
            report_side_effects(&presenter, &output);
            notify(notifier.as_ref(), "Transcribed", &output.text, NotificationIcon::Success).await;
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.spinner_fail(&e.to_string());
            notify(notifier.as_ref(), "Transcription failed", &e.to_string(), NotificationIcon::Error)
                .await;
            ExitCode::from(EXIT_ERROR)
        }
    }
}
