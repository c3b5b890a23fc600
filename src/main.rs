//! PPQ Voice CLI entry point

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use ppq_voice::application::ports::ConfigStore;
use ppq_voice::cli::{
    app::{load_merged_config, open_history},
    handle_config_command, handle_history_command, logging, run_oneshot, Cli, Commands,
    Presenter, EXIT_ERROR, EXIT_USAGE_ERROR,
};
use ppq_voice::domain::recording::Duration;
use ppq_voice::infrastructure::XdgConfigStore;

fn parse_duration(value: Option<&String>, default: Duration, flag: &str) -> Result<Duration, String> {
    match value {
        Some(s) => s
            .parse::<Duration>()
            .map_err(|e| format!("Invalid {}: {}", flag, e)),
        None => Ok(default),
    }
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let presenter = Presenter::new();

    let store: Arc<dyn ConfigStore> = Arc::new(XdgConfigStore::new());
    let cli_overrides = cli.config_overrides();

    match cli.command {
        Some(Commands::Config { action }) => {
            if let Err(e) = handle_config_command(action, store.as_ref(), &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        Some(Commands::History { action }) => {
            let history = match open_history() {
                Ok(history) => history,
                Err(e) => {
                    presenter.error(&e);
                    return ExitCode::from(EXIT_ERROR);
                }
            };
            if let Err(e) = handle_history_command(action, &history, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        #[cfg(unix)]
        Some(Commands::Daemon { action }) => {
            if let Err(e) = ppq_voice::cli::handle_daemon_command(action, &presenter).await {
                presenter.error(&e);
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        #[cfg(not(unix))]
        Some(Commands::Daemon { .. }) => {
            presenter.error("Daemon mode is only supported on Unix systems");
            return ExitCode::from(EXIT_ERROR);
        }
        None => {}
    }

    let config = load_merged_config(store.as_ref(), cli_overrides.clone()).await;

    if cli.daemon {
        let max_duration = match parse_duration(
            config.max_duration.as_ref(),
            Duration::default_max_duration(),
            "max-duration",
        ) {
            Ok(d) => d,
            Err(e) => {
                presenter.error(&e);
                return ExitCode::from(EXIT_USAGE_ERROR);
            }
        };

        #[cfg(unix)]
        {
            return ppq_voice::cli::run_daemon(config, store, cli_overrides, max_duration).await;
        }

        #[cfg(not(unix))]
        {
            let _ = max_duration;
            presenter.error("Daemon mode is only supported on Unix systems");
            return ExitCode::from(EXIT_ERROR);
        }
    }

    let duration = match parse_duration(
        config.duration.as_ref(),
        Duration::default_duration(),
        "duration",
    ) {
        Ok(d) => d,
        Err(e) => {
            presenter.error(&e);
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };

    run_oneshot(config, store, duration).await
}
