//! CLI layer - Command-line interface
//!
//! Argument parsing, output formatting, the composition root and the
//! one-shot and daemon runners.

pub mod app;
pub mod args;
pub mod config_cmd;
pub mod history_cmd;
pub mod logging;
pub mod presenter;

#[cfg(unix)]
pub mod daemon_app;
#[cfg(unix)]
pub mod daemon_cmd;
#[cfg(unix)]
pub mod pid_file;
#[cfg(unix)]
pub mod signals;
#[cfg(unix)]
pub mod socket;

pub use app::{run_oneshot, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR};
pub use args::{Cli, Commands, ConfigAction, DaemonAction, HistoryAction};
pub use config_cmd::handle_config_command;
pub use history_cmd::handle_history_command;
pub use presenter::Presenter;

#[cfg(unix)]
pub use daemon_app::run_daemon;
#[cfg(unix)]
pub use daemon_cmd::handle_daemon_command;
