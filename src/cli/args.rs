//! CLI argument definitions using Clap

use clap::{Parser, Subcommand};

use crate::application::ports::DEFAULT_LIST_LIMIT;
use crate::domain::config::AppConfig;

/// PPQ Voice - dictation with cloud transcription and optional LLM cleanup
#[derive(Parser, Debug)]
#[command(name = "ppq-voice")]
#[command(version)]
#[command(about = "Voice dictation: record, transcribe, clean up, paste")]
#[command(long_about = None)]
pub struct Cli {
    /// Recording duration (e.g., 10s, 1m, 2m30s). Ctrl+C stops early
    #[arg(short = 'd', long, value_name = "TIME", conflicts_with = "daemon")]
    pub duration: Option<String>,

    /// Spoken language code, or "auto" to detect
    #[arg(short = 'l', long, value_name = "LANG")]
    pub language: Option<String>,

    /// Clean up the transcript with a reasoning model
    #[arg(short = 'r', long)]
    pub reason: bool,

    /// Reasoning model id
    #[arg(short = 'm', long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Assistant name you may address while dictating
    #[arg(short = 'a', long, value_name = "NAME")]
    pub agent_name: Option<String>,

    /// Paste the result into the focused window
    #[arg(short = 'p', long)]
    pub paste: bool,

    /// Show desktop notifications
    #[arg(short = 'n', long)]
    pub notify: bool,

    /// Do not save the result to the history database
    #[arg(long)]
    pub no_history: bool,

    /// Verbose diagnostics on stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Run as daemon (control via: ppq-voice daemon toggle/cancel/status)
    #[arg(long)]
    pub daemon: bool,

    /// Auto-stop recordings after this long in daemon mode
    #[arg(long, value_name = "TIME", requires = "daemon")]
    pub max_duration: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Flags as the highest-precedence config layer
    pub fn config_overrides(&self) -> AppConfig {
        AppConfig {
            duration: self.duration.clone(),
            max_duration: self.max_duration.clone(),
            language: self.language.clone(),
            reasoning_model: self.model.clone(),
            agent_name: self.agent_name.clone(),
            use_reasoning: self.reason.then_some(true),
            paste: self.paste.then_some(true),
            notify: self.notify.then_some(true),
            save_history: self.no_history.then_some(false),
            ..AppConfig::empty()
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Send commands to running daemon
    Daemon {
        #[command(subcommand)]
        action: DaemonAction,
    },
    /// Browse saved transcriptions
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonAction {
    /// Toggle recording (start if idle, stop and process if recording)
    Toggle,
    /// Cancel current recording without transcribing
    Cancel,
    /// Show daemon status
    Status,
}

impl DaemonAction {
    /// Wire command sent over the control socket
    pub fn as_command(&self) -> &'static str {
        match self {
            Self::Toggle => "toggle",
            Self::Cancel => "cancel",
            Self::Status => "status",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum HistoryAction {
    /// Show recent transcriptions, newest first
    List {
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: usize,
    },
    /// Delete one transcription
    Delete { id: i64 },
    /// Delete all transcriptions
    Clear,
}
