//! PPQ Voice - voice dictation from the command line
//!
//! Records the microphone, transcribes the clip with an OpenAI-compatible
//! speech-to-text endpoint, optionally cleans the transcript up with a chat
//! model, then prints, pastes and saves the result.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Value objects, the dictation session state machine, errors
//! - **Application**: Port traits, retry, key resolution and the orchestrator
//! - **Infrastructure**: Adapters (cpal, HTTP APIs, clipboard, SQLite, etc.)
//! - **CLI**: Argument parsing, presenter, one-shot runner and daemon

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
