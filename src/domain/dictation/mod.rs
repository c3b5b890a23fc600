//! Dictation cycle state

mod session;

pub use session::{DictationSession, DictationState, InvalidStateTransition, TextSource};
