//! Dictation session state machine

use std::fmt;
use thiserror::Error;

/// Orchestrator states for one dictation cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DictationState {
    #[default]
    Idle,
    Recording,
    Processing,
}

impl DictationState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Processing => "processing",
        }
    }
}

impl fmt::Display for DictationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which path produced the delivered text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextSource {
    /// Transcript plus local cleanup
    Cloud,
    /// Transcript refined by the reasoning model
    CloudReasoned,
}

impl TextSource {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cloud => "cloud",
            Self::CloudReasoned => "cloud-reasoned",
        }
    }
}

impl fmt::Display for TextSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while {current_state}")]
pub struct InvalidStateTransition {
    pub current_state: DictationState,
    pub action: &'static str,
}

/// Dictation session entity.
///
/// ```text
/// Idle       --start-->    Recording
/// Recording  --stop-->     Processing
/// Recording  --cancel-->   Idle
/// Processing --complete--> Idle
/// ```
#[derive(Debug, Default)]
pub struct DictationSession {
    state: DictationState,
}

impl DictationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DictationState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == DictationState::Idle
    }

    pub fn is_recording(&self) -> bool {
        self.state == DictationState::Recording
    }

    pub fn is_processing(&self) -> bool {
        self.state == DictationState::Processing
    }

    fn transition(
        &mut self,
        from: DictationState,
        to: DictationState,
        action: &'static str,
    ) -> Result<(), InvalidStateTransition> {
        if self.state != from {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action,
            });
        }
        self.state = to;
        Ok(())
    }

    pub fn start(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(DictationState::Idle, DictationState::Recording, "start recording")
    }

    pub fn stop(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(DictationState::Recording, DictationState::Processing, "stop recording")
    }

    pub fn cancel(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(DictationState::Recording, DictationState::Idle, "cancel recording")
    }

    pub fn complete(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(DictationState::Processing, DictationState::Idle, "complete processing")
    }

    /// Return to idle from any state. Used when capture fails to start.
    pub fn reset(&mut self) {
        self.state = DictationState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_idle() {
        let session = DictationSession::new();
        assert!(session.is_idle());
        assert!(!session.is_recording());
        assert!(!session.is_processing());
    }

    #[test]
    fn start_twice_fails_without_state_change() {
        let mut session = DictationSession::new();
        session.start().unwrap();

        let err = session.start().unwrap_err();
        assert_eq!(err.current_state, DictationState::Recording);
        assert!(session.is_recording());
    }

    #[test]
    fn start_while_processing_fails() {
        let mut session = DictationSession::new();
        session.start().unwrap();
        session.stop().unwrap();

        let err = session.start().unwrap_err();
        assert_eq!(err.current_state, DictationState::Processing);
    }

    #[test]
    fn stop_from_idle_fails() {
        let mut session = DictationSession::new();
        let err = session.stop().unwrap_err();
        assert_eq!(err.current_state, DictationState::Idle);
    }

    #[test]
    fn cancel_returns_to_idle() {
        let mut session = DictationSession::new();
        session.start().unwrap();
        session.cancel().unwrap();
        assert!(session.is_idle());
        assert!(session.cancel().is_err());
    }

    #[test]
    fn complete_only_from_processing() {
        let mut session = DictationSession::new();
        session.start().unwrap();
        assert!(session.complete().is_err());

        session.stop().unwrap();
        session.complete().unwrap();
        assert!(session.is_idle());
    }

    #[test]
    fn full_cycle_repeats() {
        let mut session = DictationSession::new();
        for _ in 0..2 {
            session.start().unwrap();
            session.stop().unwrap();
            session.complete().unwrap();
        }
        assert!(session.is_idle());
    }

    #[test]
    fn reset_from_recording() {
        let mut session = DictationSession::new();
        session.start().unwrap();
        session.reset();
        assert!(session.is_idle());
    }

    #[test]
    fn display() {
        assert_eq!(DictationState::Processing.to_string(), "processing");
        assert_eq!(TextSource::Cloud.to_string(), "cloud");
        assert_eq!(TextSource::CloudReasoned.to_string(), "cloud-reasoned");

        let err = InvalidStateTransition {
            current_state: DictationState::Processing,
            action: "start recording",
        };
        assert_eq!(
            err.to_string(),
            "Invalid state transition: cannot start recording while processing"
        );
    }
}
