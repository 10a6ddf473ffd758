//! Recognition session gate
//!
//! Unsupported -> (capabilities) -> Idle <-> Listening. A session opens on
//! a start request and closes on the first final result, an engine error or
//! the engine ending on its own.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::events::PageAction;

/// What the page reported it can do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub speech_recognition: bool,
    #[serde(default = "default_true")]
    pub speech_synthesis: bool,
}

fn default_true() -> bool {
    true
}

/// Events forwarded from the page's speech recognizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// Capability report, sent once per page load
    Capabilities(Capabilities),
    /// The assistant trigger was pressed
    Start,
    /// Recognizer produced a result
    Result { transcript: String, is_final: bool },
    /// Recognizer failed
    Error { message: String },
    /// Recognizer stopped without a result
    End,
}

/// Session lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    /// No speech recognition on this platform; the feature is hidden
    Unsupported,
    #[default]
    Idle,
    Listening,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Unsupported => write!(f, "Unsupported"),
            SessionState::Idle => write!(f, "Idle"),
            SessionState::Listening => write!(f, "Listening"),
        }
    }
}

/// Errors for requests the gate refuses
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("speech recognition is not supported")]
    Unsupported,

    #[error("a recognition session is already open")]
    AlreadyListening,

    #[error("no recognition session is open")]
    NotListening,
}

/// What the gate produced for one event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionOutput {
    /// Actions to perform on the page
    pub actions: Vec<PageAction>,
    /// Final lowercase transcript for the interpreter
    pub transcript: Option<String>,
}

impl SessionOutput {
    fn actions(actions: Vec<PageAction>) -> Self {
        Self {
            actions,
            transcript: None,
        }
    }
}

/// Single-session recognition gate
#[derive(Debug, Default)]
pub struct RecognitionSession {
    state: SessionState,
}

impl RecognitionSession {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Process one recognizer event
    pub fn handle(&mut self, event: RecognitionEvent) -> SessionOutput {
        let result = match event {
            RecognitionEvent::Capabilities(caps) => Ok(self.set_capabilities(caps)),
            RecognitionEvent::Start => self.start(),
            RecognitionEvent::Result {
                transcript,
                is_final,
            } => self.result(transcript, is_final),
            RecognitionEvent::Error { message } => self.error(&message),
            RecognitionEvent::End => self.end(),
        };

        result.unwrap_or_else(|e| {
            debug!(error = %e, state = %self.state, "recognition event ignored");
            SessionOutput::default()
        })
    }

    fn set_capabilities(&mut self, caps: Capabilities) -> SessionOutput {
        if !caps.speech_synthesis {
            warn!("speech synthesis unavailable, responses will be silent");
        }

        if caps.speech_recognition {
            self.transition_to(SessionState::Idle);
            SessionOutput::default()
        } else {
            info!("speech recognition unsupported, hiding assistant trigger");
            self.transition_to(SessionState::Unsupported);
            SessionOutput::actions(vec![PageAction::HideTrigger])
        }
    }

    fn start(&mut self) -> Result<SessionOutput, SessionError> {
        match self.state {
            SessionState::Unsupported => Err(SessionError::Unsupported),
            SessionState::Listening => Err(SessionError::AlreadyListening),
            SessionState::Idle => {
                self.transition_to(SessionState::Listening);
                Ok(SessionOutput::actions(vec![PageAction::Listening {
                    active: true,
                }]))
            }
        }
    }

    fn result(
        &mut self,
        transcript: String,
        is_final: bool,
    ) -> Result<SessionOutput, SessionError> {
        self.ensure_listening()?;
        if !is_final {
            debug!("interim result ignored");
            return Ok(SessionOutput::default());
        }

        self.transition_to(SessionState::Idle);
        Ok(SessionOutput {
            actions: vec![PageAction::Listening { active: false }],
            transcript: Some(transcript.trim().to_lowercase()),
        })
    }

    fn error(&mut self, message: &str) -> Result<SessionOutput, SessionError> {
        self.ensure_listening()?;
        warn!(message, "recognition engine error");
        self.transition_to(SessionState::Idle);
        Ok(SessionOutput::actions(vec![
            PageAction::speak("Voice system error."),
            PageAction::Listening { active: false },
        ]))
    }

    fn end(&mut self) -> Result<SessionOutput, SessionError> {
        self.ensure_listening()?;
        self.transition_to(SessionState::Idle);
        Ok(SessionOutput::actions(vec![PageAction::Listening {
            active: false,
        }]))
    }

    fn ensure_listening(&self) -> Result<(), SessionError> {
        if self.state == SessionState::Listening {
            Ok(())
        } else {
            Err(SessionError::NotListening)
        }
    }

    fn transition_to(&mut self, new_state: SessionState) {
        if new_state != self.state {
            debug!(from = %self.state, to = %new_state, "recognition session transition");
        }
        self.state = new_state;
    }
}
