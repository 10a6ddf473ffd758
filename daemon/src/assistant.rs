//! Assistant event loop
//!
//! Single owner of the interpreter and the recognition gate. Every input
//! (recognizer events, direct transcripts, timer ticks) is processed to
//! completion before the next one, and the resulting page actions are
//! broadcast to the attached surfaces.

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info};

use crate::config::AssistantConfig;
use crate::events::{PageAction, TimerKind};
use crate::interpreter::Interpreter;
use crate::recognition::{RecognitionEvent, RecognitionSession};
use crate::state::CountdownState;

/// Inputs accepted by the assistant loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Event from the page's speech recognizer
    Recognition(RecognitionEvent),
    /// Already-final transcript, bypassing the session gate
    Transcript(String),
    /// Timer tick carrying the generation it was started with
    Tick { timer: TimerKind, generation: u64 },
}

/// The assistant: recognition gate in front of the interpreter
pub struct Assistant {
    interpreter: Interpreter,
    session: RecognitionSession,
    action_tx: broadcast::Sender<PageAction>,
}

impl Assistant {
    pub fn new(config: AssistantConfig, action_tx: broadcast::Sender<PageAction>) -> Self {
        Self {
            interpreter: Interpreter::new(&config),
            session: RecognitionSession::new(),
            action_tx,
        }
    }

    #[cfg(test)]
    pub fn modes(&self) -> crate::state::VisualModes {
        self.interpreter.modes()
    }

    pub fn countdown_state(&self) -> CountdownState {
        self.interpreter.countdown_state()
    }

    #[cfg(test)]
    pub fn session_state(&self) -> crate::recognition::SessionState {
        self.session.state()
    }

    /// Run until every input sender is dropped
    pub async fn run(&mut self, mut input_rx: mpsc::Receiver<Input>) {
        info!("assistant started");

        while let Some(input) = input_rx.recv().await {
            self.handle(input);
        }

        info!("assistant stopped");
    }

    /// Process one input and broadcast the resulting actions
    pub fn handle(&mut self, input: Input) -> Vec<PageAction> {
        let actions = self.process(input);
        for action in &actions {
            debug!(%action, "emitting page action");
            let _ = self.action_tx.send(action.clone());
        }
        actions
    }

    fn process(&mut self, input: Input) -> Vec<PageAction> {
        match input {
            Input::Recognition(RecognitionEvent::Capabilities(caps)) => {
                // A capability report marks a fresh page load
                info!(?caps, "page connected, resetting assistant state");
                let mut actions = self.interpreter.reset();
                actions.extend(
                    self.session
                        .handle(RecognitionEvent::Capabilities(caps))
                        .actions,
                );
                actions
            }
            Input::Recognition(event) => {
                let output = self.session.handle(event);
                let mut actions = output.actions;
                if let Some(transcript) = output.transcript {
                    actions.extend(self.interpreter.handle_transcript(&transcript));
                }
                actions
            }
            Input::Transcript(text) => self.interpreter.handle_transcript(&text),
            Input::Tick { timer, generation } => self.interpreter.handle_tick(timer, generation),
        }
    }
}
