//! Voice command interpreter
//!
//! Turns a finalized, lowercase transcript into exactly one intent and the
//! page actions that carry it out:
//! - registry: project lookup, runs before everything else
//! - intent: ordered (trigger, intent) rules, first match wins
//! - resume / dictation: keyword helpers used by individual intents
//! - engine: owns the mode flags and countdown, executes intents

mod dictation;
mod engine;
mod intent;
mod registry;
mod resume;

pub use engine::Interpreter;
pub use registry::Project;
pub use resume::{ResumeEntry, ResumeVariant};
