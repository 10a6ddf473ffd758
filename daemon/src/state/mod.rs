//! Assistant state
//!
//! Two pieces of mutable state live here:
//! - VisualModes: one theme (Normal, Combat, Stealth, NightVision) plus the
//!   orthogonal flight and security-alert overlays
//! - Countdown: the self-destruct state machine (Idle, Counting, Aborted,
//!   Expired), the only multi-turn intent

mod countdown;
mod modes;

pub use countdown::{Countdown, CountdownState, CountdownStep, DEFAULT_COUNTDOWN_TICKS};
pub use modes::{ThemeMode, VisualModes};
