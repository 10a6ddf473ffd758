//! Self-destruct countdown state machine
//!
//! Idle -> Counting -> (Aborted | Expired). A new start from any state
//! replaces the previous run and bumps the generation so that ticks from
//! the superseded timer are discarded.

use std::time::Instant;

use tracing::{debug, info};

/// Ticks in a full countdown, one per second
pub const DEFAULT_COUNTDOWN_TICKS: u32 = 10;

/// The four states of the countdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CountdownState {
    /// Never started
    #[default]
    Idle,
    /// Running, with seconds left before expiry
    Counting { remaining: u32 },
    /// Cancelled by the passcode before reaching zero
    Aborted,
    /// Reached zero; the terminal action has fired
    Expired,
}

impl std::fmt::Display for CountdownState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CountdownState::Idle => write!(f, "Idle"),
            CountdownState::Counting { remaining } => write!(f, "Counting({})", remaining),
            CountdownState::Aborted => write!(f, "Aborted"),
            CountdownState::Expired => write!(f, "Expired"),
        }
    }
}

/// Result of feeding one timer tick into the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    /// Still counting
    Ticked { remaining: u32 },
    /// This tick brought the countdown to zero
    Expired,
    /// Not counting, or the tick belongs to an older run
    Ignored,
}

/// Countdown state machine
#[derive(Debug)]
pub struct Countdown {
    state: CountdownState,
    ticks: u32,
    generation: u64,
    started_at: Option<Instant>,
}

impl Countdown {
    /// Create an idle countdown that runs for `ticks` ticks once started
    pub fn new(ticks: u32) -> Self {
        Self {
            state: CountdownState::Idle,
            ticks: ticks.max(1),
            generation: 0,
            started_at: None,
        }
    }

    pub fn state(&self) -> CountdownState {
        self.state
    }

    pub fn is_counting(&self) -> bool {
        matches!(self.state, CountdownState::Counting { .. })
    }

    /// Seconds shown on the overlay when a run starts
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Start a fresh run, replacing any run in progress.
    /// Returns the generation the timer must tag its ticks with.
    pub fn start(&mut self) -> u64 {
        if self.is_counting() {
            debug!(generation = self.generation, "replacing running countdown");
        }
        self.generation += 1;
        self.started_at = Some(Instant::now());
        self.transition_to(CountdownState::Counting {
            remaining: self.ticks,
        });
        self.generation
    }

    /// Cancel a running countdown. Returns false if nothing was counting.
    pub fn abort(&mut self) -> bool {
        if !self.is_counting() {
            return false;
        }
        self.transition_to(CountdownState::Aborted);
        true
    }

    /// Return to idle for a new page load. The generation keeps counting so
    /// ticks tagged before the reset never match a later run.
    pub fn reset(&mut self) {
        if self.state != CountdownState::Idle {
            self.transition_to(CountdownState::Idle);
        }
        self.started_at = None;
    }

    /// Advance by one tick of the given generation
    pub fn tick(&mut self, generation: u64) -> CountdownStep {
        if generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                "dropping stale countdown tick"
            );
            return CountdownStep::Ignored;
        }

        match self.state {
            CountdownState::Counting { remaining } if remaining > 1 => {
                let remaining = remaining - 1;
                self.state = CountdownState::Counting { remaining };
                CountdownStep::Ticked { remaining }
            }
            CountdownState::Counting { .. } => {
                self.transition_to(CountdownState::Expired);
                CountdownStep::Expired
            }
            _ => CountdownStep::Ignored,
        }
    }

    fn transition_to(&mut self, new_state: CountdownState) {
        let elapsed_ms = self
            .started_at
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0);

        info!(
            from = %self.state,
            to = %new_state,
            generation = self.generation,
            elapsed_ms,
            "countdown transition"
        );

        self.state = new_state;
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTDOWN_TICKS)
    }
}
