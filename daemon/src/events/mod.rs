//! Page actions emitted by the assistant
//!
//! Every side effect the interpreter wants performed on the portfolio page
//! (speech, scrolling, navigation, mode flags, timers) is expressed as a
//! [`PageAction`] and handed to whatever surface is attached: the IPC
//! subscribers or the stdin repl.

use serde::{Deserialize, Serialize};

use crate::state::VisualModes;

/// Scroll destinations on the portfolio page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollTarget {
    /// Top of the page
    Top,
    Projects,
    Contact,
    Education,
    Skills,
    Experience,
    About,
}

impl ScrollTarget {
    /// Element id of the section on the page, `None` for the page top
    pub fn element_id(&self) -> Option<&'static str> {
        match self {
            ScrollTarget::Top => None,
            ScrollTarget::Projects => Some("projects"),
            ScrollTarget::Contact => Some("contact"),
            ScrollTarget::Education => Some("education"),
            ScrollTarget::Skills => Some("skills"),
            ScrollTarget::Experience => Some("experience"),
            ScrollTarget::About => Some("about"),
        }
    }
}

/// Process-wide timers the page runs on behalf of the assistant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    /// Self-destruct countdown, one tick per second
    Countdown,
    /// Flight HUD telemetry while flight mode is engaged
    Flight,
}

impl std::fmt::Display for TimerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimerKind::Countdown => write!(f, "countdown"),
            TimerKind::Flight => write!(f, "flight"),
        }
    }
}

/// A single call into a page collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageAction {
    /// Replace any queued speech with this utterance
    Speak { text: String },

    /// Smooth-scroll the viewport
    ScrollTo { target: ScrollTarget },

    /// Navigate to a URL, in a new browsing context or the current one
    OpenUrl { url: String, new_tab: bool },

    /// New snapshot of the page's visual mode flags
    SetModes { modes: VisualModes },

    /// Write text into a form field
    FillField { field: String, text: String },

    /// Show the self-destruct overlay with the remaining seconds
    ShowCountdown { remaining: u32 },

    /// Remove the self-destruct overlay
    HideCountdown,

    /// Terminal action: close the browsing session
    CloseSession,

    /// Start (or restart) a timer; ticks carry the generation back
    StartTimer {
        timer: TimerKind,
        generation: u64,
        interval_ms: u64,
    },

    /// Cancel a running timer
    StopTimer { timer: TimerKind },

    /// Flight HUD readout
    FlightTelemetry { altitude_ft: u32 },

    /// Speech recognition is unavailable; hide the assistant trigger
    HideTrigger,

    /// Recognition session opened or closed
    Listening { active: bool },
}

impl PageAction {
    /// Shorthand for a speak action
    pub fn speak(text: impl Into<String>) -> Self {
        PageAction::Speak { text: text.into() }
    }
}

impl std::fmt::Display for PageAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageAction::Speak { text } => write!(f, "SPEAK \"{}\"", text),
            PageAction::ScrollTo { target } => {
                write!(f, "SCROLL_TO #{}", target.element_id().unwrap_or("top"))
            }
            PageAction::OpenUrl { url, new_tab } => {
                write!(f, "OPEN_URL {} (new_tab={})", url, new_tab)
            }
            PageAction::SetModes { modes } => write!(f, "SET_MODES {}", modes),
            PageAction::FillField { field, .. } => write!(f, "FILL_FIELD {}", field),
            PageAction::ShowCountdown { remaining } => {
                write!(f, "SHOW_COUNTDOWN ({}s)", remaining)
            }
            PageAction::HideCountdown => write!(f, "HIDE_COUNTDOWN"),
            PageAction::CloseSession => write!(f, "CLOSE_SESSION"),
            PageAction::StartTimer {
                timer, generation, ..
            } => write!(f, "START_TIMER {} (gen {})", timer, generation),
            PageAction::StopTimer { timer } => write!(f, "STOP_TIMER {}", timer),
            PageAction::FlightTelemetry { altitude_ft } => {
                write!(f, "FLIGHT_TELEMETRY ({}ft)", altitude_ft)
            }
            PageAction::HideTrigger => write!(f, "HIDE_TRIGGER"),
            PageAction::Listening { active } => write!(f, "LISTENING ({})", active),
        }
    }
}
