//! Intent execution
//!
//! The interpreter owns every piece of mutable assistant state: the visual
//! mode flags, the self-destruct countdown and the flight HUD. Each call
//! returns the page actions to perform, in order.

use tracing::{debug, info, warn};

use crate::config::AssistantConfig;
use crate::events::{PageAction, ScrollTarget, TimerKind};
use crate::state::{Countdown, CountdownState, CountdownStep, ThemeMode, VisualModes};

use super::intent::{Classifier, Intent};
use super::registry::ProjectTarget;
use super::resume::{ResumeCatalog, ResumeVariant};

/// Form field that receives dictated text
const MESSAGE_FIELD: &str = "message";

/// Feet climbed per flight telemetry tick
const CLIMB_PER_TICK_FT: u32 = 250;

/// Telemetry stops climbing here
const CRUISE_ALTITUDE_FT: u32 = 35_000;

/// Voice command interpreter
#[derive(Debug)]
pub struct Interpreter {
    classifier: Classifier,
    resumes: ResumeCatalog,
    modes: VisualModes,
    countdown: Countdown,
    countdown_interval_ms: u64,
    flight_interval_ms: u64,
    flight_generation: u64,
    altitude_ft: u32,
}

impl Interpreter {
    pub fn new(config: &AssistantConfig) -> Self {
        Self {
            classifier: Classifier::new(config.projects.clone(), &config.passcode),
            resumes: ResumeCatalog::new(config.resumes.clone()),
            modes: VisualModes::default(),
            countdown: Countdown::new(config.countdown_ticks),
            countdown_interval_ms: config.countdown_interval_ms,
            flight_interval_ms: config.flight_interval_ms,
            flight_generation: 0,
            altitude_ft: 0,
        }
    }

    #[cfg(test)]
    pub fn modes(&self) -> VisualModes {
        self.modes
    }

    pub fn countdown_state(&self) -> CountdownState {
        self.countdown.state()
    }

    /// Drop all page state for a new page load and stop both timers.
    /// Generation counters carry on so stale ticks stay stale.
    pub fn reset(&mut self) -> Vec<PageAction> {
        let mut actions = vec![
            PageAction::StopTimer {
                timer: TimerKind::Countdown,
            },
            PageAction::StopTimer {
                timer: TimerKind::Flight,
            },
        ];
        if self.countdown.is_counting() {
            actions.push(PageAction::HideCountdown);
        }

        self.countdown.reset();
        self.modes = VisualModes::default();
        self.altitude_ft = 0;
        actions
    }

    /// Interpret one finalized transcript
    pub fn handle_transcript(&mut self, transcript: &str) -> Vec<PageAction> {
        let transcript = transcript.trim().to_lowercase();
        let (rule, intent) = self
            .classifier
            .classify(&transcript, self.countdown.is_counting());

        info!(rule, %transcript, "command interpreted");
        self.execute(intent)
    }

    /// Feed a timer tick back into the interpreter
    pub fn handle_tick(&mut self, timer: TimerKind, generation: u64) -> Vec<PageAction> {
        match timer {
            TimerKind::Countdown => self.countdown_tick(generation),
            TimerKind::Flight => self.flight_tick(generation),
        }
    }

    fn execute(&mut self, intent: Intent) -> Vec<PageAction> {
        match intent {
            Intent::OpenProject { name, url, target } => {
                let line = match target {
                    ProjectTarget::Repo => format!("Opening {} source repository.", name),
                    ProjectTarget::Live => format!("Launching {} live deployment.", name),
                };
                vec![
                    PageAction::speak(line),
                    PageAction::OpenUrl { url, new_tab: true },
                ]
            }
            Intent::AbortSelfDestruct => self.abort_self_destruct(),
            Intent::DownloadResume { variant } => self.download_resume(variant),
            Intent::StartSelfDestruct => self.start_self_destruct(),
            Intent::DictateMessage { body } => match body {
                Some(text) => vec![
                    PageAction::speak("Message recorded."),
                    PageAction::FillField {
                        field: MESSAGE_FIELD.to_string(),
                        text,
                    },
                    PageAction::ScrollTo {
                        target: ScrollTarget::Contact,
                    },
                ],
                None => vec![PageAction::speak("No message content detected.")],
            },
            Intent::SecurityAlert { raised } => {
                self.modes.set_security_alert(raised);
                let line = if raised {
                    "Security alert. Perimeter breach detected."
                } else {
                    "Standing down. All clear."
                };
                vec![PageAction::speak(line), self.modes_action()]
            }
            Intent::Flight { engaged } => self.set_flight(engaged),
            Intent::Theme(theme) => {
                self.modes.set_theme(theme);
                let line = match theme {
                    ThemeMode::Normal => "Systems restored to normal.",
                    ThemeMode::Combat => "Combat mode engaged.",
                    ThemeMode::Stealth => "Stealth mode engaged.",
                    ThemeMode::NightVision => "Night vision online.",
                };
                vec![PageAction::speak(line), self.modes_action()]
            }
            Intent::Navigate(target) => {
                let line = match target {
                    ScrollTarget::Top => "Returning to home.",
                    ScrollTarget::Projects => "Opening projects.",
                    ScrollTarget::Contact => "Opening contact channel.",
                    ScrollTarget::Education => "Accessing education records.",
                    ScrollTarget::Skills => "Displaying skill matrix.",
                    ScrollTarget::Experience => "Loading experience log.",
                    ScrollTarget::About => "Loading personnel file.",
                };
                vec![PageAction::speak(line), PageAction::ScrollTo { target }]
            }
            Intent::Introduce => vec![PageAction::speak(
                "I am VECTOR, the voice interface of this portfolio.",
            )],
            Intent::Greet => vec![PageAction::speak("Hello. How can I assist you?")],
            Intent::Help => vec![PageAction::speak(
                "Try home, projects, contact, download resume, combat mode, or open a project live.",
            )],
            Intent::Unrecognized => vec![PageAction::speak("Command not recognized.")],
        }
    }

    fn modes_action(&self) -> PageAction {
        PageAction::SetModes { modes: self.modes }
    }

    fn download_resume(&self, variant: Option<ResumeVariant>) -> Vec<PageAction> {
        match self.resumes.resolve(variant) {
            Some(entry) => {
                debug!(variant = %entry.variant, url = %entry.url, "resume selected");
                vec![
                    PageAction::speak("Secure file located. Initiating download."),
                    PageAction::OpenUrl {
                        url: entry.url.clone(),
                        new_tab: false,
                    },
                ]
            }
            None => {
                warn!(?variant, "no resume for requested variant");
                vec![PageAction::speak("Resume file not found.")]
            }
        }
    }

    fn start_self_destruct(&mut self) -> Vec<PageAction> {
        let generation = self.countdown.start();
        let ticks = self.countdown.ticks();
        vec![
            PageAction::speak(format!(
                "Self destruct sequence initiated. {} seconds to detonation.",
                ticks
            )),
            PageAction::ShowCountdown { remaining: ticks },
            PageAction::StartTimer {
                timer: TimerKind::Countdown,
                generation,
                interval_ms: self.countdown_interval_ms,
            },
        ]
    }

    fn abort_self_destruct(&mut self) -> Vec<PageAction> {
        // the passcode rule only matches while counting
        let aborted = self.countdown.abort();
        debug_assert!(aborted);
        vec![
            PageAction::StopTimer {
                timer: TimerKind::Countdown,
            },
            PageAction::HideCountdown,
            PageAction::speak("Override accepted. Self destruct aborted."),
        ]
    }

    fn countdown_tick(&mut self, generation: u64) -> Vec<PageAction> {
        match self.countdown.tick(generation) {
            CountdownStep::Ticked { remaining } => vec![
                PageAction::ShowCountdown { remaining },
                PageAction::speak(remaining.to_string()),
            ],
            CountdownStep::Expired => {
                info!("self destruct countdown expired, closing session");
                vec![
                    PageAction::StopTimer {
                        timer: TimerKind::Countdown,
                    },
                    PageAction::ShowCountdown { remaining: 0 },
                    PageAction::speak("Goodbye."),
                    PageAction::CloseSession,
                ]
            }
            CountdownStep::Ignored => Vec::new(),
        }
    }

    fn set_flight(&mut self, engaged: bool) -> Vec<PageAction> {
        if !self.modes.set_flight(engaged) {
            let line = if engaged {
                "Flight systems already online."
            } else {
                "Already on the ground."
            };
            return vec![PageAction::speak(line), self.modes_action()];
        }

        if engaged {
            self.flight_generation += 1;
            self.altitude_ft = 0;
            vec![
                PageAction::speak("Flight mode engaged. Taking off."),
                self.modes_action(),
                PageAction::StartTimer {
                    timer: TimerKind::Flight,
                    generation: self.flight_generation,
                    interval_ms: self.flight_interval_ms,
                },
            ]
        } else {
            self.altitude_ft = 0;
            vec![
                PageAction::speak("Landing sequence complete."),
                self.modes_action(),
                PageAction::StopTimer {
                    timer: TimerKind::Flight,
                },
            ]
        }
    }

    fn flight_tick(&mut self, generation: u64) -> Vec<PageAction> {
        if !self.modes.flight || generation != self.flight_generation {
            debug!(generation, "dropping stale flight tick");
            return Vec::new();
        }
        self.altitude_ft = (self.altitude_ft + CLIMB_PER_TICK_FT).min(CRUISE_ALTITUDE_FT);
        vec![PageAction::FlightTelemetry {
            altitude_ft: self.altitude_ft,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interpreter() -> Interpreter {
        Interpreter::new(&AssistantConfig::default())
    }

    fn spoken(actions: &[PageAction]) -> Vec<&str> {
        actions
            .iter()
            .filter_map(|a| match a {
                PageAction::Speak { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn opened(actions: &[PageAction]) -> Vec<(&str, bool)> {
        actions
            .iter()
            .filter_map(|a| match a {
                PageAction::OpenUrl { url, new_tab } => Some((url.as_str(), *new_tab)),
                _ => None,
            })
            .collect()
    }

    fn countdown_generation(actions: &[PageAction]) -> u64 {
        actions
            .iter()
            .find_map(|a| match a {
                PageAction::StartTimer {
                    timer: TimerKind::Countdown,
                    generation,
                    ..
                } => Some(*generation),
                _ => None,
            })
            .expect("countdown timer started")
    }

    #[test]
    fn test_every_intent_speaks_once() {
        let mut interp = interpreter();
        for transcript in [
            "go home",
            "show projects",
            "download resume",
            "combat mode",
            "open finance live site",
            "dictate message hi",
            "purple elephant",
            "who are you",
        ] {
            let actions = interp.handle_transcript(transcript);
            assert_eq!(spoken(&actions).len(), 1, "transcript: {transcript}");
        }
    }

    #[test]
    fn test_open_finance_live_site() {
        let mut interp = interpreter();
        let actions = interp.handle_transcript("open finance live site");

        assert_eq!(
            opened(&actions),
            vec![("https://vector-portfolio.github.io/finance-tracker/", true)]
        );
        assert!(!spoken(&actions).contains(&"Command not recognized."));
    }

    #[test]
    fn test_project_code_preempts_resume() {
        let mut interp = interpreter();
        let actions = interp.handle_transcript("download the finance resume code");
        assert_eq!(
            opened(&actions),
            vec![("https://github.com/vector-portfolio/finance-tracker", true)]
        );
    }

    #[test]
    fn test_resume_download_variants() {
        let cases = [
            ("download my resume", "resumes/resume-it.pdf"),
            ("download tech resume", "resumes/resume-it.pdf"),
            ("download finance resume", "resumes/resume-finance.pdf"),
            ("resume for support roles, download", "resumes/resume-bpo.pdf"),
            ("download education resume", "resumes/resume-edutech.pdf"),
        ];

        for (transcript, url) in cases {
            let mut interp = interpreter();
            let actions = interp.handle_transcript(transcript);
            assert_eq!(opened(&actions), vec![(url, false)], "transcript: {transcript}");
            assert_eq!(
                spoken(&actions),
                vec!["Secure file located. Initiating download."]
            );
        }
    }

    #[test]
    fn test_resume_missing_variant() {
        let mut config = AssistantConfig::default();
        config.resumes.retain(|r| r.variant == ResumeVariant::It);
        let mut interp = Interpreter::new(&config);

        let actions = interp.handle_transcript("download bpo resume");
        assert!(opened(&actions).is_empty());
        assert_eq!(spoken(&actions), vec!["Resume file not found."]);
    }

    #[test]
    fn test_unrecognized_changes_nothing() {
        let mut interp = interpreter();
        interp.handle_transcript("stealth mode");
        let before = interp.modes();

        let actions = interp.handle_transcript("Purple Elephant");
        assert_eq!(actions, vec![PageAction::speak("Command not recognized.")]);
        assert_eq!(interp.modes(), before);
        assert_eq!(interp.countdown_state(), CountdownState::Idle);
    }

    #[test]
    fn test_theme_toggle_is_idempotent() {
        let mut interp = interpreter();
        interp.handle_transcript("combat mode");
        let actions = interp.handle_transcript("combat mode");

        assert_eq!(interp.modes().theme, ThemeMode::Combat);
        assert!(actions.contains(&PageAction::SetModes {
            modes: interp.modes()
        }));
    }

    #[test]
    fn test_single_theme_with_overlays() {
        let mut interp = interpreter();
        interp.handle_transcript("stealth mode");
        interp.handle_transcript("red alert");
        interp.handle_transcript("take off");
        interp.handle_transcript("night vision");

        let modes = interp.modes();
        assert_eq!(modes.theme, ThemeMode::NightVision);
        assert!(modes.flight);
        assert!(modes.security_alert);
    }

    #[test]
    fn test_self_destruct_aborted_by_passcode() {
        let mut interp = interpreter();
        let start = interp.handle_transcript("self destruct");
        assert!(start.contains(&PageAction::ShowCountdown { remaining: 10 }));
        let generation = countdown_generation(&start);

        for _ in 0..3 {
            interp.handle_tick(TimerKind::Countdown, generation);
        }
        let actions = interp.handle_transcript("override alpha");

        assert_eq!(interp.countdown_state(), CountdownState::Aborted);
        assert!(actions.contains(&PageAction::StopTimer {
            timer: TimerKind::Countdown
        }));
        assert!(actions.contains(&PageAction::HideCountdown));

        // late ticks from the cancelled timer do nothing
        assert!(interp.handle_tick(TimerKind::Countdown, generation).is_empty());
    }

    #[test]
    fn test_self_destruct_expires_once() {
        let mut interp = interpreter();
        let generation = countdown_generation(&interp.handle_transcript("self destruct"));

        let mut closes = 0;
        for _ in 0..15 {
            closes += interp
                .handle_tick(TimerKind::Countdown, generation)
                .iter()
                .filter(|a| **a == PageAction::CloseSession)
                .count();
        }

        assert_eq!(closes, 1);
        assert_eq!(interp.countdown_state(), CountdownState::Expired);
    }

    #[test]
    fn test_restart_countdown_clears_previous() {
        let mut interp = interpreter();
        let first = countdown_generation(&interp.handle_transcript("self destruct"));
        interp.handle_tick(TimerKind::Countdown, first);

        let second = countdown_generation(&interp.handle_transcript("self destruct"));
        assert!(interp.handle_tick(TimerKind::Countdown, first).is_empty());
        assert_eq!(
            interp.handle_tick(TimerKind::Countdown, second)[0],
            PageAction::ShowCountdown { remaining: 9 }
        );
    }

    #[test]
    fn test_passcode_without_countdown() {
        let mut interp = interpreter();
        let actions = interp.handle_transcript("override alpha");
        assert_eq!(spoken(&actions), vec!["Command not recognized."]);
    }

    #[test]
    fn test_passcode_after_expiry() {
        let mut interp = Interpreter::new(&AssistantConfig {
            countdown_ticks: 1,
            ..AssistantConfig::default()
        });
        let generation = countdown_generation(&interp.handle_transcript("self destruct"));
        interp.handle_tick(TimerKind::Countdown, generation);
        assert_eq!(interp.countdown_state(), CountdownState::Expired);

        let actions = interp.handle_transcript("override alpha");
        assert_eq!(actions, vec![PageAction::speak("Command not recognized.")]);
        assert_eq!(interp.countdown_state(), CountdownState::Expired);
    }

    #[test]
    fn test_reset_stops_timers_and_keeps_generations() {
        let mut interp = interpreter();
        interp.handle_transcript("take off");
        interp.handle_transcript("combat mode");
        let before = countdown_generation(&interp.handle_transcript("self destruct"));

        let actions = interp.reset();
        assert_eq!(
            actions,
            vec![
                PageAction::StopTimer {
                    timer: TimerKind::Countdown
                },
                PageAction::StopTimer {
                    timer: TimerKind::Flight
                },
                PageAction::HideCountdown,
            ]
        );
        assert_eq!(interp.modes(), VisualModes::default());
        assert_eq!(interp.countdown_state(), CountdownState::Idle);

        let after = countdown_generation(&interp.handle_transcript("self destruct"));
        assert_ne!(before, after);
        assert!(interp.handle_tick(TimerKind::Countdown, before).is_empty());
    }

    #[test]
    fn test_reset_while_idle_skips_hide() {
        let mut interp = interpreter();
        let actions = interp.reset();
        assert!(!actions.contains(&PageAction::HideCountdown));
        assert_eq!(actions.len(), 2);
    }

    #[test]
    fn test_dictation_fills_message_field() {
        let mut interp = interpreter();
        let actions = interp.handle_transcript("dictate message loved your work");
        assert!(actions.contains(&PageAction::FillField {
            field: "message".to_string(),
            text: "Loved your work".to_string(),
        }));

        let empty = interp.handle_transcript("dictate message");
        assert_eq!(empty, vec![PageAction::speak("No message content detected.")]);
    }

    #[test]
    fn test_flight_telemetry() {
        let mut interp = interpreter();
        let actions = interp.handle_transcript("engage flight mode");
        let generation = actions
            .iter()
            .find_map(|a| match a {
                PageAction::StartTimer {
                    timer: TimerKind::Flight,
                    generation,
                    ..
                } => Some(*generation),
                _ => None,
            })
            .unwrap();

        interp.handle_tick(TimerKind::Flight, generation);
        assert_eq!(
            interp.handle_tick(TimerKind::Flight, generation),
            vec![PageAction::FlightTelemetry { altitude_ft: 500 }]
        );

        let landing = interp.handle_transcript("land");
        assert!(landing.contains(&PageAction::StopTimer {
            timer: TimerKind::Flight
        }));
        assert!(!interp.modes().flight);
        assert!(interp.handle_tick(TimerKind::Flight, generation).is_empty());
    }
}
