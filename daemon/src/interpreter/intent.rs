//! Intent classification
//!
//! Project lookup runs first. Everything else is an ordered list of
//! (trigger, intent) rules evaluated top to bottom; the first rule whose
//! trigger matches wins, so ambiguity is settled by declaration order.

use tracing::debug;

use crate::events::ScrollTarget;
use crate::state::ThemeMode;

use super::dictation::extract_message;
use super::registry::{Project, ProjectRegistry, ProjectTarget};
use super::resume::ResumeVariant;

/// What a transcript asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Open a registry project's repo or live deployment
    OpenProject {
        name: String,
        url: String,
        target: ProjectTarget,
    },
    /// Passcode spoken while the countdown runs
    AbortSelfDestruct,
    /// `None` means the catalog default
    DownloadResume { variant: Option<ResumeVariant> },
    StartSelfDestruct,
    /// `None` when nothing remained after stripping command words
    DictateMessage { body: Option<String> },
    SecurityAlert { raised: bool },
    Flight { engaged: bool },
    Theme(ThemeMode),
    Navigate(ScrollTarget),
    Introduce,
    Greet,
    Help,
    Unrecognized,
}

/// Condition a rule checks against the transcript
#[derive(Debug, Clone, Copy)]
pub enum Trigger {
    /// Any keyword is a substring
    Any(&'static [&'static str]),
    /// Every keyword is a substring, anywhere
    All(&'static [&'static str]),
    /// The configured passcode, only while the countdown is running
    Passcode,
}

/// Inputs a trigger may look at besides the transcript
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    pub passcode: &'a str,
    pub countdown_active: bool,
}

impl Trigger {
    fn matches(&self, transcript: &str, ctx: &MatchContext<'_>) -> bool {
        match self {
            Trigger::Any(words) => words.iter().any(|w| transcript.contains(w)),
            Trigger::All(words) => words.iter().all(|w| transcript.contains(w)),
            Trigger::Passcode => ctx.countdown_active && transcript.contains(ctx.passcode),
        }
    }
}

/// One entry of the cascade
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub trigger: Trigger,
    pub intent: fn(&str) -> Intent,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("trigger", &self.trigger)
            .finish()
    }
}

fn rule(name: &'static str, trigger: Trigger, intent: fn(&str) -> Intent) -> Rule {
    Rule {
        name,
        trigger,
        intent,
    }
}

/// The general cascade, in precedence order
pub fn default_rules() -> Vec<Rule> {
    use Trigger::{All, Any, Passcode};

    vec![
        rule("abort_self_destruct", Passcode, |_| Intent::AbortSelfDestruct),
        rule("download_resume", All(&["download", "resume"]), |t| {
            Intent::DownloadResume {
                variant: ResumeVariant::from_transcript(t),
            }
        }),
        rule(
            "self_destruct",
            Any(&["self destruct", "self-destruct", "selfdestruct"]),
            |_| Intent::StartSelfDestruct,
        ),
        rule("dictate_message", Any(&["dictate", "message"]), |t| {
            Intent::DictateMessage {
                body: extract_message(t),
            }
        }),
        rule(
            "security_alert",
            Any(&["security alert", "red alert", "intruder"]),
            |_| Intent::SecurityAlert { raised: true },
        ),
        rule("stand_down", Any(&["stand down", "all clear"]), |_| {
            Intent::SecurityAlert { raised: false }
        }),
        rule("flight_on", Any(&["flight", "fly", "take off"]), |_| {
            Intent::Flight { engaged: true }
        }),
        rule("flight_off", Any(&["land"]), |_| Intent::Flight {
            engaged: false
        }),
        rule("combat_mode", Any(&["combat"]), |_| {
            Intent::Theme(ThemeMode::Combat)
        }),
        rule("stealth_mode", Any(&["stealth"]), |_| {
            Intent::Theme(ThemeMode::Stealth)
        }),
        rule("night_vision", Any(&["night vision"]), |_| {
            Intent::Theme(ThemeMode::NightVision)
        }),
        rule("normal_mode", Any(&["normal mode", "reset"]), |_| {
            Intent::Theme(ThemeMode::Normal)
        }),
        rule("home", Any(&["home"]), |_| Intent::Navigate(ScrollTarget::Top)),
        rule("projects", Any(&["project"]), |_| {
            Intent::Navigate(ScrollTarget::Projects)
        }),
        rule("contact", Any(&["contact"]), |_| {
            Intent::Navigate(ScrollTarget::Contact)
        }),
        rule("education", Any(&["education"]), |_| {
            Intent::Navigate(ScrollTarget::Education)
        }),
        rule("skills", Any(&["skill"]), |_| {
            Intent::Navigate(ScrollTarget::Skills)
        }),
        rule("experience", Any(&["experience"]), |_| {
            Intent::Navigate(ScrollTarget::Experience)
        }),
        rule("about", Any(&["about"]), |_| {
            Intent::Navigate(ScrollTarget::About)
        }),
        rule("introduce", Any(&["who are you", "introduce"]), |_| {
            Intent::Introduce
        }),
        rule("greet", Any(&["hello"]), |_| Intent::Greet),
        rule("help", Any(&["help"]), |_| Intent::Help),
    ]
}

/// Maps transcripts to intents
#[derive(Debug, Clone)]
pub struct Classifier {
    registry: ProjectRegistry,
    rules: Vec<Rule>,
    passcode: String,
}

impl Classifier {
    pub fn new(projects: Vec<Project>, passcode: &str) -> Self {
        Self {
            registry: ProjectRegistry::new(projects),
            rules: default_rules(),
            passcode: passcode.to_lowercase(),
        }
    }

    /// Select exactly one intent. Returns the name of the deciding rule
    /// alongside it.
    pub fn classify(&self, transcript: &str, countdown_active: bool) -> (&'static str, Intent) {
        if let Some(found) = self.registry.lookup(transcript) {
            return (
                "project",
                Intent::OpenProject {
                    name: found.project.name.clone(),
                    url: found.url().to_string(),
                    target: found.target,
                },
            );
        }

        let ctx = MatchContext {
            passcode: &self.passcode,
            countdown_active,
        };

        for rule in &self.rules {
            if rule.trigger.matches(transcript, &ctx) {
                debug!(rule = rule.name, "rule matched");
                return (rule.name, (rule.intent)(transcript));
            }
        }

        ("unrecognized", Intent::Unrecognized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> Classifier {
        Classifier::new(
            vec![Project::new(
                "finance tracker",
                "https://finance.example/",
                "https://github.com/example/finance",
                &["finance"],
            )],
            "override alpha",
        )
    }

    fn intent_of(transcript: &str) -> Intent {
        classifier().classify(transcript, false).1
    }

    #[test]
    fn test_project_code_preempts_cascade() {
        let (rule, intent) = classifier().classify("download finance resume source code", false);
        assert_eq!(rule, "project");
        assert_eq!(
            intent,
            Intent::OpenProject {
                name: "finance tracker".to_string(),
                url: "https://github.com/example/finance".to_string(),
                target: ProjectTarget::Repo,
            }
        );
    }

    #[test]
    fn test_project_without_qualifier_falls_through() {
        // "finance" alone is not enough for the registry; "home" then wins
        assert_eq!(
            intent_of("finance home"),
            Intent::Navigate(ScrollTarget::Top)
        );
    }

    #[test]
    fn test_resume_needs_both_words() {
        assert_eq!(
            intent_of("resume please, i want to download it"),
            Intent::DownloadResume {
                variant: Some(ResumeVariant::It)
            }
        );
        assert_eq!(intent_of("download everything"), Intent::Unrecognized);
        assert_eq!(intent_of("show resume"), Intent::Unrecognized);
    }

    #[test]
    fn test_resume_beats_navigation() {
        assert_eq!(
            intent_of("download resume and go home"),
            Intent::DownloadResume { variant: None }
        );
    }

    #[test]
    fn test_declaration_order_not_specificity() {
        // "home" is declared before "project"
        assert_eq!(
            intent_of("go to project home"),
            Intent::Navigate(ScrollTarget::Top)
        );
        // themes are declared before navigation
        assert_eq!(
            intent_of("combat mode and contact"),
            Intent::Theme(ThemeMode::Combat)
        );
    }

    #[test]
    fn test_passcode_only_while_counting() {
        let classifier = classifier();
        assert_eq!(
            classifier.classify("override alpha", true).1,
            Intent::AbortSelfDestruct
        );
        assert_eq!(
            classifier.classify("override alpha", false).1,
            Intent::Unrecognized
        );
    }

    #[test]
    fn test_self_destruct_spellings() {
        for transcript in ["self destruct", "initiate self-destruct", "selfdestruct now"] {
            assert_eq!(intent_of(transcript), Intent::StartSelfDestruct);
        }
    }

    #[test]
    fn test_dictation() {
        assert_eq!(
            intent_of("dictate message great portfolio"),
            Intent::DictateMessage {
                body: Some("Great portfolio".to_string())
            }
        );
    }

    #[test]
    fn test_overlays_and_themes() {
        assert_eq!(
            intent_of("red alert"),
            Intent::SecurityAlert { raised: true }
        );
        assert_eq!(
            intent_of("all clear"),
            Intent::SecurityAlert { raised: false }
        );
        assert_eq!(intent_of("engage flight mode"), Intent::Flight { engaged: true });
        assert_eq!(intent_of("land now"), Intent::Flight { engaged: false });
        assert_eq!(
            intent_of("activate night vision"),
            Intent::Theme(ThemeMode::NightVision)
        );
        assert_eq!(intent_of("reset"), Intent::Theme(ThemeMode::Normal));
    }

    #[test]
    fn test_education_navigation() {
        assert_eq!(
            intent_of("access education"),
            Intent::Navigate(ScrollTarget::Education)
        );
    }

    #[test]
    fn test_unrecognized() {
        assert_eq!(intent_of("purple elephant"), Intent::Unrecognized);
    }
}
