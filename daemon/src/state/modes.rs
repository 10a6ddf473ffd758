//! Visual mode flags toggled on the page root

use serde::{Deserialize, Serialize};

/// Mutually exclusive page themes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeMode {
    /// No theme override
    #[default]
    Normal,
    Combat,
    Stealth,
    NightVision,
}

impl std::fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThemeMode::Normal => write!(f, "normal"),
            ThemeMode::Combat => write!(f, "combat"),
            ThemeMode::Stealth => write!(f, "stealth"),
            ThemeMode::NightVision => write!(f, "night_vision"),
        }
    }
}

/// Snapshot of every mode flag on the page
///
/// `theme` holds at most one active theme. `flight` and `security_alert`
/// are overlays and combine freely with any theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualModes {
    pub theme: ThemeMode,
    pub flight: bool,
    pub security_alert: bool,
}

impl VisualModes {
    /// Set the theme. Returns true if anything changed.
    pub fn set_theme(&mut self, theme: ThemeMode) -> bool {
        let changed = self.theme != theme;
        self.theme = theme;
        changed
    }

    /// Engage or release flight mode. Returns true if anything changed.
    pub fn set_flight(&mut self, engaged: bool) -> bool {
        let changed = self.flight != engaged;
        self.flight = engaged;
        changed
    }

    /// Raise or clear the security alert. Returns true if anything changed.
    pub fn set_security_alert(&mut self, raised: bool) -> bool {
        let changed = self.security_alert != raised;
        self.security_alert = raised;
        changed
    }
}

impl std::fmt::Display for VisualModes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.theme)?;
        if self.flight {
            write!(f, "+flight")?;
        }
        if self.security_alert {
            write!(f, "+alert")?;
        }
        Ok(())
    }
}
