//! Configuration loading and management

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::interpreter::{Project, ResumeEntry, ResumeVariant};
use crate::state::DEFAULT_COUNTDOWN_TICKS;

/// Environment variable naming an assistant config file
pub const CONFIG_ENV: &str = "VECTOR_CONFIG";

/// Errors raised while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("HOME is not set")]
    NoHome,

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("config must declare at least one resume")]
    NoResumes,

    #[error("passcode must not be empty")]
    EmptyPasscode,
}

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the Unix domain socket for IPC
    pub socket_path: PathBuf,

    /// Directory for runtime data
    pub data_dir: PathBuf,

    /// Interpreter tables and timer settings
    pub assistant: AssistantConfig,
}

/// Everything the interpreter reads at startup
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Phrase that cancels a running self-destruct countdown
    pub passcode: String,

    /// Ticks in the self-destruct countdown
    pub countdown_ticks: u32,

    /// Milliseconds between countdown ticks
    pub countdown_interval_ms: u64,

    /// Milliseconds between flight telemetry ticks
    pub flight_interval_ms: u64,

    /// Project registry, in lookup order
    pub projects: Vec<Project>,

    /// Resume catalog; the first entry is the default download
    pub resumes: Vec<ResumeEntry>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            passcode: "override alpha".to_string(),
            countdown_ticks: DEFAULT_COUNTDOWN_TICKS,
            countdown_interval_ms: 1000,
            flight_interval_ms: 500,
            projects: default_projects(),
            resumes: default_resumes(),
        }
    }
}

fn default_projects() -> Vec<Project> {
    vec![
        Project::new(
            "finance tracker",
            "https://vector-portfolio.github.io/finance-tracker/",
            "https://github.com/vector-portfolio/finance-tracker",
            &["finance", "expense", "budget"],
        ),
        Project::new(
            "weather station",
            "https://vector-portfolio.github.io/weather-station/",
            "https://github.com/vector-portfolio/weather-station",
            &["weather", "forecast"],
        ),
        Project::new(
            "task board",
            "https://vector-portfolio.github.io/task-board/",
            "https://github.com/vector-portfolio/task-board",
            &["task board", "kanban", "todo"],
        ),
    ]
}

fn default_resumes() -> Vec<ResumeEntry> {
    vec![
        ResumeEntry::new(ResumeVariant::It, "resumes/resume-it.pdf"),
        ResumeEntry::new(ResumeVariant::Finance, "resumes/resume-finance.pdf"),
        ResumeEntry::new(ResumeVariant::Bpo, "resumes/resume-bpo.pdf"),
        ResumeEntry::new(ResumeVariant::Edutech, "resumes/resume-edutech.pdf"),
    ]
}

impl Config {
    /// Load configuration from environment and defaults.
    ///
    /// The assistant file is taken from `explicit`, then `$VECTOR_CONFIG`,
    /// then `<data_dir>/assistant.json` if it exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let home = std::env::var("HOME").map_err(|_| ConfigError::NoHome)?;
        let explicit = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        Self::under_home(Path::new(&home), explicit)
    }

    /// Derive paths below `home`, reading `explicit` or the data dir's
    /// `assistant.json` when one exists
    fn under_home(home: &Path, explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        let data_dir = home.join(".local").join("share").join("vector");

        let socket_path = data_dir.join("daemon.sock");

        let file = explicit.or_else(|| {
            let candidate = data_dir.join("assistant.json");
            candidate.exists().then_some(candidate)
        });

        let assistant = match file {
            Some(path) => AssistantConfig::from_file(&path)?,
            None => {
                debug!("no assistant config file, using built-in tables");
                AssistantConfig::default()
            }
        };

        Ok(Self {
            socket_path,
            data_dir,
            assistant,
        })
    }

    /// Ensure data directory exists
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)
    }
}

impl AssistantConfig {
    /// Read a JSON assistant config; absent fields keep their defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let config = Self::from_json(&raw).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_owned(),
                source,
            },
            other => other,
        })?;

        info!(
            ?path,
            projects = config.projects.len(),
            resumes = config.resumes.len(),
            "assistant config loaded"
        );
        Ok(config)
    }

    /// Parse a JSON assistant config
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;

        if config.resumes.is_empty() {
            return Err(ConfigError::NoResumes);
        }
        if config.passcode.trim().is_empty() {
            return Err(ConfigError::EmptyPasscode);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_paths_under_home() {
        let home = tempfile::tempdir().unwrap();
        let config = Config::under_home(home.path(), None).unwrap();

        let data_dir = home.path().join(".local/share/vector");
        assert_eq!(config.data_dir, data_dir);
        assert_eq!(config.socket_path, data_dir.join("daemon.sock"));
        assert_eq!(config.assistant.passcode, "override alpha");
    }

    #[test]
    fn test_data_dir_file_is_picked_up() {
        let home = tempfile::tempdir().unwrap();
        let data_dir = home.path().join(".local/share/vector");
        std::fs::create_dir_all(&data_dir).unwrap();
        std::fs::write(data_dir.join("assistant.json"), r#"{"countdown_ticks": 5}"#).unwrap();

        let config = Config::under_home(home.path(), None).unwrap();
        assert_eq!(config.assistant.countdown_ticks, 5);
    }

    #[test]
    fn test_explicit_file_wins_over_data_dir() {
        let home = tempfile::tempdir().unwrap();
        let data_dir = home.path().join(".local/share/vector");
        std::fs::create_dir_all(&data_dir).unwrap();
        std::fs::write(data_dir.join("assistant.json"), "{ broken").unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"passcode": "omega protocol"}}"#).unwrap();

        let config = Config::under_home(home.path(), Some(file.path().to_owned())).unwrap();
        assert_eq!(config.assistant.passcode, "omega protocol");
    }

    #[test]
    fn test_defaults() {
        let config = AssistantConfig::default();
        assert_eq!(config.passcode, "override alpha");
        assert_eq!(config.countdown_ticks, 10);
        assert_eq!(config.countdown_interval_ms, 1000);
        assert_eq!(config.resumes[0].variant, ResumeVariant::It);
        assert!(config.projects.iter().any(|p| p.name == "finance tracker"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AssistantConfig::from_json(r#"{"passcode":"omega protocol"}"#).unwrap();
        assert_eq!(config.passcode, "omega protocol");
        assert_eq!(config.countdown_ticks, 10);
        assert_eq!(config.resumes.len(), 4);
    }

    #[test]
    fn test_empty_resumes_rejected() {
        let err = AssistantConfig::from_json(r#"{"resumes":[]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::NoResumes));
    }

    #[test]
    fn test_empty_passcode_rejected() {
        let err = AssistantConfig::from_json(r#"{"passcode":"  "}"#).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyPasscode));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "projects": [{{
                    "name": "chess engine",
                    "live_url": "https://chess.example/",
                    "repo_url": "https://github.com/example/chess",
                    "triggers": ["chess"]
                }}],
                "resumes": [{{"variant": "bpo", "url": "cv-bpo.pdf"}}]
            }}"#
        )
        .unwrap();

        let config = AssistantConfig::from_file(file.path()).unwrap();
        assert_eq!(config.projects.len(), 1);
        assert_eq!(config.projects[0].triggers, vec!["chess".to_string()]);
        assert_eq!(config.resumes[0].variant, ResumeVariant::Bpo);
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = AssistantConfig::from_file(file.path()).unwrap_err();
        match err {
            ConfigError::Parse { path, .. } => assert_eq!(path, file.path()),
            other => panic!("unexpected error: {other}"),
        }
    }
}
