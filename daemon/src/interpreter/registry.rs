//! Project registry lookup
//!
//! A project matches when one of its trigger keywords appears in the
//! transcript together with a qualifier saying which URL to open.

use serde::{Deserialize, Serialize};

/// Qualifiers that select the source repository. Checked before live ones.
const REPO_QUALIFIERS: &[&str] = &["code", "repo", "source", "github"];

/// Qualifiers that select the live deployment
const LIVE_QUALIFIERS: &[&str] = &["live", "open", "demo", "launch", "site"];

/// A portfolio project the assistant can open
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub live_url: String,
    pub repo_url: String,
    /// Keywords that identify the project in a transcript
    pub triggers: Vec<String>,
}

impl Project {
    pub fn new(name: &str, live_url: &str, repo_url: &str, triggers: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            live_url: live_url.to_string(),
            repo_url: repo_url.to_string(),
            triggers: triggers.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Which of a project's URLs to open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectTarget {
    Repo,
    Live,
}

impl ProjectTarget {
    /// Pick the target from qualifier keywords, repo first
    fn from_transcript(transcript: &str) -> Option<Self> {
        if REPO_QUALIFIERS.iter().any(|q| transcript.contains(q)) {
            Some(ProjectTarget::Repo)
        } else if LIVE_QUALIFIERS.iter().any(|q| transcript.contains(q)) {
            Some(ProjectTarget::Live)
        } else {
            None
        }
    }
}

/// A successful registry lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectMatch<'a> {
    pub project: &'a Project,
    pub target: ProjectTarget,
}

impl ProjectMatch<'_> {
    pub fn url(&self) -> &str {
        match self.target {
            ProjectTarget::Repo => &self.project.repo_url,
            ProjectTarget::Live => &self.project.live_url,
        }
    }
}

/// Read-only table of projects, searched in declaration order
#[derive(Debug, Clone, Default)]
pub struct ProjectRegistry {
    projects: Vec<Project>,
}

impl ProjectRegistry {
    pub fn new(projects: Vec<Project>) -> Self {
        let projects = projects
            .into_iter()
            .map(|mut p| {
                p.triggers = p.triggers.iter().map(|t| t.to_lowercase()).collect();
                p
            })
            .collect();
        Self { projects }
    }

    /// First project whose trigger and a qualifier both appear
    pub fn lookup(&self, transcript: &str) -> Option<ProjectMatch<'_>> {
        let target = ProjectTarget::from_transcript(transcript)?;
        self.projects
            .iter()
            .find(|p| p.triggers.iter().any(|t| transcript.contains(t.as_str())))
            .map(|project| ProjectMatch { project, target })
    }
}
