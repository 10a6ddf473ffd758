//! Resume variants and the download catalog

use serde::{Deserialize, Serialize};

/// Resume flavours offered for download
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeVariant {
    It,
    Finance,
    Bpo,
    Edutech,
}

/// Variant keywords in match order. Plain substring containment, so "it"
/// also fires on words like "with" and "tech" on "edutech".
const VARIANT_KEYWORDS: &[(ResumeVariant, &[&str])] = &[
    (ResumeVariant::It, &["it", "tech"]),
    (ResumeVariant::Finance, &["finance", "account"]),
    (ResumeVariant::Bpo, &["bpo", "support"]),
    (ResumeVariant::Edutech, &["edutech", "education"]),
];

impl ResumeVariant {
    /// First variant whose keyword appears, or `None` for the default
    pub fn from_transcript(transcript: &str) -> Option<Self> {
        VARIANT_KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| transcript.contains(w)))
            .map(|(variant, _)| *variant)
    }
}

impl std::fmt::Display for ResumeVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResumeVariant::It => write!(f, "it"),
            ResumeVariant::Finance => write!(f, "finance"),
            ResumeVariant::Bpo => write!(f, "bpo"),
            ResumeVariant::Edutech => write!(f, "edutech"),
        }
    }
}

/// A downloadable resume file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeEntry {
    pub variant: ResumeVariant,
    pub url: String,
}

impl ResumeEntry {
    pub fn new(variant: ResumeVariant, url: &str) -> Self {
        Self {
            variant,
            url: url.to_string(),
        }
    }
}

/// Ordered resume catalog
#[derive(Debug, Clone, Default)]
pub struct ResumeCatalog {
    entries: Vec<ResumeEntry>,
}

impl ResumeCatalog {
    pub fn new(entries: Vec<ResumeEntry>) -> Self {
        Self { entries }
    }

    /// Entry for the requested variant; no variant means the first entry
    pub fn resolve(&self, variant: Option<ResumeVariant>) -> Option<&ResumeEntry> {
        match variant {
            Some(v) => self.entries.iter().find(|e| e.variant == v),
            None => self.entries.first(),
        }
    }
}
