// Core structs: Profile, MatchResult, Resolution and the error enums
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// One mapping value. `plugged`/`mouse` are flags and `device` is an index;
/// everything else stays as written.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(flag) => write!(f, "{}", flag),
            SettingValue::Int(index) => write!(f, "{}", index),
            SettingValue::Text(text) => f.write_str(text),
        }
    }
}

/// Key/value settings for one emulated controller slot.
pub type ControllerSettings = BTreeMap<String, SettingValue>;

/// Highest profile specificity (an `XInput:` section).
pub const MAX_SPECIFICITY: u8 = 2;

/// A known input profile. Patterns are already normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub name: String,
    pub patterns: Vec<String>,
    pub controllers: Vec<ControllerSettings>,
    /// 0 for a generic section, 1 for a native platform prefix, 2 for
    /// `XInput:`. Breaks ties between equal scores.
    pub specificity: u8,
}

/// Profile entry as written in a JSON catalog.
#[derive(Debug, Deserialize)]
pub struct ProfileEntry {
    pub name: String,
    pub patterns: Vec<String>,
    #[serde(default)]
    pub controllers: Vec<ControllerSettings>,
    #[serde(default)]
    pub specificity: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub name: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Match(MatchResult),
    NoMatch,
}

impl Resolution {
    /// Canonical name, or "" for no match.
    pub fn name(&self) -> &str {
        match self {
            Resolution::Match(m) => &m.name,
            Resolution::NoMatch => "",
        }
    }

    pub fn score(&self) -> f64 {
        match self {
            Resolution::Match(m) => m.score,
            Resolution::NoMatch => 0.0,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("profile name is empty")]
    EmptyName,
    #[error("profile '{0}' has no usable patterns")]
    NoPatterns(String),
    #[error("failed to decode JSON catalog: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected HTTP status {0}")]
    InvalidResponse(u16),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
