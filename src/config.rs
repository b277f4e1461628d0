use crate::model::ConfigError;
use serde::Deserialize;
use std::fs;

/// Platform the INI section prefixes are checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    Osx,
    Windows,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "linux") {
            Platform::Linux
        } else if cfg!(target_os = "macos") {
            Platform::Osx
        } else if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Other
        }
    }

    /// Whether a `Prefix:` section of the auto-config file applies here.
    pub fn accepts_prefix(self, prefix: &str) -> bool {
        match prefix {
            "Unix:" => matches!(self, Platform::Linux | Platform::Osx),
            "Linux:" => self == Platform::Linux,
            "OSX:" => self == Platform::Osx,
            "Win32:" | "XInput:" => self == Platform::Windows,
            _ => false,
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogFormat {
    Ini,
    Json,
}

impl CatalogFormat {
    /// `.json` means JSON, anything else is treated as the INI format.
    pub fn infer(location: &str) -> Self {
        let path = location.split(['?', '#']).next().unwrap_or(location);
        if path.to_ascii_lowercase().ends_with(".json") {
            CatalogFormat::Json
        } else {
            CatalogFormat::Ini
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub catalog_path: Option<String>,
    pub catalog_url: Option<String>,
    pub catalog_format: Option<CatalogFormat>,
    #[serde(default)]
    pub platform: Platform,
    #[serde(default)]
    pub threshold: f64,
    #[serde(default = "default_reload_interval")]
    pub reload_interval_seconds: u64,
    #[serde(default = "default_response_capacity")]
    pub response_capacity: usize,
}

fn default_reload_interval() -> u64 {
    300
}

fn default_response_capacity() -> usize {
    256
}

impl AppConfig {
    /// Path or URL of the catalog, whichever is configured.
    pub fn catalog_location(&self) -> &str {
        self.catalog_path
            .as_deref()
            .or(self.catalog_url.as_deref())
            .unwrap_or_default()
    }

    pub fn format(&self) -> CatalogFormat {
        self.catalog_format
            .unwrap_or_else(|| CatalogFormat::infer(self.catalog_location()))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match (&self.catalog_path, &self.catalog_url) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::Invalid(
                    "set either catalog_path or catalog_url, not both".into(),
                ));
            }
            (None, None) => {
                return Err(ConfigError::Invalid(
                    "one of catalog_path or catalog_url is required".into(),
                ));
            }
            _ => {}
        }
        if self.catalog_location().trim().is_empty() {
            return Err(ConfigError::Invalid("catalog location is empty".into()));
        }
        if !self.threshold.is_finite() || !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::Invalid(format!(
                "threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }
        // one byte goes to the terminator
        if self.response_capacity < 2 {
            return Err(ConfigError::Invalid(format!(
                "response_capacity must be at least 2, got {}",
                self.response_capacity
            )));
        }
        Ok(())
    }
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = serde_json::from_str(content)?;
    config.validate()?;
    Ok(config)
}
