//! Configuration file handling
//!
//! ```yaml
//! inference:
//!   endpoint: http://localhost:8080
//!   ner_model: dbmdz/bert-large-cased-finetuned-conll03-english
//!   summary_model: facebook/bart-large-cnn
//!   timeout_secs: 120
//! summary:
//!   max_length: 130
//!   min_length: 30
//!   min_tokens: 50
//! pdftotext: /usr/bin/pdftotext
//! ```
//!
//! Every key is optional. A missing default config file means all defaults.

use crate::backend::InferenceConfig;
use crate::summarize::{SummaryBounds, DEFAULT_MIN_TOKENS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Summarizer gate settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryConfig {
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    #[serde(default = "default_min_length")]
    pub min_length: usize,
    /// Inputs with fewer tokens are not summarized
    #[serde(default = "default_min_tokens")]
    pub min_tokens: usize,
}

fn default_max_length() -> usize {
    SummaryBounds::default().max_length
}

fn default_min_length() -> usize {
    SummaryBounds::default().min_length
}

fn default_min_tokens() -> usize {
    DEFAULT_MIN_TOKENS
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            max_length: default_max_length(),
            min_length: default_min_length(),
            min_tokens: default_min_tokens(),
        }
    }
}

impl SummaryConfig {
    pub fn bounds(&self) -> SummaryBounds {
        SummaryBounds {
            max_length: self.max_length,
            min_length: self.min_length,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub inference: InferenceConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
    /// Path to the `pdftotext` executable; looked up in PATH when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdftotext: Option<String>,
}

/// `<config dir>/rfpdeck/config.yaml`, e.g. `~/.config/rfpdeck/config.yaml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("rfpdeck").join("config.yaml"))
}

impl Config {
    pub fn from_yaml(yaml: &str, origin: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    /// Load from an explicit file. The file must exist.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        Self::from_yaml(&yaml, &display)
    }

    /// Load `path` if given, otherwise the default file if it exists,
    /// otherwise built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        match default_config_path() {
            Some(default) if default.is_file() => Self::from_file(&default),
            _ => Ok(Self::default()),
        }
    }
}
