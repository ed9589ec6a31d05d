//! File-backed settings.
//!
//! `Settings` is the raw, serde-deserialized form of `bizdesk.toml`. Every
//! field has a default so a missing or partial file is fine; the resolved,
//! validated view lives in [`crate::config`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub desk: DeskSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskSettings {
    /// Prefix for generated invite codes, e.g. `ACME`.
    pub organization_code: String,
    pub invoice_number_prefix: String,
    pub invoice_due_days: i64,
    pub invite_validity_days: i64,
    pub currency_symbol: String,
    /// `permissive` or `strict`.
    pub workflow: String,
    /// Simulated round-trip for the local backend.
    pub backend_latency_ms: u64,
}

impl Default for DeskSettings {
    fn default() -> Self {
        Self {
            organization_code: "ACME".to_string(),
            invoice_number_prefix: "INV".to_string(),
            invoice_due_days: 30,
            invite_validity_days: 30,
            currency_symbol: "$".to_string(),
            workflow: "permissive".to_string(),
            backend_latency_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

impl Settings {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load settings from a TOML file. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Self::from_toml_str(&raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "settings file not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }),
        }
    }
}
