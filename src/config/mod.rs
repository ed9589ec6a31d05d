//! Configuration resolution.
//!
//! Raw [`Settings`] come from an optional TOML file; environment variables
//! (optionally seeded from `.env`) override them, and each `*Config::resolve`
//! validates the merged result.

pub(crate) mod helpers;
mod desk;

use std::path::Path;

use anyhow::Context;

pub use desk::{DeskConfig, LoggingConfig, sanitize_code_prefix};
pub use helpers::{EnvSource, process_env};

use crate::settings::Settings;

/// Everything a host needs to start the core.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub desk: DeskConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn resolve(settings: &Settings) -> Result<Self, crate::error::ConfigError> {
        Ok(Self {
            desk: DeskConfig::resolve(settings)?,
            logging: LoggingConfig::resolve(settings)?,
        })
    }

    /// Load `.env`, then the settings file (if any), then resolve.
    pub fn load(settings_path: Option<&Path>) -> anyhow::Result<Self> {
        if let Err(e) = dotenvy::dotenv()
            && !e.not_found()
        {
            tracing::warn!("Failed to load .env: {}", e);
        }

        let settings = match settings_path {
            Some(path) => Settings::load(path)
                .with_context(|| format!("loading settings from {}", path.display()))?,
            None => Settings::default(),
        };
        Self::resolve(&settings).context("resolving configuration")
    }
}
