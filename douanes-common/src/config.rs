//! Bootstrap configuration
//!
//! Sources, highest priority first:
//! 1. Command-line arguments (`--database`, `--bind`)
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Built-in defaults
//!
//! A missing TOML file is not an error: a warning is logged and defaults
//! apply. A file that exists but does not parse is.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::game_day::BlackoutWindow;
use crate::report::{RenderStyle, SubmissionOptions};
use crate::report::render::DEFAULT_TITLE_COLOR;
use crate::{Error, Result};

pub const ENV_BLACKOUT_FROM: &str = "BLOCK_DEPOSITS_FROM";
pub const ENV_BLACKOUT_TO: &str = "BLOCK_DEPOSITS_TO";
pub const ENV_TITLE_COLOR: &str = "REPORT_TITLE_COLOR";

/// Configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Path to SQLite database file (relative or absolute)
    pub database_path: PathBuf,

    /// Listen address, `host:port`
    pub bind_addr: String,

    /// Daily window during which submissions are refused
    pub blackout: BlackoutConfig,

    /// Colour of the section banners in rendered reports
    pub report_title_color: String,

    /// Villages inserted at startup when missing
    pub villages: Vec<String>,

    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("douanes.db"),
            bind_addr: "0.0.0.0:5000".to_string(),
            blackout: BlackoutConfig::default(),
            report_title_color: DEFAULT_TITLE_COLOR.to_string(),
            villages: Vec::new(),
            logging: LoggingConfig::default(),
        }
    }
}

/// `HH:MM` bounds of the blackout window
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BlackoutConfig {
    pub from: String,
    pub to: String,
}

impl Default for BlackoutConfig {
    fn default() -> Self {
        Self {
            from: "03:00".to_string(),
            to: "05:00".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` wins
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub database_path: Option<PathBuf>,
    pub bind_addr: Option<String>,
}

impl TomlConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Read `path`, or fall back to defaults when absent
    pub fn load_file(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        if !path.exists() {
            warn!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Full resolution: file, then environment, then CLI
    pub fn load(path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        config.apply_env();
        config.apply_overrides(overrides);
        config.blackout_window()?;
        Ok(config)
    }

    /// Environment overrides for settings without a CLI flag
    pub fn apply_env(&mut self) {
        if let Ok(from) = std::env::var(ENV_BLACKOUT_FROM) {
            self.blackout.from = from;
        }
        if let Ok(to) = std::env::var(ENV_BLACKOUT_TO) {
            self.blackout.to = to;
        }
        if let Ok(color) = std::env::var(ENV_TITLE_COLOR) {
            if !color.trim().is_empty() {
                self.report_title_color = color.trim().to_string();
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(path) = overrides.database_path {
            self.database_path = path;
        }
        if let Some(addr) = overrides.bind_addr {
            self.bind_addr = addr;
        }
    }

    pub fn blackout_window(&self) -> Result<BlackoutWindow> {
        BlackoutWindow::parse(&self.blackout.from, &self.blackout.to)
    }

    /// Settings the report engine needs
    pub fn submission_options(&self) -> Result<SubmissionOptions> {
        Ok(SubmissionOptions {
            blackout: self.blackout_window()?,
            style: RenderStyle {
                title_color: self.report_title_color.clone(),
            },
        })
    }
}
