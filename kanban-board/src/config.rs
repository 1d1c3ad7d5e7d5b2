//! Engine configuration loaded through figment.
//!
//! Sources in precedence order (later sources override earlier ones):
//! 1. Built-in defaults
//! 2. An optional config file, format chosen by extension (toml, yaml/yml, json)
//! 3. Environment variables prefixed `KANBAN_BOARD_`

use crate::error::{BoardError, Result};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, trace};

/// Prefix for environment overrides, e.g. `KANBAN_BOARD_REMOTE_TIMEOUT_MS`
pub const ENV_PREFIX: &str = "KANBAN_BOARD_";

/// Tunables for the coordinator and the CLI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound for one remote call; expiry counts as a remote failure
    pub remote_timeout_ms: u64,
    /// Fire the celebration side effect for confetti lists
    pub celebrate: bool,
    /// Longest accepted card title or list name, in characters
    pub max_title_len: usize,
    /// Number of activity entries kept in memory
    pub activity_capacity: usize,
    /// Default tracing filter for the CLI
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            remote_timeout_ms: 10_000,
            celebrate: true,
            max_title_len: 500,
            activity_capacity: 200,
            log_filter: "kanban_board=info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load defaults, then `file` if given, then the environment
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(file)?.extract()?;
        config.validate()?;
        debug!(?config, "loaded engine configuration");
        Ok(config)
    }

    /// Build the layered figment without extracting it
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = file {
            if !path.exists() {
                return Err(BoardError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("config file not found: {}", path.display()),
                )));
            }
            trace!(path = %path.display(), "merging config file");
            let extension = path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase);
            figment = match extension.as_deref() {
                Some("toml") => figment.merge(Toml::file(path)),
                Some("yaml") | Some("yml") => figment.merge(Yaml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                _ => {
                    return Err(BoardError::validation(
                        "config",
                        format!("unsupported config format: {}", path.display()),
                    ))
                }
            };
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Reject values the coordinator cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.remote_timeout_ms == 0 {
            return Err(BoardError::validation(
                "remote_timeout_ms",
                "must be greater than zero",
            ));
        }
        if self.max_title_len == 0 {
            return Err(BoardError::validation("max_title_len", "must be greater than zero"));
        }
        Ok(())
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms)
    }

    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_celebrate(mut self, celebrate: bool) -> Self {
        self.celebrate = celebrate;
        self
    }
}
