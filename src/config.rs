use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::corridor::CorridorClientConfig;
use crate::error::{PortalError, Result};

pub const DEFAULT_REFRESH_MS: u64 = 60_000;
pub const DEFAULT_ERROR_HISTORY: usize = 5;
const MAX_ERROR_HISTORY: usize = 100;

/// Main configuration structure loaded from transparency_portal.toml and environment variables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub portal: PortalConfig,
    /// Corridor defaults for the payload helper; absent unless configured
    #[serde(default)]
    pub corridor: Option<CorridorClientConfig>,
}

/// Polling widget settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PortalConfig {
    /// API root, e.g. `https://phx-viva-la.city/api`
    pub base_url: String,
    pub neighborhood_id: String,
    /// 0 means "use the default"
    pub refresh_ms: u64,
    pub request_timeout_ms: u64,
    /// How many failures are retained
    pub error_history: usize,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080/api".to_string(),
            neighborhood_id: "phx-west-001".to_string(),
            refresh_ms: DEFAULT_REFRESH_MS,
            request_timeout_ms: 10_000,
            error_history: DEFAULT_ERROR_HISTORY,
        }
    }
}

impl PortalConfig {
    pub fn new(base_url: impl Into<String>, neighborhood_id: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            neighborhood_id: neighborhood_id.into(),
            ..Self::default()
        }
    }

    /// Effective polling period
    pub fn refresh_interval(&self) -> std::time::Duration {
        let ms = if self.refresh_ms == 0 {
            DEFAULT_REFRESH_MS
        } else {
            self.refresh_ms
        };
        std::time::Duration::from_millis(ms)
    }

    /// Apply PORTAL_* environment overrides
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("PORTAL_BASE_URL") {
            self.base_url = url;
            tracing::debug!("PORTAL_BASE_URL env override applied");
        }
        if let Ok(id) = std::env::var("PORTAL_NEIGHBORHOOD_ID") {
            self.neighborhood_id = id;
        }
        if let Some(ms) = std::env::var("PORTAL_REFRESH_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            self.refresh_ms = ms;
        }
        if let Some(ms) = std::env::var("PORTAL_REQUEST_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            self.request_timeout_ms = ms;
        }
        if let Some(n) = std::env::var("PORTAL_ERROR_HISTORY")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
        {
            self.error_history = n;
        }
    }

    /// Validate, normalizing out-of-range numbers
    pub fn validate(&mut self) -> Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(PortalError::Config {
                message: format!(
                    "base_url '{}' must start with http:// or https://",
                    self.base_url
                ),
            });
        }
        if self.neighborhood_id.trim().is_empty() {
            return Err(PortalError::Config {
                message: "neighborhood_id must not be empty".to_string(),
            });
        }

        if self.refresh_ms == 0 {
            tracing::warn!(
                "refresh_ms is 0, falling back to {}ms",
                DEFAULT_REFRESH_MS
            );
            self.refresh_ms = DEFAULT_REFRESH_MS;
        }
        if self.request_timeout_ms == 0 {
            self.request_timeout_ms = PortalConfig::default().request_timeout_ms;
        }

        if self.error_history == 0 {
            self.error_history = 1;
        } else if self.error_history > MAX_ERROR_HISTORY {
            tracing::warn!(
                "error_history {} exceeds max {}, clamping",
                self.error_history,
                MAX_ERROR_HISTORY
            );
            self.error_history = MAX_ERROR_HISTORY;
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from TOML file and environment variables
    /// Uses PORTAL_CONFIG environment variable or defaults to "transparency_portal.toml"
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Same as [`Config::load`], with an explicit file taking precedence over PORTAL_CONFIG
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        if let Ok(env_path) = std::env::var("PORTAL_ENV_FILE") {
            let _ = dotenvy::from_path(env_path);
        } else {
            let _ = dotenvy::dotenv();
        }

        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => std::env::var("PORTAL_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("transparency_portal.toml")),
        };

        let mut config = match std::fs::read_to_string(&config_path) {
            Ok(content) => Self::from_toml(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    "Config file {} not found, using defaults",
                    config_path.display()
                );
                Self::default()
            }
            Err(e) => {
                return Err(PortalError::Config {
                    message: format!("Failed to read {}: {}", config_path.display(), e),
                });
            }
        };

        config.portal.apply_env();
        config.portal.validate()?;
        Ok(config)
    }

    /// Parse a TOML document without touching the environment
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
