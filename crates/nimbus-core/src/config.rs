//! Configuration module for Nimbus.
//!
//! Typed configuration structs mapped to the YAML configuration file, with
//! loading, defaults and validation. Command-line flags override these values
//! in the binary.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for Nimbus.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub remote: RemoteConfig,
    pub session: SessionConfig,
    pub mirror: MirrorConfig,
    pub watch: WatchConfig,
    pub logging: LoggingConfig,
}

/// Storage service endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Service domain; the API lives at `https://{domain}/api/v1`.
    pub domain: String,
    /// Full API base URL, overriding `domain` when set.
    pub base_url: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

/// Session persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// File the session is saved to after a successful login.
    pub file: PathBuf,
}

/// Tree mirroring settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Remote directory mirrored when none is given.
    pub root: String,
    /// Local directory the remote tree is materialized under.
    pub local_base: PathBuf,
    /// Stop discovery after this many entries.
    pub max_entries: Option<usize>,
}

/// Change logger settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Directory watched when none is given.
    pub path: PathBuf,
    /// Idle tick of the watch loop, in milliseconds.
    pub tick_ms: u64,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/nimbus/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("nimbus")
            .join("config.yaml")
    }
}

impl RemoteConfig {
    /// API base URL without a trailing slash.
    pub fn api_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}/api/v1", self.domain),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            domain: "www.amazon.com".to_string(),
            base_url: None,
            timeout_secs: 60,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            file: dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("~"))
                .join(".nimbus"),
        }
    }
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            root: "/".to_string(),
            local_base: PathBuf::from("/tmp/testing"),
            max_entries: None,
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            tick_ms: 1000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"watch.tick_ms"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- remote ---
        if self.remote.domain.trim().is_empty() && self.remote.base_url.is_none() {
            errors.push(ValidationError {
                field: "remote.domain".into(),
                message: "must not be empty unless remote.base_url is set".into(),
            });
        }
        if let Some(url) = &self.remote.base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                errors.push(ValidationError {
                    field: "remote.base_url".into(),
                    message: format!("not an http(s) URL: {url}"),
                });
            }
        }
        if self.remote.timeout_secs == 0 {
            errors.push(ValidationError {
                field: "remote.timeout_secs".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- mirror ---
        if !self.mirror.root.starts_with('/') {
            errors.push(ValidationError {
                field: "mirror.root".into(),
                message: format!("must be an absolute remote path: {}", self.mirror.root),
            });
        }
        if self.mirror.max_entries == Some(0) {
            errors.push(ValidationError {
                field: "mirror.max_entries".into(),
                message: "must be greater than 0 when set".into(),
            });
        }

        // --- watch ---
        if self.watch.tick_ms == 0 {
            errors.push(ValidationError {
                field: "watch.tick_ms".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}
