//! Configuration types for healthbar.
//!
//! [`Config::load`] reads `~/.config/healthbar/config.toml`, creating it with
//! hardcoded defaults if it does not yet exist, then applies `HEALTHBAR__*`
//! environment overrides (e.g. `HEALTHBAR__SERVER__PORT=9000`).
//! [`Config::defaults`] returns the same defaults without touching the
//! filesystem (useful in tests).

use crate::store::Store;
use serde::Deserialize;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[store]
# path = "~/.health_bar/health_log.csv"

[server]
host = "127.0.0.1"
port = 8088
# static_dir = "/path/to/viewer"

[tray]
max_health         = 100
poll_interval_secs = 5

[logging]
level = "warn"
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level application configuration, loaded from `~/.config/healthbar/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub tray: TrayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[store]` section of `config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    /// Store file. A leading `~/` is expanded; unset means
    /// `~/.health_bar/health_log.csv`.
    #[serde(default)]
    pub path: Option<String>,
}

impl StoreConfig {
    pub fn resolved_path(&self) -> PathBuf {
        match &self.path {
            Some(path) => expand_home(path),
            None => default_store_path(),
        }
    }

    pub fn store(&self) -> Store {
        Store::new(self.resolved_path())
    }
}

/// `[server]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory served for non-API paths. Unset serves the built-in viewer.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8088 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
        }
    }
}

/// `[tray]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct TrayConfig {
    #[serde(default = "default_max_health")]
    pub max_health: u64,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_max_health() -> u64 { 100 }
fn default_poll_interval_secs() -> u64 { 5 }

impl Default for TrayConfig {
    fn default() -> Self {
        Self {
            max_health: default_max_health(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

/// `[logging]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String { "warn".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/healthbar/config.toml`, layered on top of the
    /// built-in defaults. Creates the file with defaults if it does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG.trim_start())?;
        }

        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path.as_path()).required(false))
            .add_source(
                config::Environment::with_prefix("HEALTHBAR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// [`Config::load`], falling back to the defaults with a warning.
    pub fn load_or_defaults() -> Self {
        Self::load().unwrap_or_else(|error| {
            tracing::warn!(error = %error, "config unreadable, using defaults");
            Self::defaults()
        })
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn home_dir() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
}

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
        .join("healthbar")
        .join("config.toml")
}

/// `~/.health_bar/health_log.csv`
pub fn default_store_path() -> PathBuf {
    home_dir().join(".health_bar").join("health_log.csv")
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => home_dir().join(rest),
        None if path == "~" => home_dir(),
        None => PathBuf::from(path),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
