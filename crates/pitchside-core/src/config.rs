// Configuration loading and parsing (config/pitchside.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding `directory.url`.
pub const API_URL_ENV: &str = "PITCHSIDE_API_URL";

/// Name of the config file inside `config/` and `defaults/`.
pub const CONFIG_FILE: &str = "pitchside.toml";

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_LOG_FILTER: &str = "pitchside=info,warn";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },

    #[error("could not determine a data directory for the preference store")]
    NoDataDir,
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryConfig {
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Local JSON file served instead of the remote endpoint. Relative paths
    /// resolve against the directory holding `config/`.
    #[serde(default)]
    pub fixture: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    /// SQLite file path. Empty selects the platform data directory.
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: default_log_filter(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl StoreConfig {
    /// Resolve the database path, falling back to
    /// `<data dir>/pitchside/pitchside.db`.
    pub fn resolved_path(&self) -> Result<PathBuf, ConfigError> {
        if !self.path.trim().is_empty() {
            return Ok(PathBuf::from(self.path.trim()));
        }
        let dirs = directories::ProjectDirs::from("io", "pitchside", "pitchside")
            .ok_or(ConfigError::NoDataDir)?;
        Ok(dirs.data_dir().join("pitchside.db"))
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/pitchside.toml` relative to
/// `base_dir`, applying environment overrides.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let mut config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    if let Some(fixture) = config.directory.fixture.take() {
        config.directory.fixture = Some(if fixture.is_relative() {
            base_dir.join(fixture)
        } else {
            fixture
        });
    }

    validate(&config)?;

    Ok(config)
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup(API_URL_ENV) {
        if !url.trim().is_empty() {
            config.directory.url = url.trim().to_string();
        }
    }
}

/// Seed `config/pitchside.toml` from `defaults/` when it is missing.
///
/// Returns `true` when the file was copied. An existing config file is never
/// touched.
pub fn ensure_config_file(base_dir: &Path) -> Result<bool, ConfigError> {
    let target = base_dir.join("config").join(CONFIG_FILE);
    if target.is_file() {
        return Ok(false);
    }

    let source = base_dir.join("defaults").join(CONFIG_FILE);
    if !source.is_file() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "no config/{CONFIG_FILE} or defaults/{CONFIG_FILE} under {}",
                base_dir.display()
            ),
        });
    }

    if let Some(config_dir) = target.parent() {
        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to create {}: {e}", config_dir.display()),
        })?;
    }
    std::fs::copy(&source, &target).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to copy {} to {}: {e}", source.display(), target.display()),
    })?;
    Ok(true)
}

/// Convenience wrapper: loads config relative to the current working directory,
/// seeding it from `defaults/` on first run.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_file(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    let url = config.directory.url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::ValidationError {
            field: "directory.url".into(),
            message: format!("must be an http(s) URL, got {url:?}"),
        });
    }

    if config.directory.timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "directory.timeout_secs".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.logging.filter.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "logging.filter".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
