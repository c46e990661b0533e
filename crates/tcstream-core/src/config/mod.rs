//! Configuration management for tcstream.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `tcstream.toml` file
//! 3. User config `~/.config/tcstream/config.toml`
//! 4. Built-in defaults (lowest priority)

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::path::PathMapping;

mod defaults;

pub use defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How runner commands are assembled.
    pub runner: RunnerConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./tcstream.toml` (project local)
    /// 2. `~/.config/tcstream/config.toml` (user config)
    /// 3. Falls back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new(PROJECT_CONFIG_FILE).exists() {
            return Self::from_file(PROJECT_CONFIG_FILE);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join(USER_CONFIG_DIR).join(USER_CONFIG_FILE);
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides()?;

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(php) = std::env::var(ENV_PHP) {
            self.runner.php = php;
        }
        if let Ok(phpunit) = std::env::var(ENV_PHPUNIT) {
            self.runner.phpunit = phpunit;
        }
        if let Ok(codecept) = std::env::var(ENV_CODECEPT) {
            self.runner.codecept = codecept;
        }
        if let Ok(command) = std::env::var(ENV_COMMAND) {
            self.runner.command = command;
        }
        if let Ok(args) = std::env::var(ENV_ARGS) {
            self.runner.args = shell_words::split(&args)
                .map_err(|e| ConfigError::Invalid(format!("{ENV_ARGS}: {e}")))?;
        }

        Ok(())
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Runner command configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// PHP interpreter.
    pub php: String,

    /// Options passed to PHP on normal runs.
    pub php_options: Vec<String>,

    /// Options passed to PHP when debugging.
    pub php_debug_options: Vec<String>,

    /// PHPUnit or ParaTest binary.
    pub phpunit: String,

    /// Codeception binary.
    pub codecept: String,

    /// Codeception suite for functional targets.
    pub codecept_suite: String,

    /// Command prefix, e.g. `docker compose exec -T app`.
    /// Prefixes mentioning docker, ssh or sail enable path mapping.
    pub command: String,

    /// Extra arguments appended to every run.
    pub args: Vec<String>,

    /// PHPUnit configuration used when `args` carry none.
    pub phpunit_config: String,

    /// Codeception configuration used when `args` carry none.
    pub codecept_config: String,

    /// Local → remote path prefixes, applied in order.
    pub paths: Vec<PathMapping>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            php: DEFAULT_PHP.to_string(),
            php_options: Vec::new(),
            php_debug_options: DEFAULT_PHP_DEBUG_OPTIONS.iter().map(|s| s.to_string()).collect(),
            phpunit: DEFAULT_PHPUNIT.to_string(),
            codecept: DEFAULT_CODECEPT.to_string(),
            codecept_suite: DEFAULT_CODECEPT_SUITE.to_string(),
            command: String::new(),
            args: Vec::new(),
            phpunit_config: DEFAULT_PHPUNIT_CONFIG.to_string(),
            codecept_config: DEFAULT_CODECEPT_CONFIG.to_string(),
            paths: Vec::new(),
        }
    }
}

impl RunnerConfig {
    /// Check the configuration for values that cannot produce a command.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.phpunit.trim().is_empty() && self.codecept.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "runner.phpunit and runner.codecept are both empty".to_string(),
            ));
        }

        if let Some(entry) = self.paths.iter().find(|p| p.local.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "path mapping to '{}' has an empty local prefix",
                entry.remote
            )));
        }

        Ok(())
    }
}
