//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/dayscope/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/dayscope/` (~/.config/dayscope/)
//! - State/Logs: `$XDG_STATE_HOME/dayscope/` (~/.local/state/dayscope/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Effort estimator configuration (optional; heuristic fallback is used
    /// when absent)
    #[serde(default)]
    pub estimator: Option<EstimatorConfig>,

    /// Planning defaults
    #[serde(default)]
    pub planning: PlanningConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Effort estimator (LLM) provider configuration
#[derive(Debug, Deserialize, Clone)]
pub struct EstimatorConfig {
    /// Provider type
    pub provider: EstimatorProvider,
    /// Model to use
    pub model: String,
    /// API endpoint (optional, uses default for provider)
    pub endpoint: Option<String>,
    /// API key (can also use env var)
    pub api_key: Option<String>,
    /// HTTP request timeout in seconds
    #[serde(default = "default_estimator_timeout")]
    pub timeout_secs: u64,
}

/// Supported estimator providers
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EstimatorProvider {
    Ollama,
    Claude,
    OpenAI,
}

impl EstimatorProvider {
    /// Returns the default endpoint for this provider
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            EstimatorProvider::Ollama => "http://localhost:11434",
            EstimatorProvider::Claude => "https://api.anthropic.com",
            EstimatorProvider::OpenAI => "https://api.openai.com",
        }
    }
}

fn default_estimator_timeout() -> u64 {
    30
}

/// Planning defaults
#[derive(Debug, Deserialize, Clone)]
pub struct PlanningConfig {
    /// Default time budget in hours when the caller does not supply one
    #[serde(default = "default_hours")]
    pub default_hours: f64,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            default_hours: default_hours(),
        }
    }
}

fn default_hours() -> f64 {
    6.0
}

impl PlanningConfig {
    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if !self.default_hours.is_finite() || self.default_hours <= 0.0 {
            return Err(Error::Config(
                "planning.default_hours must be a positive number".to_string(),
            ));
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.planning.validate()?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/dayscope/config.toml` (~/.config/dayscope/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("dayscope").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/dayscope/` (~/.local/state/dayscope/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("dayscope")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/dayscope/dayscope.log`
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("dayscope.log")
    }

    /// Ensure XDG base directory environment variables are set.
    ///
    /// This is mainly for CLI binaries that want explicit, stable path
    /// behavior before invoking other components that read these env vars.
    pub fn ensure_xdg_env() {
        let home = home_dir();

        if std::env::var("XDG_STATE_HOME").is_err() {
            std::env::set_var("XDG_STATE_HOME", home.join(".local/state"));
        }

        if std::env::var("XDG_CONFIG_HOME").is_err() {
            std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.estimator.is_none());
        assert_eq!(config.planning.default_hours, 6.0);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[estimator]
provider = "ollama"
model = "llama3.2"

[planning]
default_hours = 5.5

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        let estimator = config.estimator.unwrap();
        assert_eq!(estimator.provider, EstimatorProvider::Ollama);
        assert_eq!(estimator.model, "llama3.2");
        assert_eq!(estimator.timeout_secs, 30);
        assert_eq!(config.planning.default_hours, 5.5);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_estimator_provider_endpoints() {
        assert_eq!(
            EstimatorProvider::Ollama.default_endpoint(),
            "http://localhost:11434"
        );
        assert_eq!(
            EstimatorProvider::Claude.default_endpoint(),
            "https://api.anthropic.com"
        );
    }

    #[test]
    fn test_planning_validation() {
        let config = PlanningConfig { default_hours: 0.0 };
        assert!(config.validate().is_err());

        let config = PlanningConfig {
            default_hours: f64::NAN,
        };
        assert!(config.validate().is_err());

        let config = PlanningConfig { default_hours: 8.0 };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[planning]\ndefault_hours = 4.0\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.planning.default_hours, 4.0);
    }
}
