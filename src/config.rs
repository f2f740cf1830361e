//! Configuration loading and validation.
//!
//! Settings come from `config.toml` (path from `$CLICKTOPLAY_CONFIG`, else
//! `~/.clicktoplay/config.toml`). Every section has defaults, so a missing
//! or empty file is valid.
//!
//! Precedence: env vars > config file > defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::wait::WaitOptions;

/// Env var naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "CLICKTOPLAY_CONFIG";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Click-to-play policy.
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Poll timing for state checks.
    #[serde(default)]
    pub wait: WaitConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Click-to-play policy settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PolicyConfig {
    /// Require consent before plugins run (`plugins.click_to_play`).
    #[serde(default = "default_click_to_play")]
    pub click_to_play: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            click_to_play: default_click_to_play(),
        }
    }
}

/// Poll timing, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WaitConfig {
    /// Overall deadline for one wait.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Delay after the first failed check.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Ceiling for the backoff delay.
    #[serde(default = "default_max_interval_ms")]
    pub max_interval_ms: u64,
}

impl WaitConfig {
    /// Convert to poll options.
    pub fn options(&self) -> WaitOptions {
        WaitOptions {
            timeout: Duration::from_millis(self.timeout_ms),
            initial_interval: Duration::from_millis(self.interval_ms),
            max_interval: Duration::from_millis(self.max_interval_ms),
        }
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            interval_ms: default_interval_ms(),
            max_interval_ms: default_max_interval_ms(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for rotating JSON logs. Console only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            logs_dir: None,
        }
    }
}

impl Config {
    /// Parse a TOML string and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid config or fails validation.
    pub fn from_toml(toml_str: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(toml_str).context("failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate that values are within sane bounds.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first offending value.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.wait.timeout_ms > 0, "wait.timeout_ms must be > 0");
        anyhow::ensure!(self.wait.interval_ms > 0, "wait.interval_ms must be > 0");
        anyhow::ensure!(
            self.wait.max_interval_ms >= self.wait.interval_ms,
            "wait.max_interval_ms must be >= wait.interval_ms"
        );
        anyhow::ensure!(
            !self.logging.level.trim().is_empty(),
            "logging.level must not be empty"
        );
        Ok(())
    }

    /// Apply environment overrides through `env`.
    ///
    /// Takes a resolver so tests can avoid mutating the process environment.
    /// Unparseable values are logged and ignored.
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("CLICKTOPLAY_CLICK_TO_PLAY") {
            match v.parse() {
                Ok(flag) => self.policy.click_to_play = flag,
                Err(_) => tracing::warn!(
                    var = "CLICKTOPLAY_CLICK_TO_PLAY",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
        if let Some(v) = env("CLICKTOPLAY_WAIT_TIMEOUT_MS") {
            match v.parse() {
                Ok(ms) => self.wait.timeout_ms = ms,
                Err(_) => tracing::warn!(
                    var = "CLICKTOPLAY_WAIT_TIMEOUT_MS",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
        if let Some(v) = env("CLICKTOPLAY_LOG_LEVEL") {
            self.logging.level = v;
        }
    }
}

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or fails validation.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config at {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Load configuration with env overrides applied.
///
/// `explicit` wins over `$CLICKTOPLAY_CONFIG`, which wins over the default
/// location. A missing default file yields defaults; a missing explicit
/// file is an error.
///
/// # Errors
///
/// Returns an error if a config file cannot be read or is invalid.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<Config> {
    load_with(explicit, |key| std::env::var(key).ok())
}

/// [`load`] with a custom env resolver.
///
/// # Errors
///
/// Returns an error if a config file cannot be read or is invalid.
pub fn load_with(
    explicit: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Config> {
    let mut config = match explicit
        .map(Path::to_path_buf)
        .or_else(|| env(CONFIG_PATH_ENV).map(PathBuf::from))
    {
        Some(path) => load_config(&path)?,
        None => {
            let path = config_dir()?.join("config.toml");
            if path.exists() {
                load_config(&path)?
            } else {
                tracing::debug!(path = %path.display(), "no config file found, using defaults");
                Config::default()
            }
        }
    };
    config.apply_overrides(env);
    config.validate()?;
    Ok(config)
}

/// Resolve the default config directory (`~/.clicktoplay/`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> anyhow::Result<PathBuf> {
    let home = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.home_dir().join(".clicktoplay"))
}

// Default value functions for serde.

fn default_click_to_play() -> bool {
    true
}

fn default_timeout_ms() -> u64 {
    3_000
}

fn default_interval_ms() -> u64 {
    100
}

fn default_max_interval_ms() -> u64 {
    500
}

fn default_log_level() -> String {
    "info".to_owned()
}
