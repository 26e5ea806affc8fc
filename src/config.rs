//! Service configuration
//!
//! Layered, lowest precedence first: built-in defaults, the YAML file named by
//! `ITEMD_CONFIG`, then the `LISTEN` and `LOG_LEVEL` environment variables.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

pub const CONFIG_PATH_VAR: &str = "ITEMD_CONFIG";
pub const LISTEN_VAR: &str = "LISTEN";
pub const LOG_LEVEL_VAR: &str = "LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub log_level: String,
}

/// Listener settings. Durations are whole seconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Time allowed to receive a full request once it has started
    pub read_timeout_secs: u64,
    pub write_timeout_secs: u64,
    /// Time a keep-alive connection may sit between requests
    pub idle_timeout_secs: u64,
    /// Drain window for in-flight requests on shutdown
    pub shutdown_grace_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            read_timeout_secs: 5,
            write_timeout_secs: 10,
            idle_timeout_secs: 60,
            shutdown_grace_secs: 5,
        }
    }
}

impl ServerConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn load() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration using `lookup` in place of the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = match lookup(CONFIG_PATH_VAR) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        if let Some(addr) = lookup(LISTEN_VAR) {
            cfg.server.listen_addr = addr;
        }
        if let Some(level) = lookup(LOG_LEVEL_VAR) {
            cfg.log_level = level;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        Self::from_yaml_str(&raw)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Parses YAML; missing keys take their defaults.
    pub fn from_yaml_str(raw: &str) -> anyhow::Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// The configured level, as understood by `tracing`.
    pub fn tracing_level(&self) -> anyhow::Result<tracing::Level> {
        self.log_level
            .parse()
            .map_err(|_| anyhow::anyhow!("unknown log level `{}`", self.log_level))
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.server.listen_addr.trim().is_empty() {
            anyhow::bail!("listen address must not be empty");
        }
        self.tracing_level()?;
        Ok(())
    }
}
