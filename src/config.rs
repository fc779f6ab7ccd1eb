//! Configuration loading and validation.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("listen port {0} outside the allowed range 1024-65535")]
    InvalidPort(u16),
    #[error("invalid server password: {0}")]
    InvalidPassword(&'static str),
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server identity.
    pub server: ServerConfig,
    /// Network listener.
    pub listen: ListenConfig,
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server name used as the reply prefix (e.g. "irc.local").
    pub name: String,
    /// Connection password every client must supply via PASS.
    pub password: String,
    /// Server description.
    #[serde(default)]
    pub description: String,
}

/// Network listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenConfig {
    /// Address to bind to (e.g. "0.0.0.0").
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on; unprivileged range only.
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// The socket address string for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.listen.host, self.listen.port)
    }

    /// Validate the listener port and server password.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listen.port < 1024 {
            return Err(ConfigError::InvalidPort(self.listen.port));
        }

        let password = &self.server.password;
        if password.is_empty() || password.len() > 64 {
            return Err(ConfigError::InvalidPassword("must be 1-64 characters"));
        }
        if !password.chars().all(|c| c.is_ascii_graphic()) {
            return Err(ConfigError::InvalidPassword(
                "must be printable with no whitespace",
            ));
        }
        Ok(())
    }
}
