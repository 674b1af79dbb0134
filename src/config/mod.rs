use crate::muted_error;
use serde::Deserialize;
use std::fs::read_to_string;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("read config file: {0}")]
    IO(#[from] std::io::Error),
    #[error("parse config file: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Session controller policies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Reject run and step commands when session status is not `break`.
    pub strict_commands: bool,
    /// Deadline for an answer to a sent command, `None` - wait forever.
    pub command_timeout_ms: Option<u64>,
}

impl ControllerConfig {
    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub color: bool,
    pub show_variables: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            color: true,
            show_variables: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Built-in configuration.
    pub fn preset() -> Self {
        let preset = include_str!("preset/config.toml");
        toml::de::from_str(preset).expect("should de")
    }

    const DEFAULT_PATH: &'static str = ".config/dbgp-session/config.toml";

    /// Load config from file.
    /// Without explicit path a file at `~/.config/dbgp-session/config.toml` is used
    /// if it exists, otherwise the [`Config::preset`].
    pub fn from_file(path: Option<&Path>) -> Result<Self, ConfigError> {
        let data = match path {
            None => {
                let Some(data) = home::home_dir()
                    .map(|home| home.join(Self::DEFAULT_PATH))
                    .and_then(|path| muted_error!(read_to_string(path)))
                else {
                    return Ok(Self::preset());
                };
                data
            }
            Some(path) => read_to_string(path)?,
        };

        Self::from_toml(&data)
    }

    pub fn from_toml(data: &str) -> Result<Self, ConfigError> {
        Ok(toml::de::from_str(data)?)
    }
}
