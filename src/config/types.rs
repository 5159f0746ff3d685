//! Core configuration types and loading.

use super::console::ConsoleConfig;
use super::defaults::default_prefix;
use super::overrides::{CommandsConfig, parse_commands};
use crate::access::AccessOverride;
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
    #[error("invalid command setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Fallback settings shared by every bot.
    #[serde(default)]
    pub defaults: SectionConfig,
    /// One entry per bot (IRC connection).
    #[serde(default)]
    pub bots: Vec<BotConfig>,
    /// Host description used by the console harness.
    #[serde(default)]
    pub console: ConsoleConfig,
}

/// The fallback section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SectionConfig {
    pub prefix: Option<String>,
    #[serde(default)]
    pub commands: CommandsConfig,
}

/// A bot's own section. Its settings win over [`SectionConfig`].
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    pub name: String,
    pub prefix: Option<String>,
    #[serde(default)]
    pub commands: CommandsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Find a bot section by name (case-insensitive).
    pub fn bot(&self, name: &str) -> Option<&BotConfig> {
        self.bots.iter().find(|b| b.name.eq_ignore_ascii_case(name))
    }

    /// Command prefix for `bot`: its own, else the fallback, else `!`.
    pub fn prefix_for(&self, bot: &BotConfig) -> String {
        bot.prefix
            .clone()
            .or_else(|| self.defaults.prefix.clone())
            .unwrap_or_else(default_prefix)
    }

    /// Access overrides for `bot` in application order: the fallback
    /// section first, then the bot's own section, so the bot wins on
    /// identical keys.
    pub fn overrides_for(&self, bot: &BotConfig) -> Result<Vec<AccessOverride>, ConfigError> {
        let mut overrides = parse_commands(&self.defaults.commands)?;
        overrides.extend(parse_commands(&bot.commands)?);
        Ok(overrides)
    }
}
