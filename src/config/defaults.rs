//! Default value functions for configuration.

/// Command prefix used when neither the bot nor the defaults section set one.
pub const DEFAULT_PREFIX: &str = "!";

pub fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

/// Config file read by the binary when no path is given.
pub fn default_config_path() -> String {
    "chanbot.toml".to_string()
}
