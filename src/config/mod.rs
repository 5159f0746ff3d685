//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, SectionConfig, BotConfig)
//! - [`overrides`]: Command access settings and their conversion to overrides
//! - [`console`]: Channel and access tables for the console harness host
//! - [`validation`]: Startup checks that report every problem at once
//! - [`defaults`]: Default values

mod console;
mod defaults;
mod overrides;
mod types;
pub mod validation;

pub use console::{ConsoleAccess, ConsoleChannel, ConsoleConfig};
pub use defaults::{DEFAULT_PREFIX, default_config_path};
pub use overrides::{CommandAccess, CommandSetting, CommandsConfig, parse_commands, parse_key};
pub use types::{BotConfig, Config, ConfigError, SectionConfig};
pub use validation::{ValidationError, validate};
