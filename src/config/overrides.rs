//! Command access settings.
//!
//! Two spellings are accepted inside a `commands` table and may be mixed:
//!
//! ```toml
//! [bots.commands]
//! help = 0                        # bare trigger: default level
//! "resolve.Type.1" = 3            # channel-type override
//! "resolve.Channel.#admin" = 0    # channel-name override
//!
//! [bots.commands.8ball]           # structured form
//! level = 0
//! types = { "2" = -1 }
//! channels = { "#quiet" = -1 }
//! ```
//!
//! Dotted keys split at the first `.Type.` or `.Channel.` marker (ASCII
//! case-insensitive), so dots elsewhere in a trigger or channel name are
//! kept.

use super::types::ConfigError;
use crate::access::{AccessLevel, AccessOverride, ChannelType, OverrideTarget};
use serde::Deserialize;
use std::collections::BTreeMap;

/// A `commands` table. Sorted keys keep application order stable.
pub type CommandsConfig = BTreeMap<String, CommandSetting>;

/// Value of one `commands` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CommandSetting {
    Level(AccessLevel),
    Table(CommandAccess),
}

/// Structured settings for one command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandAccess {
    pub level: Option<AccessLevel>,
    /// Channel type (as a string key) to level.
    #[serde(default)]
    pub types: BTreeMap<String, AccessLevel>,
    /// Channel name to level.
    #[serde(default)]
    pub channels: BTreeMap<String, AccessLevel>,
}

const TYPE_MARKER: &str = ".type.";
const CHANNEL_MARKER: &str = ".channel.";

fn invalid(key: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidSetting {
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn parse_type(key: &str, raw: &str) -> Result<ChannelType, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| invalid(key, format!("channel type '{}' is not an integer", raw)))
}

/// Split a dotted key into its trigger and override target.
pub fn parse_key(key: &str) -> Result<(String, OverrideTarget), ConfigError> {
    // ASCII lowercasing keeps byte offsets valid for `key`.
    let lower = key.to_ascii_lowercase();
    let marker = [TYPE_MARKER, CHANNEL_MARKER]
        .into_iter()
        .filter_map(|m| lower.find(m).map(|pos| (pos, m)))
        .min_by_key(|(pos, _)| *pos);

    let Some((pos, marker)) = marker else {
        if key.trim().is_empty() {
            return Err(invalid(key, "empty trigger"));
        }
        return Ok((key.to_string(), OverrideTarget::Default));
    };

    let trigger = &key[..pos];
    let rest = &key[pos + marker.len()..];
    if trigger.is_empty() {
        return Err(invalid(key, "empty trigger"));
    }
    if rest.is_empty() {
        return Err(invalid(key, "missing override target"));
    }

    let target = if marker == TYPE_MARKER {
        OverrideTarget::Type(parse_type(key, rest)?)
    } else {
        OverrideTarget::Channel(rest.to_string())
    };
    Ok((trigger.to_string(), target))
}

/// Convert a `commands` table into overrides, in key order. Within a
/// structured entry the default level comes first, then types, then
/// channels.
pub fn parse_commands(commands: &CommandsConfig) -> Result<Vec<AccessOverride>, ConfigError> {
    let mut overrides = Vec::new();
    for (key, setting) in commands {
        match setting {
            CommandSetting::Level(level) => {
                let (trigger, target) = parse_key(key)?;
                overrides.push(AccessOverride::new(trigger, target, *level));
            }
            CommandSetting::Table(access) => {
                let (trigger, target) = parse_key(key)?;
                if target != OverrideTarget::Default {
                    return Err(invalid(key, "a table needs a bare trigger as its key"));
                }
                if let Some(level) = access.level {
                    overrides.push(AccessOverride::new(&trigger, OverrideTarget::Default, level));
                }
                for (kind, level) in &access.types {
                    let kind = parse_type(key, kind)?;
                    overrides.push(AccessOverride::new(&trigger, OverrideTarget::Type(kind), *level));
                }
                for (channel, level) in &access.channels {
                    overrides.push(AccessOverride::new(
                        &trigger,
                        OverrideTarget::Channel(channel.clone()),
                        *level,
                    ));
                }
            }
        }
    }
    Ok(overrides)
}
