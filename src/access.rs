//! Access levels and per-command override tables.
//!
//! A command carries a default access level plus two override tables: one
//! keyed by channel type (a small integer owned by the IRC host) and one
//! keyed by channel name. Resolution precedence, highest first:
//!
//! 1. channel-name override (case-insensitive)
//! 2. channel-type override
//! 3. the command's default level
//!
//! A negative resolved level means the command is disabled in that context.

use crate::host::ChannelInfo;

/// Integer permission rank. Negative means "disabled".
pub type AccessLevel = i32;

/// Channel classification supplied by the IRC host. Negative types are
/// ignored by the dispatcher entirely.
pub type ChannelType = i32;

/// Returns true if `level` marks a command (or channel) as disabled.
#[inline]
pub fn is_disabled(level: AccessLevel) -> bool {
    level < 0
}

/// Default level plus per-type and per-channel overrides for one command.
///
/// Both tables are small and scanned linearly; the first matching entry wins.
/// Setters replace an existing entry instead of appending a second one, so
/// applying overrides in order gives last-write-wins semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessTable {
    level: AccessLevel,
    types: Vec<(ChannelType, AccessLevel)>,
    channels: Vec<(String, AccessLevel)>,
}

impl AccessTable {
    /// Create a table with only a default level.
    pub fn new(level: AccessLevel) -> Self {
        Self {
            level,
            types: Vec::new(),
            channels: Vec::new(),
        }
    }

    /// The default level, ignoring any overrides.
    #[inline]
    pub fn level(&self) -> AccessLevel {
        self.level
    }

    /// Resolve against a channel type: type override, else default.
    pub fn level_for_type(&self, kind: ChannelType) -> AccessLevel {
        self.type_override(kind).unwrap_or(self.level)
    }

    /// Resolve against a channel name: channel override, else default.
    pub fn level_for_channel_name(&self, name: &str) -> AccessLevel {
        self.channel_override(name).unwrap_or(self.level)
    }

    /// Resolve against a live channel using full precedence.
    pub fn level_for(&self, channel: &ChannelInfo) -> AccessLevel {
        self.channel_override(&channel.name)
            .or_else(|| self.type_override(channel.kind))
            .unwrap_or(self.level)
    }

    pub fn set_level(&mut self, level: AccessLevel) {
        self.level = level;
    }

    /// Set (or replace) the override for a channel type.
    pub fn set_type_level(&mut self, kind: ChannelType, level: AccessLevel) {
        match self.types.iter_mut().find(|(k, _)| *k == kind) {
            Some(entry) => entry.1 = level,
            None => self.types.push((kind, level)),
        }
    }

    /// Set (or replace) the override for a channel name.
    pub fn set_channel_level(&mut self, name: &str, level: AccessLevel) {
        match self
            .channels
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some(entry) => entry.1 = level,
            None => self.channels.push((name.to_string(), level)),
        }
    }

    /// Remove a type override. Returns whether one existed.
    pub fn clear_type_level(&mut self, kind: ChannelType) -> bool {
        let before = self.types.len();
        self.types.retain(|(k, _)| *k != kind);
        self.types.len() != before
    }

    /// Remove a channel override. Returns whether one existed.
    pub fn clear_channel_level(&mut self, name: &str) -> bool {
        let before = self.channels.len();
        self.channels.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.channels.len() != before
    }

    pub fn type_overrides(&self) -> &[(ChannelType, AccessLevel)] {
        &self.types
    }

    pub fn channel_overrides(&self) -> &[(String, AccessLevel)] {
        &self.channels
    }

    fn type_override(&self, kind: ChannelType) -> Option<AccessLevel> {
        self.types
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, level)| *level)
    }

    fn channel_override(&self, name: &str) -> Option<AccessLevel> {
        self.channels
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, level)| *level)
    }
}

/// What a configured override applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideTarget {
    /// The command's default level.
    Default,
    /// A channel-type override.
    Type(ChannelType),
    /// A channel-name override.
    Channel(String),
}

/// One configured access setting for the command whose primary trigger is
/// `trigger`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessOverride {
    pub trigger: String,
    pub target: OverrideTarget,
    pub level: AccessLevel,
}

impl AccessOverride {
    pub fn new(trigger: impl Into<String>, target: OverrideTarget, level: AccessLevel) -> Self {
        Self {
            trigger: trigger.into(),
            target,
            level,
        }
    }

    /// Whether this override is addressed to `trigger` (case-insensitive).
    #[inline]
    pub fn targets(&self, trigger: &str) -> bool {
        self.trigger.eq_ignore_ascii_case(trigger)
    }

    pub fn apply(&self, table: &mut AccessTable) {
        match &self.target {
            OverrideTarget::Default => table.set_level(self.level),
            OverrideTarget::Type(kind) => table.set_type_level(*kind, self.level),
            OverrideTarget::Channel(name) => table.set_channel_level(name, self.level),
        }
    }
}
