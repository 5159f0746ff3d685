//! Per-bot command registry.
//!
//! Commands are kept in registration order and looked up by linear scan, so
//! when two commands share a trigger the one registered first wins.
//! Configured access overrides are applied as each command is added.

use super::{Command, CommandId};
use crate::access::{AccessLevel, AccessOverride};
use crate::host::ChannelInfo;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, warn};

/// Registry handle shared between a bot, its plugin manager and the
/// commands it runs. Locks are only held for lookups and edits, never
/// across a trigger's `.await`.
pub type SharedRegistry = Arc<RwLock<CommandRegistry>>;

/// The commands available to one bot.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Vec<Command>,
    /// Overrides in application order: fallback section first, then the
    /// bot's own section.
    overrides: Vec<AccessOverride>,
}

/// First whitespace-delimited token of `input`.
fn first_token(input: &str) -> Option<&str> {
    input.split_whitespace().next()
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overrides(overrides: Vec<AccessOverride>) -> Self {
        Self {
            commands: Vec::new(),
            overrides,
        }
    }

    /// Append a command, applying any configured overrides for its primary
    /// trigger.
    pub fn add(&mut self, mut command: Command) {
        if let Some(existing) = command
            .triggers()
            .iter()
            .find(|t| self.find(t).is_some())
        {
            warn!(trigger = %existing, "Duplicate command trigger; earlier registration wins");
        }
        self.apply_overrides(&mut command);
        debug!(
            trigger = %command.primary_trigger(),
            level = command.access_level(),
            "Command added"
        );
        self.commands.push(command);
    }

    /// Remove the first command matching `trigger`. Returns whether one was
    /// found.
    pub fn remove(&mut self, trigger: &str) -> bool {
        let Some(token) = first_token(trigger) else {
            return false;
        };
        match self.commands.iter().position(|c| c.matches(token)) {
            Some(index) => {
                self.commands.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove every command copied from prototype `id`. Returns the count.
    pub fn remove_origin(&mut self, id: CommandId) -> usize {
        let before = self.commands.len();
        self.commands.retain(|c| c.origin() != Some(id));
        before - self.commands.len()
    }

    /// First command whose trigger equals the first token of `input`.
    pub fn find(&self, input: &str) -> Option<&Command> {
        let token = first_token(input)?;
        self.commands.iter().find(|c| c.matches(token))
    }

    pub fn find_mut(&mut self, input: &str) -> Option<&mut Command> {
        let token = first_token(input)?;
        self.commands.iter_mut().find(|c| c.matches(token))
    }

    /// Commands whose effective level in `channel` is exactly `level`.
    pub fn list_by_access_level(&self, channel: &ChannelInfo, level: AccessLevel) -> Vec<&Command> {
        self.commands
            .iter()
            .filter(|c| c.access_level_for(channel) == level)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn overrides(&self) -> &[AccessOverride] {
        &self.overrides
    }

    /// Replace the configured overrides and re-apply them to every command,
    /// starting from each command's declared table.
    pub fn set_overrides(&mut self, overrides: Vec<AccessOverride>) {
        self.overrides = overrides;
        let mut commands = std::mem::take(&mut self.commands);
        for command in &mut commands {
            command.reset_access();
            self.apply_overrides(command);
        }
        self.commands = commands;
    }

    fn apply_overrides(&self, command: &mut Command) {
        let trigger = command.primary_trigger().to_string();
        for o in self.overrides.iter().filter(|o| o.targets(&trigger)) {
            o.apply(command.access_mut());
        }
    }
}
