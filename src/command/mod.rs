//! Command abstraction.
//!
//! A [`Command`] pairs an [`IrcCommand`] behaviour with the data that makes
//! it configurable per bot: its trigger list and its access table. Cloning a
//! `Command` deep-copies the triggers and tables; the behaviour is immutable
//! and shared.

pub mod generic;
pub mod registry;

use crate::access::{AccessLevel, AccessTable};
use crate::error::CommandResult;
use crate::host::{ChannelInfo, IrcHost};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

pub use generic::{DisplayKind, GenericAdapter, GenericCommand, ResponseLine};
pub use registry::{CommandRegistry, SharedRegistry};

/// Identifies the prototype a bot-local command was copied from.
pub type CommandId = u64;

/// Triggers and default access collected from [`IrcCommand::create`].
#[derive(Debug, Clone, Default)]
pub struct CommandSpec {
    triggers: Vec<String>,
    access: AccessTable,
}

impl CommandSpec {
    pub fn add_trigger(&mut self, trigger: &str) -> &mut Self {
        self.triggers.push(trigger.to_string());
        self
    }

    pub fn set_access_level(&mut self, level: AccessLevel) -> &mut Self {
        self.access.set_level(level);
        self
    }

    /// Full access table, for commands that ship with built-in overrides.
    pub fn access_mut(&mut self) -> &mut AccessTable {
        &mut self.access
    }
}

/// Everything a trigger needs to know about the dispatch that invoked it.
///
/// Owned and cheap to clone so that commands doing background work can move
/// a copy into a spawned task and reply when it finishes.
#[derive(Clone)]
pub struct CommandContext {
    /// Name of the bot (connection) that received the line.
    pub bot: Arc<str>,
    pub host: Arc<dyn IrcHost>,
    /// The receiving bot's registry, for commands that list other commands.
    pub registry: SharedRegistry,
    pub channel: ChannelInfo,
    pub nick: String,
    /// The caller's access level in `channel`.
    pub caller_level: AccessLevel,
}

impl CommandContext {
    /// Send a message to the channel the command was used in.
    pub fn reply(&self, text: &str) {
        self.host.send_message(&self.channel.name, text);
    }

    /// Send a private notice to the caller.
    pub fn notice(&self, text: &str) {
        self.host.send_notice(&self.nick, text);
    }
}

impl fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandContext")
            .field("bot", &self.bot)
            .field("channel", &self.channel)
            .field("nick", &self.nick)
            .field("caller_level", &self.caller_level)
            .finish_non_exhaustive()
    }
}

/// Behaviour of a chat command.
///
/// Implementations must not block. Long-running work belongs on a spawned
/// task that replies through a cloned [`CommandContext`]. Failures are
/// returned as [`crate::error::CommandError`] and shown to the caller; they
/// never abort the bot.
#[async_trait]
pub trait IrcCommand: Send + Sync {
    /// Declare triggers and the default access level. Called once, when the
    /// behaviour is wrapped into a [`Command`].
    fn create(&self, spec: &mut CommandSpec);

    /// Run the command. `parameters` is everything after the trigger.
    async fn trigger(&self, ctx: &CommandContext, parameters: &str) -> CommandResult;

    /// Help text, optionally specialised by a sub-topic in `parameters`.
    fn help(&self, parameters: &str) -> &str;
}

/// A configured command instance.
#[derive(Clone)]
pub struct Command {
    origin: Option<CommandId>,
    triggers: Vec<String>,
    /// Access table as declared by `create`, restored on rehash.
    declared: AccessTable,
    access: AccessTable,
    behavior: Arc<dyn IrcCommand>,
}

impl Command {
    pub fn new(behavior: impl IrcCommand + 'static) -> Self {
        Self::from_arc(Arc::new(behavior))
    }

    pub fn from_arc(behavior: Arc<dyn IrcCommand>) -> Self {
        let mut spec = CommandSpec::default();
        behavior.create(&mut spec);
        Self {
            origin: None,
            triggers: spec.triggers,
            declared: spec.access.clone(),
            access: spec.access,
            behavior,
        }
    }

    pub fn triggers(&self) -> &[String] {
        &self.triggers
    }

    /// The first trigger. Configuration overrides are keyed by it.
    pub fn primary_trigger(&self) -> &str {
        self.triggers.first().map(String::as_str).unwrap_or("")
    }

    /// Case-insensitive exact match against any trigger.
    pub fn matches(&self, token: &str) -> bool {
        self.triggers.iter().any(|t| t.eq_ignore_ascii_case(token))
    }

    pub fn add_trigger(&mut self, trigger: &str) {
        if !self.matches(trigger) {
            self.triggers.push(trigger.to_string());
        }
    }

    pub fn remove_trigger(&mut self, trigger: &str) -> bool {
        let before = self.triggers.len();
        self.triggers.retain(|t| !t.eq_ignore_ascii_case(trigger));
        self.triggers.len() != before
    }

    pub fn access(&self) -> &AccessTable {
        &self.access
    }

    pub fn access_mut(&mut self) -> &mut AccessTable {
        &mut self.access
    }

    /// Default access level, ignoring overrides.
    pub fn access_level(&self) -> AccessLevel {
        self.access.level()
    }

    /// Effective access level in `channel`.
    pub fn access_level_for(&self, channel: &ChannelInfo) -> AccessLevel {
        self.access.level_for(channel)
    }

    /// Drop every configured override and return to the declared table.
    pub fn reset_access(&mut self) {
        self.access = self.declared.clone();
    }

    pub fn help(&self, parameters: &str) -> &str {
        self.behavior.help(parameters)
    }

    pub fn behavior(&self) -> Arc<dyn IrcCommand> {
        Arc::clone(&self.behavior)
    }

    pub fn origin(&self) -> Option<CommandId> {
        self.origin
    }

    pub(crate) fn set_origin(&mut self, id: CommandId) {
        self.origin = Some(id);
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("origin", &self.origin)
            .field("triggers", &self.triggers)
            .field("access", &self.access)
            .finish_non_exhaustive()
    }
}

/// Convenience constructor for a registry handle.
pub fn shared_registry(registry: CommandRegistry) -> SharedRegistry {
    Arc::new(RwLock::new(registry))
}

#[cfg(test)]
pub(crate) mod testing {
    //! Small behaviours shared by unit tests across the crate.

    use super::*;

    /// Replies in the channel with its trigger and parameters.
    pub struct Echo {
        pub triggers: &'static [&'static str],
        pub level: AccessLevel,
    }

    #[async_trait]
    impl IrcCommand for Echo {
        fn create(&self, spec: &mut CommandSpec) {
            for t in self.triggers {
                spec.add_trigger(t);
            }
            spec.set_access_level(self.level);
        }

        async fn trigger(&self, ctx: &CommandContext, parameters: &str) -> CommandResult {
            ctx.reply(&format!("{}: {}", self.triggers[0], parameters));
            Ok(())
        }

        fn help(&self, _parameters: &str) -> &str {
            "Echoes its parameters. Syntax: echo <text>"
        }
    }

    pub fn echo(triggers: &'static [&'static str], level: AccessLevel) -> Command {
        Command::new(Echo { triggers, level })
    }
}

#[cfg(test)]
mod tests {
    use super::testing::echo;

    #[test]
    fn test_create_populates_triggers_and_level() {
        let cmd = echo(&["resolve", "dns"], 2);
        assert_eq!(cmd.triggers(), ["resolve", "dns"]);
        assert_eq!(cmd.primary_trigger(), "resolve");
        assert_eq!(cmd.access_level(), 2);
    }

    #[test]
    fn test_matches_any_trigger_case_insensitively() {
        let cmd = echo(&["resolve", "dns"], 0);
        assert!(cmd.matches("RESOLVE"));
        assert!(cmd.matches("Dns"));
        assert!(!cmd.matches("res"));
    }

    #[test]
    fn test_clone_has_independent_tables() {
        let original = echo(&["resolve"], 1);
        let mut copy = original.clone();
        copy.access_mut().set_channel_level("#ops", 5);
        copy.access_mut().set_type_level(1, 4);
        copy.add_trigger("dns");

        assert!(original.access().channel_overrides().is_empty());
        assert!(original.access().type_overrides().is_empty());
        assert_eq!(original.triggers(), ["resolve"]);
        assert_eq!(copy.triggers(), ["resolve", "dns"]);
    }

    #[test]
    fn test_reset_access_restores_declared_table() {
        let mut cmd = echo(&["resolve"], 1);
        cmd.access_mut().set_level(7);
        cmd.access_mut().set_channel_level("#ops", 0);
        cmd.reset_access();
        assert_eq!(cmd.access_level(), 1);
        assert!(cmd.access().channel_overrides().is_empty());
    }

    #[test]
    fn test_trigger_list_edits() {
        let mut cmd = echo(&["resolve"], 0);
        cmd.add_trigger("RESOLVE");
        assert_eq!(cmd.triggers().len(), 1);
        assert!(cmd.remove_trigger("Resolve"));
        assert_eq!(cmd.primary_trigger(), "");
    }
}
