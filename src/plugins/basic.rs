//! `help` and `version`.

use super::Plugin;
use crate::access::{AccessLevel, is_disabled};
use crate::command::{
    Command, CommandContext, CommandSpec, DisplayKind, GenericAdapter, GenericCommand, IrcCommand,
    ResponseLine,
};
use crate::dispatch::split_trigger;
use crate::error::{CommandError, CommandResult};
use async_trait::async_trait;
use std::collections::BTreeMap;

pub struct BasicPlugin;

impl Plugin for BasicPlugin {
    fn name(&self) -> &str {
        "basic"
    }

    fn commands(&self) -> Vec<Command> {
        vec![
            Command::new(HelpCommand),
            Command::new(GenericAdapter::new(VersionInfo, 0)),
        ]
    }
}

/// Lists usable commands, or shows one command's help.
pub struct HelpCommand;

impl HelpCommand {
    /// One line per access level the caller holds, skipping empty levels.
    /// Cost follows the registry size, not the caller's level.
    fn listing(ctx: &CommandContext) -> Vec<String> {
        let registry = ctx.registry.read();
        let mut by_level: BTreeMap<AccessLevel, Vec<&str>> = BTreeMap::new();
        for command in registry.iter() {
            let level = command.access_level_for(&ctx.channel);
            if !is_disabled(level) && level <= ctx.caller_level {
                by_level.entry(level).or_default().push(command.primary_trigger());
            }
        }
        by_level
            .into_iter()
            .map(|(level, names)| format!("Access level {} commands: {}", level, names.join(", ")))
            .collect()
    }

    /// Help for `name` if the caller may use it in this channel.
    fn topic(ctx: &CommandContext, name: &str, subtopic: &str) -> Option<String> {
        let registry = ctx.registry.read();
        let command = registry.find(name)?;
        let required = command.access_level_for(&ctx.channel);
        if is_disabled(required) || required > ctx.caller_level {
            return None;
        }
        Some(command.help(subtopic).to_string())
    }
}

#[async_trait]
impl IrcCommand for HelpCommand {
    fn create(&self, spec: &mut CommandSpec) {
        spec.add_trigger("help");
        spec.add_trigger("commands");
        spec.set_access_level(0);
    }

    async fn trigger(&self, ctx: &CommandContext, parameters: &str) -> CommandResult {
        let (name, subtopic) = split_trigger(parameters);
        if name.is_empty() {
            for line in Self::listing(ctx) {
                ctx.notice(&line);
            }
            return Ok(());
        }

        let text = Self::topic(ctx, name, subtopic)
            .ok_or_else(|| CommandError::NotFound("Command".into()))?;
        ctx.notice(&text);
        Ok(())
    }

    fn help(&self, _parameters: &str) -> &str {
        "Lists commands, or shows help for one command. Syntax: help [command [topic]]"
    }
}

/// Reports the crate version.
pub struct VersionInfo;

impl GenericCommand for VersionInfo {
    fn triggers(&self) -> &[&'static str] {
        &["version", "versioninfo"]
    }

    fn trigger(&self, _parameters: &str) -> Vec<ResponseLine> {
        vec![ResponseLine::new(
            format!("Version: {} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            DisplayKind::PublicSuccess,
        )]
    }

    fn help(&self, _parameters: &str) -> &str {
        "Displays the bot version. Syntax: version"
    }
}
