//! One bot instance: a prefix, a command registry and an IRC host.
//!
//! Each bot owns independent copies of every registered command, so its
//! configuration can diverge from other bots in the same process.

use crate::access::is_disabled;
use crate::command::{CommandContext, CommandRegistry, SharedRegistry, shared_registry};
use crate::config::{BotConfig, Config, ConfigError};
use crate::dispatch::{DENIED_REPLY, DISABLED_REPLY, DispatchOutcome, IgnoreReason, tokenize};
use crate::host::IrcHost;
use crate::plugins::PluginManager;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{Instrument, Level, debug, info, span, warn};

pub struct Bot {
    name: Arc<str>,
    prefix: RwLock<String>,
    host: Arc<dyn IrcHost>,
    registry: SharedRegistry,
}

impl Bot {
    /// Create a bot around an existing registry.
    pub fn new(
        name: impl Into<Arc<str>>,
        prefix: impl Into<String>,
        host: Arc<dyn IrcHost>,
        registry: SharedRegistry,
    ) -> Self {
        Self {
            name: name.into(),
            prefix: RwLock::new(prefix.into()),
            host,
            registry,
        }
    }

    /// Create a bot from its configuration section and attach it to
    /// `manager`, which fills the registry with copies of every known command.
    pub fn from_config(
        bot: &BotConfig,
        config: &Config,
        host: Arc<dyn IrcHost>,
        manager: &PluginManager,
    ) -> Result<Self, ConfigError> {
        let overrides = config.overrides_for(bot)?;
        let registry = shared_registry(CommandRegistry::with_overrides(overrides));
        manager.attach(&registry);

        let prefix = config.prefix_for(bot);
        info!(
            bot = %bot.name,
            prefix = %prefix,
            commands = registry.read().len(),
            "Bot ready"
        );
        Ok(Self::new(bot.name.as_str(), prefix, host, registry))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prefix(&self) -> String {
        self.prefix.read().clone()
    }

    pub fn set_prefix(&self, prefix: impl Into<String>) {
        *self.prefix.write() = prefix.into();
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    pub fn host(&self) -> &Arc<dyn IrcHost> {
        &self.host
    }

    /// Re-read prefix and access overrides from a reloaded configuration.
    ///
    /// Commands return to their declared levels before the new overrides
    /// apply. A configuration without a section for this bot leaves it as is.
    pub fn rehash(&self, config: &Config) -> Result<(), ConfigError> {
        let Some(section) = config.bot(&self.name) else {
            warn!(bot = %self.name, "No configuration section on rehash; keeping current settings");
            return Ok(());
        };
        let overrides = config.overrides_for(section)?;
        self.registry.write().set_overrides(overrides);
        self.set_prefix(config.prefix_for(section));
        info!(bot = %self.name, "Rehashed");
        Ok(())
    }

    /// Handle one chat line from `nick` in `channel`.
    pub async fn handle_chat(&self, channel: &str, nick: &str, message: &str) -> DispatchOutcome {
        let Some(channel) = self.host.channel(channel) else {
            return DispatchOutcome::Ignored(IgnoreReason::UnknownChannel);
        };
        if is_disabled(channel.kind) {
            return DispatchOutcome::Ignored(IgnoreReason::DisabledChannel);
        }

        let prefix = self.prefix();
        let invocation = match tokenize(message, &prefix) {
            Ok(invocation) => invocation,
            Err(reason) => return DispatchOutcome::Ignored(reason),
        };

        // Resolve under the read lock, run the trigger without it.
        let (behavior, required) = {
            let registry = self.registry.read();
            match registry.find(invocation.trigger) {
                Some(command) => (command.behavior(), command.access_level_for(&channel)),
                None => return DispatchOutcome::Ignored(IgnoreReason::UnknownCommand),
            }
        };

        let irc_span = span!(
            Level::DEBUG,
            "irc.command",
            bot = %self.name,
            channel = %channel.name,
            nick = %nick,
            trigger = %invocation.trigger,
        );

        if is_disabled(required) {
            self.host.send_notice(nick, DISABLED_REPLY);
            irc_span.in_scope(|| debug!(required, "Command disabled here"));
            return DispatchOutcome::Disabled;
        }

        let actual = self.host.access_level(&channel.name, nick);
        if actual < required {
            self.host.send_notice(nick, DENIED_REPLY);
            irc_span.in_scope(|| debug!(required, actual, "Access denied"));
            return DispatchOutcome::Denied { required, actual };
        }

        let ctx = CommandContext {
            bot: Arc::clone(&self.name),
            host: Arc::clone(&self.host),
            registry: Arc::clone(&self.registry),
            channel,
            nick: nick.to_string(),
            caller_level: actual,
        };

        let result = behavior
            .trigger(&ctx, invocation.parameters)
            .instrument(irc_span.clone())
            .await;

        let outcome = match result {
            Ok(()) => DispatchOutcome::Executed,
            Err(e) => {
                irc_span.in_scope(|| warn!(error = %e, code = e.error_code(), "Command error"));
                ctx.notice(&e.to_reply());
                DispatchOutcome::Failed(e)
            }
        };
        irc_span.in_scope(|| debug!(outcome = outcome.label(), "Dispatched"));
        outcome
    }
}
