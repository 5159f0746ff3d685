//! Surface-independent commands.
//!
//! A [`GenericCommand`] knows nothing about IRC: it takes a parameter string
//! and returns lines tagged with how they should be shown. Consoles or admin
//! endpoints can call it directly; [`GenericAdapter`] wraps it so the chat
//! dispatcher can run it like any other [`IrcCommand`].

use super::{CommandContext, CommandSpec, IrcCommand};
use crate::access::AccessLevel;
use crate::error::CommandResult;
use async_trait::async_trait;

/// How a response line should be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayKind {
    PublicSuccess,
    PublicError,
    PrivateSuccess,
    PrivateError,
}

impl DisplayKind {
    /// Public lines go to the channel; private lines go to the caller.
    #[inline]
    pub fn is_public(self) -> bool {
        matches!(self, Self::PublicSuccess | Self::PublicError)
    }

    #[inline]
    pub fn is_error(self) -> bool {
        matches!(self, Self::PublicError | Self::PrivateError)
    }
}

/// One line of output from a generic command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseLine {
    pub text: String,
    pub kind: DisplayKind,
}

impl ResponseLine {
    pub fn new(text: impl Into<String>, kind: DisplayKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

/// A command callable from any surface.
pub trait GenericCommand: Send + Sync {
    fn triggers(&self) -> &[&'static str];

    fn trigger(&self, parameters: &str) -> Vec<ResponseLine>;

    fn help(&self, parameters: &str) -> &str;
}

/// Runs a [`GenericCommand`] from chat.
pub struct GenericAdapter<G> {
    inner: G,
    level: AccessLevel,
}

impl<G: GenericCommand> GenericAdapter<G> {
    pub fn new(inner: G, level: AccessLevel) -> Self {
        Self { inner, level }
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }
}

#[async_trait]
impl<G: GenericCommand> IrcCommand for GenericAdapter<G> {
    fn create(&self, spec: &mut CommandSpec) {
        for trigger in self.inner.triggers() {
            spec.add_trigger(trigger);
        }
        spec.set_access_level(self.level);
    }

    async fn trigger(&self, ctx: &CommandContext, parameters: &str) -> CommandResult {
        for line in self.inner.trigger(parameters) {
            if line.kind.is_public() {
                ctx.reply(&line.text);
            } else {
                ctx.notice(&line.text);
            }
        }
        Ok(())
    }

    fn help(&self, parameters: &str) -> &str {
        self.inner.help(parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Command, CommandRegistry, shared_registry};
    use crate::host::{ChannelInfo, Outbound, RecordingHost};
    use std::sync::Arc;

    struct Status;

    impl GenericCommand for Status {
        fn triggers(&self) -> &[&'static str] {
            &["status", "st"]
        }

        fn trigger(&self, parameters: &str) -> Vec<ResponseLine> {
            if parameters.is_empty() {
                return vec![ResponseLine::new(
                    "Error: Too few parameters.",
                    DisplayKind::PrivateError,
                )];
            }
            vec![
                ResponseLine::new(format!("{} is up", parameters), DisplayKind::PublicSuccess),
                ResponseLine::new("checked", DisplayKind::PrivateSuccess),
                ResponseLine::new("one warning", DisplayKind::PublicError),
            ]
        }

        fn help(&self, _parameters: &str) -> &str {
            "Reports status. Syntax: status <server>"
        }
    }

    fn ctx(host: Arc<RecordingHost>) -> CommandContext {
        CommandContext {
            bot: Arc::from("test"),
            host,
            registry: shared_registry(CommandRegistry::new()),
            channel: ChannelInfo::new("#main", 0),
            nick: "alice".into(),
            caller_level: 0,
        }
    }

    #[test]
    fn test_adapter_declares_triggers_and_level() {
        let cmd = Command::new(GenericAdapter::new(Status, 2));
        assert_eq!(cmd.triggers(), ["status", "st"]);
        assert_eq!(cmd.access_level(), 2);
        assert_eq!(cmd.help(""), "Reports status. Syntax: status <server>");
    }

    #[tokio::test]
    async fn test_adapter_routes_lines_by_display_kind() {
        let host = Arc::new(RecordingHost::new());
        let adapter = GenericAdapter::new(Status, 0);
        adapter
            .trigger(&ctx(host.clone()), "game1")
            .await
            .expect("adapter never fails");

        let sent = host.take_sent();
        assert_eq!(
            sent,
            vec![
                Outbound::Message {
                    channel: "#main".into(),
                    text: "game1 is up".into()
                },
                Outbound::Notice {
                    nick: "alice".into(),
                    text: "checked".into()
                },
                Outbound::Message {
                    channel: "#main".into(),
                    text: "one warning".into()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_adapter_private_error() {
        let host = Arc::new(RecordingHost::new());
        let adapter = GenericAdapter::new(Status, 0);
        adapter.trigger(&ctx(host.clone()), "").await.expect("adapter never fails");
        assert!(matches!(
            host.take_sent().as_slice(),
            [Outbound::Notice { nick, .. }] if nick == "alice"
        ));
    }

    #[test]
    fn test_display_kind_flags() {
        assert!(DisplayKind::PublicError.is_public());
        assert!(DisplayKind::PublicError.is_error());
        assert!(!DisplayKind::PrivateSuccess.is_public());
        assert!(!DisplayKind::PrivateSuccess.is_error());
    }
}
