//! `resolve host <name>` and `resolve ip <address>`.
//!
//! Lookups run on a spawned task and answer in the channel when they finish,
//! so a slow resolver never holds up dispatch.

use super::Plugin;
use crate::command::{Command, CommandContext, CommandSpec, IrcCommand};
use crate::dispatch::split_trigger;
use crate::error::{CommandError, CommandResult};
use async_trait::async_trait;
use hickory_resolver::TokioResolver;
use hickory_resolver::config::ResolverConfig;
use hickory_resolver::name_server::TokioConnectionProvider;
use std::net::IpAddr;
use std::sync::OnceLock;
use tracing::debug;

const SYNTAX: &str = "resolve <host|ip> <target>";
const HELP: &str = "Resolves a hostname or an IP address. Syntax: resolve <host|ip> <target>";
const HELP_HOST: &str = "Resolves a hostname to its addresses. Syntax: resolve host <hostname>";
const HELP_IP: &str = "Resolves an IP address to its hostname. Syntax: resolve ip <address>";

pub struct ResolvePlugin;

impl Plugin for ResolvePlugin {
    fn name(&self) -> &str {
        "resolve"
    }

    fn commands(&self) -> Vec<Command> {
        vec![Command::new(ResolveCommand::default())]
    }
}

/// Forward and reverse DNS lookups.
#[derive(Default)]
pub struct ResolveCommand {
    resolver: OnceLock<TokioResolver>,
}

fn build_resolver() -> TokioResolver {
    // System config if available, otherwise the library defaults.
    TokioResolver::builder_tokio()
        .map(|b| b.build())
        .unwrap_or_else(|_| {
            TokioResolver::builder_with_config(
                ResolverConfig::default(),
                TokioConnectionProvider::default(),
            )
            .build()
        })
}

enum Lookup {
    Host(String),
    Ip(IpAddr),
}

impl Lookup {
    fn parse(parameters: &str) -> Result<Self, CommandError> {
        let (kind, target) = split_trigger(parameters);
        let target = target.trim_end();
        if kind.eq_ignore_ascii_case("host") {
            if target.is_empty() {
                return Err(CommandError::NeedMoreParams("resolve host <hostname>".into()));
            }
            Ok(Self::Host(target.to_string()))
        } else if kind.eq_ignore_ascii_case("ip") {
            if target.is_empty() {
                return Err(CommandError::NeedMoreParams("resolve ip <address>".into()));
            }
            target
                .parse()
                .map(Self::Ip)
                .map_err(|_| CommandError::InvalidParameter(target.to_string()))
        } else {
            Err(CommandError::NeedMoreParams(SYNTAX.into()))
        }
    }

    async fn run(self, resolver: &TokioResolver) -> String {
        match self {
            Self::Host(name) => match resolver.lookup_ip(name.as_str()).await {
                Ok(lookup) => {
                    let addrs: Vec<String> = lookup.iter().map(|ip| ip.to_string()).collect();
                    if addrs.is_empty() {
                        format!("Unable to resolve {}", name)
                    } else {
                        format!("{} resolves to {}", name, addrs.join(", "))
                    }
                }
                Err(e) => {
                    debug!(host = %name, error = %e, "Forward lookup failed");
                    format!("Unable to resolve {}", name)
                }
            },
            Self::Ip(ip) => match resolver.reverse_lookup(ip).await {
                Ok(lookup) => match lookup.iter().next() {
                    Some(ptr) => {
                        let name = ptr.to_string();
                        format!("{} resolves to {}", ip, name.trim_end_matches('.'))
                    }
                    None => format!("Unable to resolve {}", ip),
                },
                Err(e) => {
                    debug!(%ip, error = %e, "Reverse lookup failed");
                    format!("Unable to resolve {}", ip)
                }
            },
        }
    }
}

#[async_trait]
impl IrcCommand for ResolveCommand {
    fn create(&self, spec: &mut CommandSpec) {
        spec.add_trigger("resolve");
        spec.set_access_level(1);
    }

    async fn trigger(&self, ctx: &CommandContext, parameters: &str) -> CommandResult {
        let lookup = Lookup::parse(parameters)?;
        let resolver = self.resolver.get_or_init(build_resolver).clone();
        let ctx = ctx.clone();
        tokio::spawn(async move {
            let text = lookup.run(&resolver).await;
            ctx.reply(&text);
        });
        Ok(())
    }

    fn help(&self, parameters: &str) -> &str {
        let (topic, _) = split_trigger(parameters);
        if topic.eq_ignore_ascii_case("host") {
            HELP_HOST
        } else if topic.eq_ignore_ascii_case("ip") {
            HELP_IP
        } else {
            HELP
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandRegistry, shared_registry};
    use crate::host::{ChannelInfo, Outbound, RecordingHost};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[test]
    fn test_declared_level() {
        let cmd = Command::new(ResolveCommand::default());
        assert_eq!(cmd.triggers(), ["resolve"]);
        assert_eq!(cmd.access_level(), 1);
    }

    #[test]
    fn test_help_by_topic() {
        let cmd = ResolveCommand::default();
        assert_eq!(cmd.help(""), HELP);
        assert_eq!(cmd.help("HOST"), HELP_HOST);
        assert_eq!(cmd.help(" ip extra"), HELP_IP);
        assert_eq!(cmd.help("dns"), HELP);
    }

    #[test]
    fn test_parse_usage_errors() {
        assert_eq!(
            Lookup::parse("").err(),
            Some(CommandError::NeedMoreParams(SYNTAX.into()))
        );
        assert_eq!(
            Lookup::parse("host").err(),
            Some(CommandError::NeedMoreParams("resolve host <hostname>".into()))
        );
        assert_eq!(
            Lookup::parse("ip   not-an-ip").err(),
            Some(CommandError::InvalidParameter("not-an-ip".into()))
        );
    }

    #[test]
    fn test_parse_targets() {
        assert!(matches!(Lookup::parse("host example.org"), Ok(Lookup::Host(h)) if h == "example.org"));
        assert!(matches!(
            Lookup::parse("IP 192.0.2.1"),
            Ok(Lookup::Ip(ip)) if ip == IpAddr::from([192, 0, 2, 1])
        ));
    }

    #[tokio::test]
    async fn test_lookup_result_arrives_in_channel_later() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let host = Arc::new(RecordingHost::new().with_sink(tx));
        let ctx = CommandContext {
            bot: Arc::from("test"),
            host,
            registry: shared_registry(CommandRegistry::new()),
            channel: ChannelInfo::new("#main", 0),
            nick: "alice".into(),
            caller_level: 1,
        };

        ResolveCommand::default()
            .trigger(&ctx, "ip 127.0.0.1")
            .await
            .expect("lookup starts");

        // Answered from the hosts file, or reported as unresolvable; either
        // way a channel message follows once the spawned task finishes.
        let out = tokio::time::timeout(Duration::from_secs(30), rx.recv())
            .await
            .expect("reply before timeout")
            .expect("sink open");
        let (channel, text) = match out {
            Outbound::Message { channel, text } => (channel, text),
            other => panic!("expected a channel message, got {:?}", other),
        };
        assert_eq!(channel, "#main");
        assert!(text.contains("127.0.0.1"), "unexpected reply {:?}", text);
    }
}
