//! chanbot - console harness.
//!
//! Stands in for an IRC connection: reads `<channel> <nick> <message>` lines
//! from stdin, dispatches each one to every configured bot and prints what
//! the bots send back. `/rehash` reloads the configuration file.

use anyhow::Context;
use chanbot::config::{self, Config};
use chanbot::dispatch::split_trigger;
use chanbot::host::{Outbound, RecordingHost};
use chanbot::{Bot, PluginHandle, PluginManager, builtin_plugins};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// A bot plus the console host it talks through.
struct ConsoleBot {
    bot: Bot,
    host: Arc<RecordingHost>,
}

fn load_config(path: &str) -> anyhow::Result<Config> {
    let config = Config::load(path).with_context(|| format!("loading {}", path))?;
    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(path = %path, error = %e, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s) in {}", errors.len(), path);
    }
    Ok(config)
}

fn spawn_printer(bot: String, mut rx: mpsc::UnboundedReceiver<Outbound>) {
    tokio::spawn(async move {
        while let Some(out) = rx.recv().await {
            match out {
                Outbound::Message { channel, text } => println!("[{}] {} <- {}", bot, channel, text),
                Outbound::Notice { nick, text } => println!("[{}] notice {} <- {}", bot, nick, text),
            }
        }
    });
}

fn start_bots(config: &Config, manager: &PluginManager) -> anyhow::Result<Vec<ConsoleBot>> {
    let mut bots = Vec::with_capacity(config.bots.len());
    for section in &config.bots {
        let (tx, rx) = mpsc::unbounded_channel();
        let host = Arc::new(config.console.build_host().with_sink(tx));
        spawn_printer(section.name.clone(), rx);
        let bot = Bot::from_config(section, config, host.clone(), manager)
            .with_context(|| format!("starting bot '{}'", section.name))?;
        bots.push(ConsoleBot { bot, host });
    }
    Ok(bots)
}

/// Split a console line into channel, nick and message. Any run of
/// whitespace separates the first two fields.
fn parse_line(line: &str) -> Option<(&str, &str, &str)> {
    let (channel, rest) = split_trigger(line);
    let (nick, message) = split_trigger(rest);
    if channel.is_empty() || nick.is_empty() || message.is_empty() {
        return None;
    }
    Some((channel, nick, message))
}

async fn dispatch(bots: &[ConsoleBot], line: &str) {
    let Some((channel, nick, message)) = parse_line(line) else {
        warn!(line = %line, "Expected: <channel> <nick> <message>");
        return;
    };

    for entry in bots {
        let outcome = entry.bot.handle_chat(channel, nick, message).await;
        debug!(bot = %entry.bot.name(), outcome = outcome.label(), "Line handled");
        // Output is printed from the sink; drop the recorded copy.
        entry.host.take_sent();
    }
}

fn rehash(bots: &[ConsoleBot], path: &str) {
    let config = match load_config(path) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Rehash failed; keeping current configuration");
            return;
        }
    };
    for entry in bots {
        if let Err(e) = entry.bot.rehash(&config) {
            error!(bot = %entry.bot.name(), error = %e, "Rehash failed");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(config::default_config_path);
    let config = load_config(&config_path)?;

    let manager = PluginManager::new();
    let _plugins: Vec<PluginHandle> = builtin_plugins()
        .iter()
        .map(|p| manager.load(p.as_ref()))
        .collect();

    let bots = start_bots(&config, &manager)?;
    info!(
        path = %config_path,
        bots = bots.len(),
        commands = manager.len(),
        "Starting chanbot console"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line.context("reading stdin")? {
                    Some(line) if line.trim().eq_ignore_ascii_case("/rehash") => {
                        rehash(&bots, &config_path);
                    }
                    Some(line) if line.trim().is_empty() => {}
                    Some(line) => dispatch(&bots, &line).await,
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    info!("Shutting down");
    Ok(())
}
