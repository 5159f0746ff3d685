//! Interface to the IRC engine that owns the actual connection.
//!
//! The engine tracks channels and users and writes to the wire; this crate
//! only asks it questions (channel type, a user's access level) and hands it
//! outgoing text. Sends are fire-and-forget from the dispatcher's side.

use crate::access::{AccessLevel, ChannelType};
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::mpsc;

/// A channel as seen by the IRC engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub name: String,
    pub kind: ChannelType,
}

impl ChannelInfo {
    pub fn new(name: impl Into<String>, kind: ChannelType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Operations the bot core needs from the IRC engine.
pub trait IrcHost: Send + Sync {
    /// Look up a channel the bot is in. `None` if unknown.
    fn channel(&self, name: &str) -> Option<ChannelInfo>;

    /// The access level of `nick` in `channel`.
    fn access_level(&self, channel: &str, nick: &str) -> AccessLevel;

    /// Send a message to a channel.
    fn send_message(&self, channel: &str, text: &str);

    /// Send a private notice to a user.
    fn send_notice(&self, nick: &str, text: &str);
}

/// One piece of outgoing traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Message { channel: String, text: String },
    Notice { nick: String, text: String },
}

impl Outbound {
    pub fn text(&self) -> &str {
        match self {
            Self::Message { text, .. } | Self::Notice { text, .. } => text,
        }
    }
}

/// In-memory host with a fixed channel list and access table.
///
/// Outgoing traffic is recorded and, when a sink is attached, forwarded to
/// an unbounded channel. Used by the console harness and by tests.
#[derive(Default)]
pub struct RecordingHost {
    channels: Vec<ChannelInfo>,
    /// (lowercased channel, lowercased nick) -> level
    access: HashMap<(String, String), AccessLevel>,
    sent: Mutex<Vec<Outbound>>,
    sink: Option<mpsc::UnboundedSender<Outbound>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward every send to `sink` in addition to recording it.
    pub fn with_sink(mut self, sink: mpsc::UnboundedSender<Outbound>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_channel(mut self, name: &str, kind: ChannelType) -> Self {
        self.channels.retain(|c| !c.name.eq_ignore_ascii_case(name));
        self.channels.push(ChannelInfo::new(name, kind));
        self
    }

    pub fn with_access(mut self, channel: &str, nick: &str, level: AccessLevel) -> Self {
        self.access.insert(
            (channel.to_ascii_lowercase(), nick.to_ascii_lowercase()),
            level,
        );
        self
    }

    /// Drain everything recorded so far.
    pub fn take_sent(&self) -> Vec<Outbound> {
        std::mem::take(&mut *self.sent.lock())
    }

    fn record(&self, out: Outbound) {
        if let Some(sink) = &self.sink {
            // The receiver going away only means nobody is watching any more.
            let _ = sink.send(out.clone());
        }
        self.sent.lock().push(out);
    }
}

impl IrcHost for RecordingHost {
    fn channel(&self, name: &str) -> Option<ChannelInfo> {
        self.channels
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    fn access_level(&self, channel: &str, nick: &str) -> AccessLevel {
        self.access
            .get(&(channel.to_ascii_lowercase(), nick.to_ascii_lowercase()))
            .copied()
            .unwrap_or(0)
    }

    fn send_message(&self, channel: &str, text: &str) {
        self.record(Outbound::Message {
            channel: channel.to_string(),
            text: text.to_string(),
        });
    }

    fn send_notice(&self, nick: &str, text: &str) {
        self.record(Outbound::Notice {
            nick: nick.to_string(),
            text: text.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_lookup_is_case_insensitive() {
        let host = RecordingHost::new().with_channel("#Ops", 1);
        assert_eq!(host.channel("#ops"), Some(ChannelInfo::new("#Ops", 1)));
        assert!(host.channel("#other").is_none());
    }

    #[test]
    fn test_access_defaults_to_zero() {
        let host = RecordingHost::new().with_access("#ops", "Alice", 4);
        assert_eq!(host.access_level("#OPS", "alice"), 4);
        assert_eq!(host.access_level("#ops", "bob"), 0);
    }

    #[test]
    fn test_sends_are_recorded_and_forwarded() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let host = RecordingHost::new().with_sink(tx);
        host.send_message("#ops", "hi");
        host.send_notice("alice", "psst");

        let sent = host.take_sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].text(), "psst");
        assert!(host.take_sent().is_empty());
        assert!(matches!(rx.try_recv(), Ok(Outbound::Message { .. })));
    }
}
