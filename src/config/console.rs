//! Console harness host description.
//!
//! The binary has no IRC connection; it stands in for one with a fixed
//! channel list and access table read from `[console]`.

use crate::access::{AccessLevel, ChannelType};
use crate::host::RecordingHost;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub channels: Vec<ConsoleChannel>,
    #[serde(default)]
    pub access: Vec<ConsoleAccess>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleChannel {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: ChannelType,
}

/// Access level of `nick` in `channel`. Unlisted users have level 0.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleAccess {
    pub channel: String,
    pub nick: String,
    pub level: AccessLevel,
}

impl ConsoleConfig {
    /// Build an in-memory host from this description.
    pub fn build_host(&self) -> RecordingHost {
        let host = self
            .channels
            .iter()
            .fold(RecordingHost::new(), |host, c| host.with_channel(&c.name, c.kind));
        self.access
            .iter()
            .fold(host, |host, a| host.with_access(&a.channel, &a.nick, a.level))
    }
}
