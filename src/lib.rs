//! chanbot - IRC bot command dispatch and access control.
//!
//! A [`Bot`] owns one registry of configured [`Command`]s and turns inbound
//! chat lines into command invocations, checking per-channel access levels
//! along the way. Commands come from plugins through a shared
//! [`PluginManager`]; the IRC connection itself is abstracted behind
//! [`IrcHost`].

pub mod access;
pub mod bot;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod plugins;

pub use access::{AccessLevel, AccessOverride, AccessTable, ChannelType, OverrideTarget};
pub use bot::Bot;
pub use command::{
    Command, CommandContext, CommandRegistry, CommandSpec, IrcCommand, SharedRegistry,
    shared_registry,
};
pub use config::Config;
pub use dispatch::{DispatchOutcome, IgnoreReason};
pub use error::{CommandError, CommandResult};
pub use host::{ChannelInfo, IrcHost, Outbound, RecordingHost};
pub use plugins::{CommandHandle, Plugin, PluginHandle, PluginManager, builtin_plugins};
