//! Plugin manager and built-in plugins.
//!
//! Plugins contribute command prototypes. The manager keeps the prototypes
//! and the registries of every attached bot; each bot receives its own copy
//! of each prototype. Registration returns a handle, and dropping the handle
//! removes the prototype and all of its copies.

pub mod basic;
pub mod eightball;
pub mod resolve;

use crate::command::{Command, CommandId, CommandRegistry, SharedRegistry};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, info};

/// A loadable set of commands.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    /// Fresh command prototypes to register.
    fn commands(&self) -> Vec<Command>;
}

/// The plugins compiled into this crate.
pub fn builtin_plugins() -> Vec<Box<dyn Plugin>> {
    vec![
        Box::new(basic::BasicPlugin),
        Box::new(resolve::ResolvePlugin),
        Box::new(eightball::EightBallPlugin),
    ]
}

#[derive(Default)]
struct ManagerState {
    next_id: CommandId,
    prototypes: Vec<Command>,
    registries: Vec<Weak<RwLock<CommandRegistry>>>,
}

impl ManagerState {
    /// Live registries; dead ones are dropped along the way.
    fn live_registries(&mut self) -> Vec<SharedRegistry> {
        self.registries.retain(|r| r.strong_count() > 0);
        self.registries.iter().filter_map(Weak::upgrade).collect()
    }
}

/// Shared handle to the set of registered command prototypes.
///
/// Lock order: manager state, then any registry. Dispatch only ever takes a
/// registry lock, so it never waits on the manager.
#[derive(Clone, Default)]
pub struct PluginManager {
    state: Arc<Mutex<ManagerState>>,
}

impl PluginManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a prototype and copy it into every attached registry.
    #[must_use = "dropping the handle deregisters the command"]
    pub fn register(&self, mut command: Command) -> CommandHandle {
        let mut state = self.state.lock();
        state.next_id += 1;
        let id = state.next_id;
        command.set_origin(id);

        for registry in state.live_registries() {
            registry.write().add(command.clone());
        }
        debug!(id, trigger = %command.primary_trigger(), "Command registered");
        state.prototypes.push(command);

        CommandHandle {
            id,
            state: Arc::downgrade(&self.state),
        }
    }

    /// Register every command of `plugin`.
    #[must_use = "dropping the handle unloads the plugin"]
    pub fn load(&self, plugin: &dyn Plugin) -> PluginHandle {
        let commands: Vec<CommandHandle> = plugin
            .commands()
            .into_iter()
            .map(|c| self.register(c))
            .collect();
        info!(plugin = %plugin.name(), commands = commands.len(), "Plugin loaded");
        PluginHandle {
            name: plugin.name().to_string(),
            commands,
        }
    }

    /// Fill `registry` with copies of every prototype and keep it updated
    /// as commands come and go.
    pub fn attach(&self, registry: &SharedRegistry) {
        let mut state = self.state.lock();
        {
            let mut target = registry.write();
            for prototype in &state.prototypes {
                target.add(prototype.clone());
            }
        }
        state.registries.retain(|r| r.strong_count() > 0);
        state.registries.push(Arc::downgrade(registry));
    }

    /// Snapshot of the registered prototypes, in registration order.
    pub fn commands(&self) -> Vec<Command> {
        self.state.lock().prototypes.clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().prototypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("PluginManager")
            .field("prototypes", &state.prototypes.len())
            .field("registries", &state.registries.len())
            .finish()
    }
}

fn deregister(state: &Mutex<ManagerState>, id: CommandId) {
    let mut state = state.lock();
    state.prototypes.retain(|c| c.origin() != Some(id));
    let removed: usize = state
        .live_registries()
        .iter()
        .map(|registry| registry.write().remove_origin(id))
        .sum();
    debug!(id, copies = removed, "Command deregistered");
}

/// Keeps one registered command alive.
#[derive(Debug)]
pub struct CommandHandle {
    id: CommandId,
    state: Weak<Mutex<ManagerState>>,
}

impl CommandHandle {
    pub fn id(&self) -> CommandId {
        self.id
    }
}

impl Drop for CommandHandle {
    fn drop(&mut self) {
        if let Some(state) = self.state.upgrade() {
            deregister(&state, self.id);
        }
    }
}

/// Keeps every command of one loaded plugin alive.
#[derive(Debug)]
pub struct PluginHandle {
    name: String,
    commands: Vec<CommandHandle>,
}

impl PluginHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Drop for PluginHandle {
    fn drop(&mut self) {
        info!(plugin = %self.name, "Plugin unloaded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::testing::echo;
    use crate::command::shared_registry;

    struct Pair;

    impl Plugin for Pair {
        fn name(&self) -> &str {
            "pair"
        }

        fn commands(&self) -> Vec<Command> {
            vec![echo(&["first"], 0), echo(&["second"], 1)]
        }
    }

    fn triggers(registry: &SharedRegistry) -> Vec<String> {
        registry
            .read()
            .iter()
            .map(|c| c.primary_trigger().to_string())
            .collect()
    }

    #[test]
    fn test_attach_copies_existing_prototypes() {
        let manager = PluginManager::new();
        let _plugin = manager.load(&Pair);
        let registry = shared_registry(CommandRegistry::new());
        manager.attach(&registry);
        assert_eq!(triggers(&registry), ["first", "second"]);
    }

    #[test]
    fn test_register_reaches_attached_registries() {
        let manager = PluginManager::new();
        let a = shared_registry(CommandRegistry::new());
        let b = shared_registry(CommandRegistry::new());
        manager.attach(&a);
        manager.attach(&b);

        let _late = manager.register(echo(&["late"], 0));
        assert_eq!(triggers(&a), ["late"]);
        assert_eq!(triggers(&b), ["late"]);
    }

    #[test]
    fn test_drop_handle_removes_prototype_and_copies() {
        let manager = PluginManager::new();
        let registry = shared_registry(CommandRegistry::new());
        manager.attach(&registry);

        let plugin = manager.load(&Pair);
        let keep = manager.register(echo(&["keep"], 0));
        assert_eq!(plugin.len(), 2);
        assert_eq!(manager.len(), 3);

        drop(plugin);
        assert_eq!(manager.len(), 1);
        assert_eq!(triggers(&registry), ["keep"]);

        drop(keep);
        assert!(manager.is_empty());
        assert!(registry.read().is_empty());
    }

    #[test]
    fn test_bot_copies_are_independent() {
        let manager = PluginManager::new();
        let _plugin = manager.load(&Pair);
        let a = shared_registry(CommandRegistry::new());
        let b = shared_registry(CommandRegistry::new());
        manager.attach(&a);
        manager.attach(&b);

        a.write()
            .find_mut("first")
            .expect("first copied")
            .access_mut()
            .set_level(9);
        assert_eq!(b.read().find("first").map(|c| c.access_level()), Some(0));
        assert_eq!(manager.commands()[0].access_level(), 0);
    }

    #[test]
    fn test_dropped_registry_is_forgotten() {
        let manager = PluginManager::new();
        let registry = shared_registry(CommandRegistry::new());
        manager.attach(&registry);
        drop(registry);
        let handle = manager.register(echo(&["x"], 0));
        drop(handle);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_handle_outliving_manager_is_harmless() {
        let manager = PluginManager::new();
        let handle = manager.register(echo(&["x"], 0));
        drop(manager);
        drop(handle);
    }

    #[test]
    fn test_builtin_plugins_register() {
        let manager = PluginManager::new();
        let handles: Vec<PluginHandle> = builtin_plugins()
            .iter()
            .map(|p| manager.load(p.as_ref()))
            .collect();
        assert_eq!(handles.len(), 3);
        let registry = shared_registry(CommandRegistry::new());
        manager.attach(&registry);
        let registry = registry.read();
        for trigger in ["help", "version", "versioninfo", "resolve", "8ball"] {
            assert!(registry.find(trigger).is_some(), "missing {}", trigger);
        }
    }
}
