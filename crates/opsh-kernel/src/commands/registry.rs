//! Command registry with case-insensitive lookup.

use std::collections::HashMap;
use std::sync::Arc;

use super::traits::Command;

/// Registered commands, keyed by case-folded name.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Arc<dyn Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command under its own name.
    pub fn register(&mut self, command: impl Command + 'static) {
        self.commands
            .insert(command.name().to_lowercase(), Arc::new(command));
    }

    /// Look up a command by any-case name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.commands.get(&name.to_lowercase()).cloned()
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}
