//! Variable scope.
//!
//! Variable names are matched case-insensitively. Pipelines always run at
//! the caller's scope — there are no child frames — so prompt and profile
//! side effects stay visible.

use std::collections::HashMap;

use opsh_types::Value;

/// Case-insensitive variable bindings.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    vars: HashMap<String, Value>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable.
    pub fn set(&mut self, name: impl AsRef<str>, value: Value) {
        self.vars.insert(name.as_ref().to_lowercase(), value);
    }

    /// Get a variable by any-case name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(&name.to_lowercase())
    }

    /// Remove a variable; returns the removed value if it existed.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.vars.remove(&name.to_lowercase())
    }

    /// Whether a variable exists.
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(&name.to_lowercase())
    }

    /// All variable names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.vars.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}
