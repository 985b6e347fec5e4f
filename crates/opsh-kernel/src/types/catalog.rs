//! The alias table and the loaded-library registry.

use std::sync::{Arc, PoisonError, RwLock};

use opsh_types::TypeDescriptor;

/// Built-in type aliases, matched case-insensitively.
///
/// These short names resolve directly to a descriptor without touching the
/// library search path.
const ALIASES: &[(&str, &str)] = &[
    ("int", "System.Int32"),
    ("long", "System.Int64"),
    ("string", "System.String"),
    ("char", "System.Char"),
    ("bool", "System.Boolean"),
    ("byte", "System.Byte"),
    ("double", "System.Double"),
    ("decimal", "System.Decimal"),
    ("float", "System.Single"),
    ("single", "System.Single"),
    ("regex", "System.Text.RegularExpressions.Regex"),
    ("array", "System.Array"),
    ("xml", "System.Xml.XmlDocument"),
    ("scriptblock", "System.Management.Automation.ScriptBlock"),
    ("switch", "System.Management.Automation.SwitchParameter"),
    ("hashtable", "System.Collections.Hashtable"),
    ("type", "System.Type"),
    ("ipaddress", "System.Net.IPAddress"),
    ("psobject", "System.Management.Automation.PSObject"),
];

/// Look up a built-in alias.
pub fn lookup_alias(name: &str) -> Option<TypeDescriptor> {
    let folded = name.to_lowercase();
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == folded)
        .map(|(_, full)| TypeDescriptor::scalar(*full))
}

/// A source of named types.
pub trait TypeLibrary: Send + Sync {
    /// Identifier used by the curated search order.
    fn name(&self) -> &str;

    /// Case-insensitive lookup by fully qualified name.
    fn lookup(&self, full_name: &str) -> Option<TypeDescriptor>;
}

/// A library backed by a fixed list of type names.
pub struct StaticLibrary {
    name: String,
    types: Vec<String>,
}

impl StaticLibrary {
    pub fn new(name: impl Into<String>, types: &[&str]) -> Self {
        Self {
            name: name.into(),
            types: types.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl TypeLibrary for StaticLibrary {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookup(&self, full_name: &str) -> Option<TypeDescriptor> {
        let folded = full_name.to_lowercase();
        self.types
            .iter()
            .find(|t| t.to_lowercase() == folded)
            .map(TypeDescriptor::scalar)
    }
}

/// The ordered set of currently loaded type libraries.
///
/// Externally mutable between resolver calls; resolvers read it fresh every
/// time instead of caching results.
pub struct LibraryRegistry {
    libraries: RwLock<Vec<Arc<dyn TypeLibrary>>>,
}

impl LibraryRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            libraries: RwLock::new(Vec::new()),
        }
    }

    /// A registry preloaded with the built-in core libraries.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.load(StaticLibrary::new(
            "corlib",
            &[
                "System.Object",
                "System.String",
                "System.Char",
                "System.Boolean",
                "System.Byte",
                "System.Int32",
                "System.Int64",
                "System.Double",
                "System.Single",
                "System.Decimal",
                "System.Array",
                "System.Type",
                "System.DateTime",
                "System.TimeSpan",
                "System.Guid",
                "System.Collections.Hashtable",
                "System.Collections.ArrayList",
            ],
        ));
        registry.load(StaticLibrary::new(
            "system.extra",
            &[
                "System.Text.RegularExpressions.Regex",
                "System.Text.StringBuilder",
                "System.Net.IPAddress",
                "System.Uri",
                "System.Xml.XmlDocument",
                "System.Management.Automation.PSObject",
                "System.Management.Automation.ScriptBlock",
                "System.Management.Automation.SwitchParameter",
            ],
        ));
        registry
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Arc<dyn TypeLibrary>>> {
        self.libraries.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load a library at the end of the search order.
    pub fn load(&self, library: impl TypeLibrary + 'static) {
        self.libraries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(library));
    }

    /// Find a loaded library by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn TypeLibrary>> {
        self.read().iter().find(|l| l.name() == name).cloned()
    }

    /// All loaded libraries, in load order.
    pub fn list_loaded(&self) -> Vec<Arc<dyn TypeLibrary>> {
        self.read().clone()
    }
}

impl Default for LibraryRegistry {
    fn default() -> Self {
        Self::new()
    }
}
