//! Parsing and resolution of textual type references.

use std::sync::{Arc, OnceLock};

use opsh_types::TypeDescriptor;
use regex::Regex;

use crate::error::ShellError;

use super::catalog::{lookup_alias, LibraryRegistry};

/// Matches a pure array-shape bracket run: `[]`, `[,]`, `[,,]`, ...
fn array_shape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[,*\]$").unwrap_or_else(|_| unreachable!()))
}

/// A parsed type reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeReference {
    /// Base identifier, possibly namespace-qualified. For literals that do
    /// not match the array-shape grammar (generic argument lists, malformed
    /// bracket runs) this is the raw text, untouched.
    pub name: String,
    /// Array rank; 0 means scalar.
    pub dimensions: usize,
    /// Generic-typed references are recognized but never resolved.
    pub is_generic: bool,
}

/// Parse a type literal into a reference.
///
/// Accepts the literal with or without its enclosing brackets. Only the
/// pure array shape (`name[]`, `name[,]`, ...) is split; anything else
/// passes through verbatim as the base name and fails later at resolution,
/// not here.
pub fn parse_type_reference(text: &str) -> TypeReference {
    let inner = strip_enclosing_brackets(text);
    let mut name = inner.to_string();
    let mut dimensions = 0;
    if name.ends_with(']') {
        if let Some(begin) = name.find('[') {
            if begin > 0 {
                let brackets = &name[begin..];
                if array_shape().is_match(brackets) {
                    dimensions = brackets.len() - 1;
                    name.truncate(begin);
                }
            }
        }
    }
    let is_generic = dimensions == 0 && name.contains('[');
    TypeReference {
        name,
        dimensions,
        is_generic,
    }
}

fn strip_enclosing_brackets(text: &str) -> &str {
    if text.len() >= 2 && text.starts_with('[') && text.ends_with(']') {
        &text[1..text.len() - 1]
    } else {
        text
    }
}

/// Resolves type references against the alias table and the loaded
/// libraries.
///
/// The search is two-tier: the curated library list is walked in order,
/// trying the exact name and then the name under the configured namespace
/// prefix; only if that fails is every loaded library tried, exact name
/// only. The curated ordering therefore decides which of several same-named
/// types wins.
pub struct TypeResolver {
    registry: Arc<LibraryRegistry>,
    curated: Vec<String>,
    prefix: String,
}

impl TypeResolver {
    pub fn new(registry: Arc<LibraryRegistry>, curated: Vec<String>, prefix: String) -> Self {
        Self {
            registry,
            curated,
            prefix,
        }
    }

    /// Resolve a reference to a concrete descriptor.
    ///
    /// No caching: the registry is consulted fresh on every call so types
    /// loaded mid-session are visible immediately.
    pub fn resolve(&self, reference: &TypeReference) -> Result<TypeDescriptor, ShellError> {
        let scalar = self.resolve_scalar(&reference.name)?;
        if reference.dimensions > 0 {
            Ok(TypeDescriptor::array(scalar, reference.dimensions))
        } else {
            Ok(scalar)
        }
    }

    fn resolve_scalar(&self, name: &str) -> Result<TypeDescriptor, ShellError> {
        if let Some(descriptor) = lookup_alias(name) {
            return Ok(descriptor);
        }

        // Curated pass: exact name, then prefix fallback, per library.
        for library_name in &self.curated {
            let Some(library) = self.registry.get(library_name) else {
                continue;
            };
            if let Some(descriptor) = library.lookup(name) {
                return Ok(descriptor);
            }
            if let Some(descriptor) = library.lookup(&format!("{}{}", self.prefix, name)) {
                return Ok(descriptor);
            }
        }

        // Exhaustive pass over everything loaded, exact name only.
        for library in self.registry.list_loaded() {
            if let Some(descriptor) = library.lookup(name) {
                return Ok(descriptor);
            }
        }

        Err(ShellError::UnknownType(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use rstest::rstest;

    use super::super::catalog::{StaticLibrary, TypeLibrary};
    use super::*;

    fn resolver_with(registry: LibraryRegistry, curated: &[&str]) -> TypeResolver {
        TypeResolver::new(
            Arc::new(registry),
            curated.iter().map(|s| s.to_string()).collect(),
            "System.".to_string(),
        )
    }

    #[rstest]
    #[case("[int]", "int", 0)]
    #[case("[int[]]", "int", 1)]
    #[case("[int[,]]", "int", 2)]
    #[case("[int[,,]]", "int", 3)]
    #[case("string", "string", 0)]
    #[case("string[]", "string", 1)]
    fn parse_array_shapes(#[case] text: &str, #[case] name: &str, #[case] dims: usize) {
        let reference = parse_type_reference(text);
        assert_eq!(reference.name, name);
        assert_eq!(reference.dimensions, dims);
        assert!(!reference.is_generic);
    }

    #[test]
    fn parse_generic_literal_is_left_unsplit() {
        let reference = parse_type_reference("[SomeGeneric[int]]");
        assert_eq!(reference.name, "SomeGeneric[int]");
        assert_eq!(reference.dimensions, 0);
        assert!(reference.is_generic);
    }

    #[test]
    fn parse_malformed_bracket_run_is_left_untouched() {
        let reference = parse_type_reference("[int[x]]");
        assert_eq!(reference.name, "int[x]");
        assert_eq!(reference.dimensions, 0);
    }

    #[test]
    fn alias_resolution_does_not_touch_libraries() {
        let registry = LibraryRegistry::new();
        let consulted = Arc::new(AtomicBool::new(false));
        struct Probe(Arc<AtomicBool>);
        impl TypeLibrary for Probe {
            fn name(&self) -> &str {
                "probe"
            }
            fn lookup(&self, _: &str) -> Option<TypeDescriptor> {
                self.0.store(true, Ordering::SeqCst);
                Some(TypeDescriptor::scalar("Wrong.String"))
            }
        }
        registry.load(Probe(consulted.clone()));
        let resolver = resolver_with(registry, &["probe"]);

        let descriptor = resolver
            .resolve(&parse_type_reference("[string]"))
            .expect("resolve");
        assert_eq!(descriptor, TypeDescriptor::scalar("System.String"));
        assert!(!consulted.load(Ordering::SeqCst));
    }

    #[test]
    fn curated_prefix_fallback_finds_namespaced_type() {
        let registry = LibraryRegistry::with_defaults();
        let resolver = resolver_with(registry, &["corlib", "system.extra"]);

        let descriptor = resolver
            .resolve(&parse_type_reference("[datetime]"))
            .expect("resolve");
        assert_eq!(descriptor, TypeDescriptor::scalar("System.DateTime"));
    }

    #[test]
    fn curated_pass_wins_over_exhaustive_pass() {
        let registry = LibraryRegistry::new();
        // "beta" loads first but is not curated; "alpha" is curated. The
        // canonical casing each library returns shows which one answered.
        registry.load(StaticLibrary::new("beta", &["WIDGET"]));
        registry.load(StaticLibrary::new("alpha", &["Widget"]));
        let resolver = resolver_with(registry, &["alpha"]);

        let descriptor = resolver
            .resolve(&parse_type_reference("[widget]"))
            .expect("resolve");
        assert_eq!(descriptor, TypeDescriptor::scalar("Widget"));
    }

    #[test]
    fn curated_order_decides_between_same_named_types() {
        let registry = LibraryRegistry::new();
        registry.load(StaticLibrary::new("first", &["Acme.Widget"]));
        registry.load(StaticLibrary::new("second", &["ACME.WIDGET"]));
        let resolver = TypeResolver::new(
            Arc::new(registry),
            vec!["second".to_string(), "first".to_string()],
            "Acme.".to_string(),
        );

        // Exact lookups fail; the prefix fallback hits "second" first and
        // its canonical casing proves which library answered.
        let descriptor = resolver
            .resolve(&parse_type_reference("[widget]"))
            .expect("resolve");
        assert_eq!(descriptor, TypeDescriptor::scalar("ACME.WIDGET"));
    }

    #[test]
    fn exhaustive_pass_reaches_non_curated_libraries() {
        let registry = LibraryRegistry::new();
        registry.load(StaticLibrary::new("plugin", &["Plugin.Type"]));
        let resolver = resolver_with(registry, &["corlib"]);

        let descriptor = resolver
            .resolve(&parse_type_reference("[Plugin.Type]"))
            .expect("resolve");
        assert_eq!(descriptor, TypeDescriptor::scalar("Plugin.Type"));
    }

    #[test]
    fn unresolved_name_is_unknown_type() {
        let resolver = resolver_with(LibraryRegistry::with_defaults(), &["corlib"]);
        let err = resolver
            .resolve(&parse_type_reference("[No.Such.Type]"))
            .expect_err("must fail");
        assert_eq!(err, ShellError::UnknownType("No.Such.Type".into()));
    }

    #[test]
    fn array_reference_wraps_resolved_scalar() {
        let resolver = resolver_with(LibraryRegistry::with_defaults(), &["corlib"]);
        let descriptor = resolver
            .resolve(&parse_type_reference("[int[,]]"))
            .expect("resolve");
        assert_eq!(descriptor.full_name(), "System.Int32[,]");
    }

    #[test]
    fn resolution_sees_libraries_loaded_after_construction() {
        let registry = Arc::new(LibraryRegistry::new());
        let resolver = TypeResolver::new(registry.clone(), Vec::new(), "System.".into());

        let reference = parse_type_reference("[Late.Type]");
        assert!(resolver.resolve(&reference).is_err());

        registry.load(StaticLibrary::new("late", &["Late.Type"]));
        assert_eq!(
            resolver.resolve(&reference).expect("resolve"),
            TypeDescriptor::scalar("Late.Type")
        );
    }
}
