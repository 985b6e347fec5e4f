//! Type-name resolution.
//!
//! A textual type reference (`[int]`, `[string[]]`) is parsed into a
//! `TypeReference`, then resolved against a layered namespace: the built-in
//! alias table first, then a curated list of type libraries with a namespace
//! prefix fallback, then an exhaustive pass over every loaded library.
//!
//! Resolution is never cached: a library loaded between two calls is
//! visible on the next call.

mod catalog;
mod resolver;

pub use catalog::{lookup_alias, LibraryRegistry, StaticLibrary, TypeLibrary};
pub use resolver::{parse_type_reference, TypeReference, TypeResolver};
