//! The shared-handle object wrapper.
//!
//! A `ShellObject` is the uniform handle through which script code accesses
//! any value's members. The handle is reference counted: cloning it aliases
//! the same cell, so two handles observe each other's mutations. Members
//! added at runtime live on the cell, ordered by insertion, and are matched
//! case-insensitively.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::MemberError;
use crate::value::Value;

/// Signature of a runtime-attached method. Receives the value it was looked
/// up on and the positional arguments.
#[derive(Clone)]
pub struct MethodFn(
    pub Arc<dyn Fn(&Value, &[Value]) -> Result<Value, MemberError> + Send + Sync>,
);

impl MethodFn {
    /// Wrap a closure as an attachable method.
    pub fn new(
        f: impl Fn(&Value, &[Value]) -> Result<Value, MemberError> + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(f))
    }
}

impl fmt::Debug for MethodFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MethodFn")
    }
}

/// Kinds of members attachable at runtime.
#[derive(Debug, Clone)]
pub enum MemberKind {
    /// A plain data member.
    Note(Value),
    /// An invocable member.
    Method(MethodFn),
}

/// One runtime-attached member.
#[derive(Debug, Clone)]
pub struct AddedMember {
    /// The name as given at attachment time.
    pub name: String,
    /// Case-folded name used for lookup.
    folded: String,
    pub kind: MemberKind,
}

impl AddedMember {
    /// A note property member.
    pub fn note(name: impl Into<String>, value: Value) -> Self {
        let name = name.into();
        Self {
            folded: name.to_lowercase(),
            name,
            kind: MemberKind::Note(value),
        }
    }

    /// A method member.
    pub fn method(name: impl Into<String>, f: MethodFn) -> Self {
        let name = name.into();
        Self {
            folded: name.to_lowercase(),
            name,
            kind: MemberKind::Method(f),
        }
    }

    /// Whether this member answers to `name` (case-insensitive).
    pub fn matches(&self, name: &str) -> bool {
        self.folded == name.to_lowercase()
    }
}

/// The shared cell behind an object handle.
#[derive(Debug)]
pub struct ObjectCell {
    pub underlying: Value,
    /// Insertion-ordered; lookup is case-insensitive over `folded` names.
    pub added: Vec<AddedMember>,
}

/// A script-visible object: one shared cell, any number of aliasing handles.
#[derive(Debug, Clone)]
pub struct ShellObject {
    cell: Arc<Mutex<ObjectCell>>,
}

impl ShellObject {
    /// Create a fresh object around an underlying value.
    pub fn new(underlying: Value) -> Self {
        Self {
            cell: Arc::new(Mutex::new(ObjectCell {
                underlying,
                added: Vec::new(),
            })),
        }
    }

    /// Wrap a value. An already-wrapped value is returned unchanged: this
    /// aliases, it never copies.
    pub fn wrap(value: Value) -> ShellObject {
        match value {
            Value::Object(object) => object,
            other => ShellObject::new(other),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ObjectCell> {
        self.cell.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a closure with mutable access to the cell.
    pub fn with_cell<R>(&self, f: impl FnOnce(&mut ObjectCell) -> R) -> R {
        f(&mut self.lock())
    }

    /// Clone of the underlying value.
    pub fn underlying(&self) -> Value {
        self.lock().underlying.clone()
    }

    /// True when the wrapper is backed by the null sentinel.
    pub fn is_null_backed(&self) -> bool {
        matches!(self.lock().underlying, Value::Null)
    }

    /// Look up an added member by case-insensitive name.
    pub fn find_added(&self, name: &str) -> Option<AddedMember> {
        let folded = name.to_lowercase();
        self.lock()
            .added
            .iter()
            .find(|m| m.folded == folded)
            .cloned()
    }

    /// Attach or overwrite an added member. Overwriting keeps the member's
    /// original position in the enumeration order.
    pub fn insert_added(&self, member: AddedMember) {
        let mut cell = self.lock();
        if let Some(existing) = cell.added.iter_mut().find(|m| m.folded == member.folded) {
            *existing = member;
        } else {
            cell.added.push(member);
        }
    }

    /// Names of all added members, in insertion order.
    pub fn added_names(&self) -> Vec<String> {
        self.lock().added.iter().map(|m| m.name.clone()).collect()
    }

    /// Added note properties as (name, value) pairs, in insertion order.
    pub fn added_notes(&self) -> Vec<(String, Value)> {
        self.lock()
            .added
            .iter()
            .filter_map(|m| match &m.kind {
                MemberKind::Note(v) => Some((m.name.clone(), v.clone())),
                MemberKind::Method(_) => None,
            })
            .collect()
    }

    /// Whether two handles refer to the same cell.
    pub fn same_instance(&self, other: &ShellObject) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_aliases_same_cell() {
        let a = ShellObject::new(Value::Null);
        let b = a.clone();
        b.insert_added(AddedMember::note("K", Value::Int(1)));
        assert!(a.same_instance(&b));
        assert!(matches!(
            a.find_added("k"),
            Some(AddedMember {
                kind: MemberKind::Note(Value::Int(1)),
                ..
            })
        ));
    }

    #[test]
    fn wrap_does_not_double_wrap() {
        let a = ShellObject::new(Value::Int(5));
        let rewrapped = ShellObject::wrap(Value::Object(a.clone()));
        assert!(a.same_instance(&rewrapped));
    }

    #[test]
    fn added_lookup_is_case_insensitive() {
        let obj = ShellObject::new(Value::Null);
        obj.insert_added(AddedMember::note("TestName", Value::String("v".into())));
        assert!(obj.find_added("TESTNAME").is_some());
        assert!(obj.find_added("testname").is_some());
        assert!(obj.find_added("other").is_none());
    }

    #[test]
    fn overwrite_keeps_enumeration_order() {
        let obj = ShellObject::new(Value::Null);
        obj.insert_added(AddedMember::note("a", Value::Int(1)));
        obj.insert_added(AddedMember::note("b", Value::Int(2)));
        obj.insert_added(AddedMember::note("A", Value::Int(3)));
        assert_eq!(obj.added_names(), vec!["A".to_string(), "b".to_string()]);
    }
}
