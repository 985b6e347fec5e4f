//! The uniform member-access protocol.
//!
//! Script code reads, writes, and invokes members on any value through the
//! functions here, without knowing the concrete representation. Resolution
//! is case-insensitive and merges two layers: members added at runtime on a
//! wrapped object (which shadow everything else), then the native members
//! of the underlying value.
//!
//! Reads of absent members are inert and yield null. The null sentinel is
//! asymmetric by design: reading a member of null yields null, but invoking
//! or assigning through null faults.

use opsh_types::{
    display_value, json_to_value, value_to_json, AddedMember, BoundMethod, MemberError,
    MemberKind, MethodFn, ShellObject, Value,
};

/// Read a member. Absent members yield `Null`, never an error.
pub fn get_member(value: &Value, name: &str) -> Result<Value, MemberError> {
    match value {
        Value::Object(object) => {
            if let Some(member) = object.find_added(name) {
                return Ok(match member.kind {
                    MemberKind::Note(v) => v,
                    MemberKind::Method(_) => {
                        Value::Method(BoundMethod::new(value.clone(), member.name))
                    }
                });
            }
            let underlying = object.underlying();
            if matches!(underlying, Value::Null) {
                return Ok(Value::Null);
            }
            get_member(&underlying, name)
        }
        Value::Null => Ok(Value::Null),
        other => Ok(native_get(other, name)),
    }
}

/// Write a member.
///
/// An existing added or native member is overwritten in place; an absent
/// name becomes a new added member on a wrapped object. Assigning through
/// the null sentinel faults with `NullTarget`.
pub fn set_member(value: &Value, name: &str, new_value: Value) -> Result<(), MemberError> {
    match value {
        Value::Object(object) => object.with_cell(|cell| {
            let folded = name.to_lowercase();
            if let Some(existing) = cell.added.iter_mut().find(|m| m.matches(&folded)) {
                *existing = AddedMember::note(existing.name.clone(), new_value);
                return Ok(());
            }
            match &mut cell.underlying {
                Value::Null => Err(MemberError::NullTarget(name.to_string())),
                Value::Record(json) => {
                    if record_set(json, name, &new_value) {
                        Ok(())
                    } else {
                        // No native slot: attach as a new added member.
                        cell.added.push(AddedMember::note(name, new_value));
                        Ok(())
                    }
                }
                other => {
                    if native_property_exists(other, name) {
                        Err(MemberError::ReadOnly(name.to_string()))
                    } else {
                        cell.added.push(AddedMember::note(name, new_value));
                        Ok(())
                    }
                }
            }
        }),
        Value::Null => Err(MemberError::NullTarget(name.to_string())),
        _ => Err(MemberError::ReadOnly(name.to_string())),
    }
}

/// Write into a record map, matching the key case-insensitively. Returns
/// false when the record has no such key (and is a map).
pub fn record_set(json: &mut serde_json::Value, name: &str, new_value: &Value) -> bool {
    let serde_json::Value::Object(map) = json else {
        return false;
    };
    let folded = name.to_lowercase();
    let existing = map.keys().find(|k| k.to_lowercase() == folded).cloned();
    match existing {
        Some(key) => {
            map.insert(key, value_to_json(new_value));
            true
        }
        None => false,
    }
}

/// Invoke a member with positional arguments.
///
/// Resolution order matches `get_member`; a missing member is an error here
/// because invocation contextually requires one. Callee faults are wrapped
/// with the member name and original cause.
pub fn invoke_member(value: &Value, name: &str, args: &[Value]) -> Result<Value, MemberError> {
    match value {
        Value::Object(object) => {
            if let Some(member) = object.find_added(name) {
                return match member.kind {
                    MemberKind::Method(f) => call_added(&member.name, &f, value, args),
                    MemberKind::Note(Value::Method(bound)) => {
                        invoke_member(&bound.target, &bound.name, args)
                    }
                    MemberKind::Note(_) => Err(MemberError::MemberNotFound(name.to_string())),
                };
            }
            let underlying = object.underlying();
            if matches!(underlying, Value::Null) {
                return Err(MemberError::NullInvocation(name.to_string()));
            }
            invoke_member(&underlying, name, args)
        }
        Value::Null => Err(MemberError::NullInvocation(name.to_string())),
        Value::Method(bound) if name.to_lowercase() == "invoke" => {
            invoke_member(&bound.target, &bound.name, args)
        }
        other => native_invoke(other, name, args),
    }
}

fn call_added(
    name: &str,
    f: &MethodFn,
    this: &Value,
    args: &[Value],
) -> Result<Value, MemberError> {
    f.0(this, args).map_err(|cause| MemberError::Invocation {
        member: name.to_string(),
        cause: cause.to_string(),
    })
}

/// Attach a note property, shadowing any same-named native member from this
/// point on.
pub fn add_note_property(object: &ShellObject, name: &str, value: Value) {
    object.insert_added(AddedMember::note(name, value));
}

/// Attach a method member.
pub fn add_method(object: &ShellObject, name: &str, f: MethodFn) {
    object.insert_added(AddedMember::method(name, f));
}

/// Enumerate member names: added members first (insertion order), then the
/// native members of the underlying value.
pub fn members(value: &Value) -> Vec<String> {
    match value {
        Value::Object(object) => {
            let mut names = object.added_names();
            let underlying = object.underlying();
            if !matches!(underlying, Value::Null) {
                for native in members(&underlying) {
                    if !names.iter().any(|n| n.to_lowercase() == native.to_lowercase()) {
                        names.push(native);
                    }
                }
            }
            names
        }
        Value::Null => Vec::new(),
        other => native_members(other),
    }
}

fn native_get(value: &Value, name: &str) -> Value {
    let folded = name.to_lowercase();
    match value {
        Value::Record(serde_json::Value::Object(map)) => map
            .iter()
            .find(|(k, _)| k.to_lowercase() == folded)
            .map(|(_, v)| json_to_value(v))
            .unwrap_or(Value::Null),
        Value::Record(serde_json::Value::Array(items)) => match folded.as_str() {
            "count" | "length" => Value::Int(items.len() as i64),
            _ => Value::Null,
        },
        Value::String(s) => match folded.as_str() {
            "length" => Value::Int(s.chars().count() as i64),
            _ if is_native_method(value, &folded) => {
                Value::Method(BoundMethod::new(value.clone(), name))
            }
            _ => Value::Null,
        },
        _ if is_native_method(value, &folded) => {
            Value::Method(BoundMethod::new(value.clone(), name))
        }
        _ => Value::Null,
    }
}

fn native_property_exists(value: &Value, name: &str) -> bool {
    let folded = name.to_lowercase();
    match value {
        Value::String(_) => folded == "length",
        Value::Record(serde_json::Value::Array(_)) => folded == "count" || folded == "length",
        _ => false,
    }
}

fn is_native_method(value: &Value, folded: &str) -> bool {
    if folded == "gettype" || folded == "tostring" {
        return true;
    }
    matches!(value, Value::String(_))
        && matches!(
            folded,
            "toupper" | "tolower" | "trim" | "contains" | "startswith"
        )
}

fn native_members(value: &Value) -> Vec<String> {
    let mut names: Vec<String> = match value {
        Value::Record(serde_json::Value::Object(map)) => map.keys().cloned().collect(),
        Value::Record(serde_json::Value::Array(_)) => {
            vec!["Count".to_string(), "Length".to_string()]
        }
        Value::String(_) => vec![
            "Length".to_string(),
            "ToUpper".to_string(),
            "ToLower".to_string(),
            "Trim".to_string(),
            "Contains".to_string(),
            "StartsWith".to_string(),
        ],
        _ => Vec::new(),
    };
    names.push("GetType".to_string());
    names.push("ToString".to_string());
    names
}

fn native_invoke(value: &Value, name: &str, args: &[Value]) -> Result<Value, MemberError> {
    let folded = name.to_lowercase();
    match folded.as_str() {
        "gettype" => {
            let (short, full) = type_names(value);
            Ok(Value::Record(serde_json::json!({
                "Name": short,
                "FullName": full,
            })))
        }
        "tostring" => Ok(Value::String(display_value(value))),
        _ => match value {
            Value::String(s) => string_invoke(s, name, &folded, args),
            _ => Err(MemberError::MemberNotFound(name.to_string())),
        },
    }
}

fn string_invoke(s: &str, name: &str, folded: &str, args: &[Value]) -> Result<Value, MemberError> {
    let arity = |expected: usize| -> Result<(), MemberError> {
        if args.len() == expected {
            Ok(())
        } else {
            Err(MemberError::Invocation {
                member: name.to_string(),
                cause: format!("expected {expected} argument(s), got {}", args.len()),
            })
        }
    };
    match folded {
        "toupper" => {
            arity(0)?;
            Ok(Value::String(s.to_uppercase()))
        }
        "tolower" => {
            arity(0)?;
            Ok(Value::String(s.to_lowercase()))
        }
        "trim" => {
            arity(0)?;
            Ok(Value::String(s.trim().to_string()))
        }
        "contains" => {
            arity(1)?;
            Ok(Value::Bool(s.contains(&display_value(&args[0]))))
        }
        "startswith" => {
            arity(1)?;
            Ok(Value::Bool(s.starts_with(&display_value(&args[0]))))
        }
        _ => Err(MemberError::MemberNotFound(name.to_string())),
    }
}

/// Runtime type names of a value, as (short, full).
fn type_names(value: &Value) -> (&'static str, &'static str) {
    match value {
        Value::Null => ("Object", "System.Object"),
        Value::Bool(_) => ("Boolean", "System.Boolean"),
        Value::Int(_) => ("Int64", "System.Int64"),
        Value::Float(_) => ("Double", "System.Double"),
        Value::String(_) => ("String", "System.String"),
        Value::Record(serde_json::Value::Array(_)) => ("Object[]", "System.Object[]"),
        Value::Record(_) => ("Hashtable", "System.Collections.Hashtable"),
        Value::Type(_) => ("RuntimeType", "System.RuntimeType"),
        Value::Object(_) => ("PSObject", "System.Management.Automation.PSObject"),
        Value::Method(_) => ("PSMethod", "System.Management.Automation.PSMethod"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn custom_object() -> Value {
        Value::Object(ShellObject::new(Value::Record(json!({
            "MessageProperty": "foo",
            "MessageField": "bar",
        }))))
    }

    #[test]
    fn set_then_get_any_case_variant() {
        let obj = Value::Object(ShellObject::new(Value::Record(json!({}))));
        set_member(&obj, "Greeting", Value::String("hi".into())).expect("set");
        assert_eq!(
            get_member(&obj, "GREETING").expect("get"),
            Value::String("hi".into())
        );
        assert_eq!(
            get_member(&obj, "greeting").expect("get"),
            Value::String("hi".into())
        );
    }

    #[test]
    fn added_member_shadows_native() {
        let obj = custom_object();
        let Value::Object(handle) = &obj else {
            unreachable!()
        };
        add_note_property(handle, "MessageProperty", Value::String("patched".into()));
        assert_eq!(
            get_member(&obj, "messageproperty").expect("get"),
            Value::String("patched".into())
        );
    }

    #[test]
    fn reference_semantics_through_aliased_handles() {
        let h1 = ShellObject::new(Value::Record(json!({})));
        let h2 = h1.clone();
        set_member(&Value::Object(h2), "K", Value::Int(9)).expect("set");
        assert_eq!(
            get_member(&Value::Object(h1), "k").expect("get"),
            Value::Int(9)
        );
    }

    #[test]
    fn null_read_is_inert() {
        assert_eq!(get_member(&Value::Null, "Foo").expect("get"), Value::Null);
        let wrapped = Value::Object(ShellObject::wrap(Value::Null));
        assert_eq!(get_member(&wrapped, "Foo").expect("get"), Value::Null);
    }

    #[test]
    fn null_invoke_faults() {
        let err = invoke_member(&Value::Null, "Foo", &[]).expect_err("must fault");
        assert_eq!(err, MemberError::NullInvocation("Foo".into()));

        let wrapped = Value::Object(ShellObject::wrap(Value::Null));
        let err = invoke_member(&wrapped, "GetType", &[]).expect_err("must fault");
        assert!(matches!(err, MemberError::NullInvocation(_)));
    }

    #[test]
    fn null_assign_faults() {
        let err = set_member(&Value::Null, "Bar", Value::Int(0)).expect_err("must fault");
        assert_eq!(err, MemberError::NullTarget("Bar".into()));

        let wrapped = Value::Object(ShellObject::wrap(Value::Null));
        let err = set_member(&wrapped, "Bar", Value::Int(0)).expect_err("must fault");
        assert_eq!(err, MemberError::NullTarget("Bar".into()));
    }

    #[test]
    fn set_overwrites_native_record_field_in_place() {
        let obj = custom_object();
        set_member(&obj, "messagefield", Value::String("baz".into())).expect("set");
        assert_eq!(
            get_member(&obj, "MessageField").expect("get"),
            Value::String("baz".into())
        );
        // Overwriting through the native slot must not create a shadow.
        let Value::Object(handle) = &obj else {
            unreachable!()
        };
        assert!(handle.find_added("messagefield").is_none());
    }

    #[test]
    fn invoke_added_method() {
        let handle = ShellObject::new(Value::Record(json!({"a": "x", "b": "y"})));
        add_method(
            &handle,
            "Combine",
            MethodFn::new(|this, _args| {
                let a = get_member(this, "a")?;
                let b = get_member(this, "b")?;
                Ok(Value::String(format!(
                    "{}{}",
                    display_value(&a),
                    display_value(&b)
                )))
            }),
        );
        let obj = Value::Object(handle);
        assert_eq!(
            invoke_member(&obj, "combine", &[]).expect("invoke"),
            Value::String("xy".into())
        );
    }

    #[test]
    fn method_member_read_then_invoked_later() {
        let s = Value::String("abc".into());
        let handle = get_member(&s, "ToUpper").expect("get");
        assert!(matches!(handle, Value::Method(_)));
        assert_eq!(
            invoke_member(&handle, "Invoke", &[]).expect("invoke"),
            Value::String("ABC".into())
        );
    }

    #[test]
    fn gettype_exposes_full_name() {
        let result = invoke_member(&Value::String("x".into()), "GetType", &[]).expect("invoke");
        assert_eq!(
            get_member(&result, "FullName").expect("get"),
            Value::String("System.String".into())
        );
    }

    #[test]
    fn invoking_missing_member_is_an_error() {
        let err = invoke_member(&Value::Int(1), "Frobnicate", &[]).expect_err("must fault");
        assert_eq!(err, MemberError::MemberNotFound("Frobnicate".into()));
    }

    #[test]
    fn callee_faults_are_wrapped() {
        let err = invoke_member(&Value::String("x".into()), "Contains", &[]).expect_err("arity");
        assert!(matches!(err, MemberError::Invocation { ref member, .. } if member == "Contains"));
    }

    #[test]
    fn read_only_native_property_rejects_writes() {
        let obj = Value::Object(ShellObject::new(Value::String("abc".into())));
        let err = set_member(&obj, "Length", Value::Int(5)).expect_err("read-only");
        assert_eq!(err, MemberError::ReadOnly("Length".into()));
    }

    #[test]
    fn dynamic_extension_on_primitive_backed_object() {
        let obj = Value::Object(ShellObject::new(Value::Int(5)));
        set_member(&obj, "note", Value::String("attached".into())).expect("set");
        assert_eq!(
            get_member(&obj, "NOTE").expect("get"),
            Value::String("attached".into())
        );
    }

    #[test]
    fn members_lists_added_before_native() {
        let handle = ShellObject::new(Value::Record(json!({"existing": 1})));
        add_note_property(&handle, "Extra", Value::Null);
        let names = members(&Value::Object(handle));
        assert_eq!(names[0], "Extra");
        assert!(names.iter().any(|n| n == "existing"));
        assert!(names.iter().any(|n| n == "GetType"));
    }

    #[test]
    fn string_length_counts_chars() {
        assert_eq!(
            get_member(&Value::String("héllo".into()), "Length").expect("get"),
            Value::Int(5)
        );
    }
}
