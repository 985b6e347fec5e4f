//! new-object — Construct a fresh wrapped object.

use async_trait::async_trait;

use opsh_types::{ShellObject, Value};

use crate::commands::{Command, CommandArgs, CommandSchema, ExecContext, ParamSchema};
use crate::error::ShellError;

/// Creates a custom object. Only the custom-object type is supported here;
/// `-property` seeds it with a hashtable of initial members.
pub struct NewObject;

#[async_trait]
impl Command for NewObject {
    fn name(&self) -> &str {
        "new-object"
    }

    fn schema(&self) -> CommandSchema {
        CommandSchema::new("new-object", "Create a wrapped object")
            .param(ParamSchema::new("type", "string", "Type of object to create"))
            .param(ParamSchema::new(
                "property",
                "record",
                "Hashtable of initial properties",
            ))
    }

    async fn run(
        &self,
        args: CommandArgs,
        _input: Vec<Value>,
        _ctx: &mut ExecContext,
    ) -> Result<Vec<Value>, ShellError> {
        let type_name = args
            .get_string("type", 0)
            .ok_or_else(|| ShellError::InvalidArgument("new-object: a type name is required".into()))?;
        let folded = type_name.to_lowercase();
        if folded != "psobject" && folded != "pscustomobject" {
            return Err(ShellError::InvalidArgument(format!(
                "new-object: cannot create an instance of '{type_name}'; only psobject is supported"
            )));
        }

        let underlying = match args.get_named("property") {
            Some(Value::Record(json @ serde_json::Value::Object(_))) => {
                Value::Record(json.clone())
            }
            Some(_) => {
                return Err(ShellError::InvalidArgument(
                    "new-object: -property expects a hashtable".into(),
                ))
            }
            None => Value::Null,
        };

        Ok(vec![Value::Object(ShellObject::new(underlying))])
    }
}

#[cfg(test)]
mod tests {
    use crate::commands::OutputSink;
    use crate::object;

    use super::*;

    #[tokio::test]
    async fn creates_empty_object() {
        let mut ctx = ExecContext::new(OutputSink::capture());
        let mut args = CommandArgs::new();
        args.named
            .insert("type".into(), Value::String("PSObject".into()));
        let out = NewObject.run(args, vec![], &mut ctx).await.expect("run");
        assert_eq!(out.len(), 1);
        let Value::Object(object) = &out[0] else {
            panic!("expected an object");
        };
        assert!(object.is_null_backed());
    }

    #[tokio::test]
    async fn property_hashtable_seeds_members() {
        let mut ctx = ExecContext::new(OutputSink::capture());
        let mut args = CommandArgs::new();
        args.named
            .insert("type".into(), Value::String("psobject".into()));
        args.named.insert(
            "property".into(),
            Value::Record(serde_json::json!({"foo": "a"})),
        );
        let out = NewObject.run(args, vec![], &mut ctx).await.expect("run");
        assert_eq!(
            object::get_member(&out[0], "FOO").expect("get"),
            Value::String("a".into())
        );
    }

    #[tokio::test]
    async fn unsupported_type_is_rejected() {
        let mut ctx = ExecContext::new(OutputSink::capture());
        let mut args = CommandArgs::new();
        args.positional.push(Value::String("System.Uri".into()));
        let err = NewObject
            .run(args, vec![], &mut ctx)
            .await
            .expect_err("must fail");
        assert!(matches!(err, ShellError::InvalidArgument(_)));
    }
}
