//! add-member — Attach a note property to wrapped objects.

use async_trait::async_trait;

use opsh_types::Value;

use crate::commands::{Command, CommandArgs, CommandSchema, ExecContext, ParamSchema};
use crate::error::ShellError;
use crate::object::add_note_property;

/// Attaches a member to each piped-in object (or `-inputobject`). An added
/// member shadows any same-named native member from this point on.
pub struct AddMember;

#[async_trait]
impl Command for AddMember {
    fn name(&self) -> &str {
        "add-member"
    }

    fn schema(&self) -> CommandSchema {
        CommandSchema::new("add-member", "Attach a member to an object")
            .param(ParamSchema::new("type", "string", "Member type (NoteProperty)"))
            .param(ParamSchema::new("name", "string", "Member name"))
            .param(ParamSchema::new("value", "any", "Member value"))
            .param(ParamSchema::new("inputobject", "any", "Object to extend"))
    }

    async fn run(
        &self,
        args: CommandArgs,
        input: Vec<Value>,
        _ctx: &mut ExecContext,
    ) -> Result<Vec<Value>, ShellError> {
        let member_type = args
            .get_string("type", 0)
            .ok_or_else(|| ShellError::InvalidArgument("add-member: a member type is required".into()))?;
        if member_type.to_lowercase() != "noteproperty" {
            return Err(ShellError::InvalidArgument(format!(
                "add-member: unsupported member type '{member_type}'; only NoteProperty is supported"
            )));
        }
        let name = args
            .get_string("name", 1)
            .ok_or_else(|| ShellError::InvalidArgument("add-member: a member name is required".into()))?;
        let value = args
            .get("value", 2)
            .cloned()
            .unwrap_or(Value::Null);

        let mut targets = input;
        if let Some(v) = args.get_named("inputobject") {
            targets.push(v.clone());
        }
        if targets.is_empty() {
            return Err(ShellError::InvalidArgument(
                "add-member: no object to extend; pipe one in or use -inputobject".into(),
            ));
        }
        for target in &targets {
            let Value::Object(object) = target else {
                return Err(ShellError::InvalidArgument(
                    "add-member: the input is not an extensible object".into(),
                ));
            };
            add_note_property(object, &name, value.clone());
        }
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use opsh_types::ShellObject;

    use crate::commands::OutputSink;
    use crate::object;

    use super::*;

    fn note_args(name: &str, value: Value) -> CommandArgs {
        let mut args = CommandArgs::new();
        args.named
            .insert("type".into(), Value::String("NoteProperty".into()));
        args.named.insert("name".into(), Value::String(name.into()));
        args.named.insert("value".into(), value);
        args
    }

    #[tokio::test]
    async fn attaches_note_property_to_piped_object() {
        let mut ctx = ExecContext::new(OutputSink::capture());
        let target = Value::Object(ShellObject::new(Value::Null));
        AddMember
            .run(
                note_args("TestName", Value::String("TestValue".into())),
                vec![target.clone()],
                &mut ctx,
            )
            .await
            .expect("run");
        assert_eq!(
            object::get_member(&target, "testname").expect("get"),
            Value::String("TestValue".into())
        );
    }

    #[tokio::test]
    async fn rejects_non_note_member_types() {
        let mut ctx = ExecContext::new(OutputSink::capture());
        let mut args = note_args("x", Value::Null);
        args.named
            .insert("type".into(), Value::String("ScriptMethod".into()));
        let err = AddMember
            .run(args, vec![Value::Object(ShellObject::new(Value::Null))], &mut ctx)
            .await
            .expect_err("must fail");
        assert!(matches!(err, ShellError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn rejects_unwrapped_input() {
        let mut ctx = ExecContext::new(OutputSink::capture());
        let err = AddMember
            .run(
                note_args("x", Value::Null),
                vec![Value::Int(1)],
                &mut ctx,
            )
            .await
            .expect_err("must fail");
        assert!(matches!(err, ShellError::InvalidArgument(_)));
    }
}
