//! write-output — Send values down the pipeline.

use async_trait::async_trait;

use opsh_types::Value;

use crate::commands::{Command, CommandArgs, CommandSchema, ExecContext, ParamSchema};
use crate::error::ShellError;

/// Emits its arguments as pipeline output; with no arguments, passes the
/// upstream input through.
pub struct WriteOutput;

#[async_trait]
impl Command for WriteOutput {
    fn name(&self) -> &str {
        "write-output"
    }

    fn schema(&self) -> CommandSchema {
        CommandSchema::new("write-output", "Send values to the pipeline").param(
            ParamSchema::new("inputobject", "any", "Values to emit"),
        )
    }

    async fn run(
        &self,
        args: CommandArgs,
        input: Vec<Value>,
        _ctx: &mut ExecContext,
    ) -> Result<Vec<Value>, ShellError> {
        let mut values = args.positional;
        if let Some(v) = args.named.get("inputobject") {
            values.push(v.clone());
        }
        if values.is_empty() {
            Ok(input)
        } else {
            Ok(values)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::commands::OutputSink;

    use super::*;

    #[tokio::test]
    async fn emits_arguments() {
        let mut ctx = ExecContext::new(OutputSink::capture());
        let mut args = CommandArgs::new();
        args.positional.push(Value::Int(1));
        let out = WriteOutput.run(args, vec![], &mut ctx).await.expect("run");
        assert_eq!(out, vec![Value::Int(1)]);
    }

    #[tokio::test]
    async fn passes_input_through_without_arguments() {
        let mut ctx = ExecContext::new(OutputSink::capture());
        let input = vec![Value::String("x".into())];
        let out = WriteOutput
            .run(CommandArgs::new(), input.clone(), &mut ctx)
            .await
            .expect("run");
        assert_eq!(out, input);
    }
}
