//! write-error — Append a non-terminating error to the error channel.

use async_trait::async_trait;

use opsh_types::{display_value, ErrorCategory, ErrorRecord, Value};

use crate::commands::{Command, CommandArgs, CommandSchema, ExecContext, ParamSchema};
use crate::error::ShellError;

/// Records an error without stopping the pipeline. The record lands in the
/// run's ordered error channel; the run itself keeps going.
pub struct WriteError;

#[async_trait]
impl Command for WriteError {
    fn name(&self) -> &str {
        "write-error"
    }

    fn schema(&self) -> CommandSchema {
        CommandSchema::new("write-error", "Write a non-terminating error").param(
            ParamSchema::new("message", "string", "The error message"),
        )
    }

    async fn run(
        &self,
        args: CommandArgs,
        input: Vec<Value>,
        ctx: &mut ExecContext,
    ) -> Result<Vec<Value>, ShellError> {
        let values = if args.positional.is_empty() {
            input
        } else {
            args.positional
        };
        let named = args.named.get("message").cloned();
        for value in values.iter().chain(named.iter()) {
            ctx.write_error(ErrorRecord::new(
                display_value(value),
                ErrorCategory::NotSpecified,
                None,
            ));
        }
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use crate::commands::OutputSink;

    use super::*;

    #[tokio::test]
    async fn buffers_records_in_argument_order() {
        let mut ctx = ExecContext::new(OutputSink::capture());
        let mut args = CommandArgs::new();
        args.positional.push(Value::String("first".into()));
        args.positional.push(Value::String("second".into()));
        WriteError.run(args, vec![], &mut ctx).await.expect("run");
        let errors = ctx.take_errors();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].message(), "first");
        assert_eq!(errors[1].message(), "second");
    }
}
