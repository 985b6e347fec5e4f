//! out-errors — The error-redisplay path.
//!
//! Consumed only on failure: the executor feeds it the captured error
//! payloads so the user sees failures rendered through the same output
//! path as normal values.

use async_trait::async_trait;

use opsh_types::Value;

use crate::commands::{Command, CommandArgs, CommandSchema, ExecContext};
use crate::error::ShellError;

use super::out_default::error_text;

pub struct OutErrors;

#[async_trait]
impl Command for OutErrors {
    fn name(&self) -> &str {
        "out-errors"
    }

    fn schema(&self) -> CommandSchema {
        CommandSchema::new("out-errors", "Render captured error records")
    }

    async fn run(
        &self,
        _args: CommandArgs,
        input: Vec<Value>,
        ctx: &mut ExecContext,
    ) -> Result<Vec<Value>, ShellError> {
        for value in &input {
            ctx.ui.write_error_line(&error_text(value));
        }
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use opsh_types::{ErrorCategory, ErrorRecord, FaultPayload};

    use crate::commands::OutputSink;

    use super::*;

    #[tokio::test]
    async fn renders_records_in_order() {
        let sink = OutputSink::capture();
        let mut ctx = ExecContext::new(sink.clone());
        let input = vec![
            FaultPayload::Structured(ErrorRecord::new("a", ErrorCategory::NotSpecified, None))
                .to_value(),
            FaultPayload::Opaque("b".into()).to_value(),
        ];
        OutErrors
            .run(CommandArgs::new(), input, &mut ctx)
            .await
            .expect("run");
        assert_eq!(sink.captured(), "ERROR: a\nERROR: b\n");
    }
}
