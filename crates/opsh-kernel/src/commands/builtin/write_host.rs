//! write-host — Print directly to the host display.

use async_trait::async_trait;

use opsh_types::{display_value, Value};

use crate::commands::{Command, CommandArgs, CommandSchema, ExecContext, ParamSchema};
use crate::error::ShellError;

/// Prints arguments (or upstream input) straight to the host, bypassing
/// the pipeline. `-nonewline` suppresses the trailing newline — the prompt
/// pipeline relies on this.
pub struct WriteHost;

#[async_trait]
impl Command for WriteHost {
    fn name(&self) -> &str {
        "write-host"
    }

    fn schema(&self) -> CommandSchema {
        CommandSchema::new("write-host", "Print text to the host display").param(
            ParamSchema::new("nonewline", "bool", "Do not append a trailing newline"),
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
        let text = values
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(" ");
        if args.flags.contains("nonewline") {
            ctx.ui.write(&text);
        } else {
            ctx.ui.write_line(&text);
        }
        Ok(Vec::new())
    }
}
