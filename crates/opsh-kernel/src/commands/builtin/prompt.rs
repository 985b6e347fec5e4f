//! prompt — The conventional prompt expression.
//!
//! The host renders its prompt by running `prompt | write-host -nonewline`,
//! so replacing this command changes the interactive prompt.

use async_trait::async_trait;

use opsh_types::Value;

use crate::commands::{Command, CommandArgs, CommandSchema, ExecContext};
use crate::error::ShellError;

/// Default prompt text.
pub const DEFAULT_PROMPT: &str = "opsh> ";

pub struct Prompt;

#[async_trait]
impl Command for Prompt {
    fn name(&self) -> &str {
        "prompt"
    }

    fn schema(&self) -> CommandSchema {
        CommandSchema::new("prompt", "Produce the interactive prompt text")
    }

    async fn run(
        &self,
        _args: CommandArgs,
        _input: Vec<Value>,
        _ctx: &mut ExecContext,
    ) -> Result<Vec<Value>, ShellError> {
        Ok(vec![Value::String(DEFAULT_PROMPT.to_string())])
    }
}
