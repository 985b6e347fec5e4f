//! out-default — The default output formatter.
//!
//! Appended as the final stage of every run. Renders each value through
//! the host sink; values flagged for the error stream go through the error
//! path instead, so a redisplay run and a normal run share one formatter.

use async_trait::async_trait;

use opsh_types::{display_value, wants_error_stream, Value};

use crate::commands::{Command, CommandArgs, CommandSchema, ExecContext};
use crate::error::ShellError;

pub struct OutDefault;

/// Extract the display text of an error-flagged value: the wrapped
/// record's message when present, the plain display text otherwise.
pub(crate) fn error_text(value: &Value) -> String {
    if let Value::Object(object) = value {
        if let Value::Record(serde_json::Value::Object(map)) = object.underlying() {
            if let Some(serde_json::Value::String(message)) = map.get("message") {
                return message.clone();
            }
        }
    }
    display_value(value)
}

#[async_trait]
impl Command for OutDefault {
    fn name(&self) -> &str {
        "out-default"
    }

    fn schema(&self) -> CommandSchema {
        CommandSchema::new("out-default", "Format values through the host display")
    }

    async fn run(
        &self,
        _args: CommandArgs,
        input: Vec<Value>,
        ctx: &mut ExecContext,
    ) -> Result<Vec<Value>, ShellError> {
        for value in &input {
            if matches!(value, Value::Null) {
                continue;
            }
            if wants_error_stream(value) {
                ctx.ui.write_error_line(&error_text(value));
            } else {
                ctx.ui.write_line(&display_value(value));
            }
        }
        Ok(Vec::new())
    }
}
