//! Core command trait and argument types.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use opsh_types::Value;

use crate::error::ShellError;

use super::context::ExecContext;

/// Schema for one command parameter.
#[derive(Debug, Clone)]
pub struct ParamSchema {
    /// Parameter name, lower case.
    pub name: String,
    /// Type hint (string, bool, record, any). A flag whose parameter is not
    /// `bool` consumes the following argument as its value.
    pub param_type: String,
    /// Description for help text.
    pub description: String,
}

impl ParamSchema {
    pub fn new(
        name: impl Into<String>,
        param_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
            description: description.into(),
        }
    }
}

/// Schema describing a command's interface.
#[derive(Debug, Clone)]
pub struct CommandSchema {
    pub name: String,
    pub description: String,
    pub params: Vec<ParamSchema>,
}

impl CommandSchema {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, param: ParamSchema) -> Self {
        self.params.push(param);
        self
    }

    /// Whether `flag` names a parameter that takes a value.
    pub fn takes_value(&self, flag: &str) -> bool {
        self.params
            .iter()
            .any(|p| p.name == flag && p.param_type != "bool")
    }
}

/// Bound arguments ready for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandArgs {
    /// Positional arguments in order.
    pub positional: Vec<Value>,
    /// Named arguments by lower-case key.
    pub named: HashMap<String, Value>,
    /// Boolean flags, lower case.
    pub flags: HashSet<String>,
}

impl CommandArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Named argument, or positional fallback at `index`.
    pub fn get(&self, name: &str, index: usize) -> Option<&Value> {
        self.named.get(name).or_else(|| self.positional.get(index))
    }

    /// Named argument by key.
    pub fn get_named(&self, name: &str) -> Option<&Value> {
        self.named.get(name)
    }

    /// String form of a named-or-positional argument.
    pub fn get_string(&self, name: &str, index: usize) -> Option<String> {
        self.get(name, index).and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
    }

    /// Whether a boolean flag is set.
    pub fn has_flag(&self, name: &str) -> bool {
        if self.flags.contains(name) {
            return true;
        }
        self.named.get(name).is_some_and(|v| match v {
            Value::Bool(b) => *b,
            Value::Null => false,
            _ => true,
        })
    }
}

/// A pipeline-stage command.
#[async_trait]
pub trait Command: Send + Sync {
    /// The command's name (used for lookup).
    fn name(&self) -> &str;

    /// The command's schema.
    fn schema(&self) -> CommandSchema;

    /// Run with bound arguments and the upstream values. The returned
    /// values become the downstream input. A returned error is a
    /// terminating fault; non-terminating errors go through
    /// `ctx.write_error`.
    async fn run(
        &self,
        args: CommandArgs,
        input: Vec<Value>,
        ctx: &mut ExecContext,
    ) -> Result<Vec<Value>, ShellError>;
}
