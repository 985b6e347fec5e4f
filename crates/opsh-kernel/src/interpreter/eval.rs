//! Expression evaluation.
//!
//! Reduces AST expressions to values. Member access and method invocation
//! go through the object adapter; type literals go through the resolver on
//! every occurrence (resolution is never cached).

use opsh_types::{value_to_json, Value};

use crate::ast::Expr;
use crate::error::ShellError;
use crate::object;
use crate::types::{parse_type_reference, TypeResolver};

use super::scope::Scope;

/// Expression evaluator over a scope and a type resolver.
pub struct Evaluator<'a> {
    pub scope: &'a mut Scope,
    pub types: &'a TypeResolver,
}

impl Evaluator<'_> {
    /// Evaluate an expression to a value.
    pub fn eval(&mut self, expr: &Expr) -> Result<Value, ShellError> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Variable(name) => Ok(self.eval_variable(name)),
            Expr::TypeLiteral(raw) => {
                let reference = parse_type_reference(raw);
                Ok(Value::Type(self.types.resolve(&reference)?))
            }
            Expr::HashTable(entries) => self.eval_hashtable(entries),
            Expr::Member { base, name } => {
                let base = self.eval(base)?;
                Ok(object::get_member(&base, name)?)
            }
            Expr::MethodCall { base, name, args } => {
                let base = self.eval(base)?;
                let args = args
                    .iter()
                    .map(|a| self.eval(a))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(object::invoke_member(&base, name, &args)?)
            }
        }
    }

    /// Resolve `$name`. Unset variables read as null, like the automatic
    /// `$true`/`$false`/`$null` names this also handles.
    fn eval_variable(&self, name: &str) -> Value {
        match name.to_lowercase().as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "null" => Value::Null,
            _ => self.scope.get(name).cloned().unwrap_or(Value::Null),
        }
    }

    fn eval_hashtable(&mut self, entries: &[(String, Expr)]) -> Result<Value, ShellError> {
        let mut map = serde_json::Map::new();
        for (key, expr) in entries {
            let value = self.eval(expr)?;
            map.insert(key.clone(), value_to_json(&value));
        }
        Ok(Value::Record(serde_json::Value::Object(map)))
    }
}
