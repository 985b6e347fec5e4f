//! Pipeline execution and the error-ordering protocol.
//!
//! One call drives one line of input: parse the whole fragment, run each
//! statement at the caller's scope, flush produced values through the
//! default output formatter as they appear, and capture faults in order.
//!
//! Error ordering rules:
//! - output already written before a fault is never retracted;
//! - on failure, the buffered error channel drains into the record first,
//!   then the terminating fault is appended last;
//! - a run that completes flushes any buffered non-terminating errors
//!   through the error display instead of dropping them.

use opsh_types::{display_value, ErrorCategory, ErrorRecord, FaultPayload, MemberError, Value};

use crate::ast::{AssignTarget, CommandArg, Expr, Pipeline, PipelineElement, Program, Stmt};
use crate::commands::{
    Command, CommandArgs, CommandRegistry, CommandSchema, ExecContext, OutputSink,
};
use crate::error::ShellError;
use crate::host::SharedHostState;
use crate::interpreter::{Evaluator, Scope};
use crate::object;
use crate::parser;
use crate::types::TypeResolver;

/// Command the executor runs for the failure redisplay retry.
pub const REDISPLAY_COMMAND: &str = "out-errors";

/// Terminal and intermediate states of one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    NotStarted,
    Running,
    Completed,
    Failed,
    Stopped,
}

/// The result of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRecord {
    pub input_text: String,
    /// Values emitted to the success channel, in order.
    pub output: Vec<Value>,
    /// Captured error payloads, first-seen order preserved; a terminating
    /// fault is always last.
    pub errors: Vec<FaultPayload>,
    pub state: PipelineState,
    pub succeeded: bool,
}

impl ExecutionRecord {
    fn new(input_text: &str) -> Self {
        Self {
            input_text: input_text.to_string(),
            output: Vec::new(),
            errors: Vec::new(),
            state: PipelineState::NotStarted,
            succeeded: false,
        }
    }
}

/// Map a runtime error to its captured payload.
///
/// Errors carrying structure become full records; the catch-all pipeline
/// error stays opaque and is categorized only at display time.
pub fn fault_payload(error: &ShellError) -> FaultPayload {
    let category = match error {
        ShellError::Parse(_) => ErrorCategory::ParserError,
        ShellError::UnknownType(_) => ErrorCategory::InvalidType,
        ShellError::CommandNotFound(_) => ErrorCategory::CommandNotFound,
        ShellError::InvalidArgument(_) => ErrorCategory::InvalidArgument,
        ShellError::Member(_) => ErrorCategory::InvalidOperation,
        ShellError::Pipeline(message) => return FaultPayload::Opaque(message.clone()),
    };
    let target = match error {
        ShellError::UnknownType(name) | ShellError::CommandNotFound(name) => Some(name.clone()),
        _ => None,
    };
    FaultPayload::Structured(ErrorRecord::new(error.to_string(), category, target))
}

enum Flow {
    Values(Vec<Value>),
    Exit(i32),
}

/// Drives execution units against a scope.
pub struct PipelineExecutor<'a> {
    pub commands: &'a CommandRegistry,
    pub types: &'a TypeResolver,
    pub host: SharedHostState,
    pub ui: OutputSink,
}

impl PipelineExecutor<'_> {
    /// Execute one unit: a whole script fragment with the default output
    /// formatter appended as the final stage. `input` seeds the first
    /// pipeline of the unit.
    #[tracing::instrument(level = "debug", skip(self, scope, input), fields(input_len = text.len()))]
    pub async fn run(
        &self,
        text: &str,
        scope: &mut Scope,
        input: Option<Vec<Value>>,
    ) -> ExecutionRecord {
        let mut record = ExecutionRecord::new(text);

        // Blank input is a no-op success.
        if text.trim().is_empty() {
            record.state = PipelineState::Completed;
            record.succeeded = true;
            return record;
        }

        record.state = PipelineState::Running;
        let program = match parser::parse(text) {
            Ok(program) => program,
            Err(e) => {
                record.state = PipelineState::Failed;
                record
                    .errors
                    .push(fault_payload(&ShellError::Parse(e.to_string())));
                return record;
            }
        };

        let mut ctx = ExecContext::new(self.ui.clone());
        let fault = self.run_program(&program, scope, &mut ctx, input, &mut record).await;

        if record.state == PipelineState::Running {
            record.state = PipelineState::Completed;
        }
        if record.state == PipelineState::Failed {
            // Drain the buffered channel first, then append the fault, so
            // ordering relative to partial output is preserved.
            record.errors = ctx.take_errors();
            if let Some(payload) = fault {
                record.errors.push(payload);
            }
            record.succeeded = false;
        } else {
            // Completed or stopped: buffered non-terminating errors are
            // rendered now rather than dropped.
            for payload in ctx.take_errors() {
                self.ui.write_error_line(&payload.record().message);
            }
            record.succeeded = true;
        }
        record
    }

    /// Run every statement, flushing values through out-default as they
    /// are produced. Returns the terminating fault, if any.
    async fn run_program(
        &self,
        program: &Program,
        scope: &mut Scope,
        ctx: &mut ExecContext,
        mut input: Option<Vec<Value>>,
        record: &mut ExecutionRecord,
    ) -> Option<FaultPayload> {
        let out_default = self.commands.get("out-default");
        for stmt in &program.statements {
            match self.run_stmt(stmt, scope, ctx, input.take()).await {
                Ok(Flow::Values(values)) => {
                    record.output.extend(values.iter().cloned());
                    let Some(formatter) = &out_default else {
                        record.state = PipelineState::Failed;
                        return Some(fault_payload(&ShellError::Pipeline(
                            "the default output command is not registered".into(),
                        )));
                    };
                    if let Err(e) = formatter.run(CommandArgs::new(), values, ctx).await {
                        record.state = PipelineState::Failed;
                        return Some(fault_payload(&e));
                    }
                }
                Ok(Flow::Exit(code)) => {
                    self.host.request_exit(code);
                    record.state = PipelineState::Stopped;
                    return None;
                }
                Err(payload) => {
                    record.state = PipelineState::Failed;
                    return Some(payload);
                }
            }
        }
        None
    }

    async fn run_stmt(
        &self,
        stmt: &Stmt,
        scope: &mut Scope,
        ctx: &mut ExecContext,
        input: Option<Vec<Value>>,
    ) -> Result<Flow, FaultPayload> {
        match stmt {
            Stmt::Pipeline(pipeline) => self
                .run_pipeline(pipeline, scope, ctx, input)
                .await
                .map(Flow::Values),
            Stmt::Assign { target, value } => {
                let values = self.run_pipeline(value, scope, ctx, None).await?;
                let value = collapse(values);
                self.assign(target, value, scope).map_err(|e| fault_payload(&e))?;
                // Assignments produce no pipeline output.
                Ok(Flow::Values(Vec::new()))
            }
            Stmt::Throw(expr) => {
                let message = match expr {
                    Some(expr) => {
                        let value = self.eval(expr, scope).map_err(|e| fault_payload(&e))?;
                        display_value(&value)
                    }
                    None => "script halted".to_string(),
                };
                Err(FaultPayload::Structured(ErrorRecord::new(
                    message.clone(),
                    ErrorCategory::OperationStopped,
                    Some(message),
                )))
            }
            Stmt::Exit(expr) => {
                let code = match expr {
                    Some(expr) => match self.eval(expr, scope).map_err(|e| fault_payload(&e))? {
                        Value::Int(n) => n as i32,
                        _ => 0,
                    },
                    None => 0,
                };
                Ok(Flow::Exit(code))
            }
        }
    }

    async fn run_pipeline(
        &self,
        pipeline: &Pipeline,
        scope: &mut Scope,
        ctx: &mut ExecContext,
        input: Option<Vec<Value>>,
    ) -> Result<Vec<Value>, FaultPayload> {
        let mut stream = input.unwrap_or_default();
        for element in &pipeline.elements {
            match element {
                PipelineElement::Expr(expr) => {
                    let value = self.eval(expr, scope).map_err(|e| fault_payload(&e))?;
                    if !matches!(value, Value::Null) {
                        stream.push(value);
                    }
                }
                PipelineElement::Command(command) => {
                    let Some(resolved) = self.commands.get(&command.name) else {
                        return Err(fault_payload(&ShellError::CommandNotFound(
                            command.name.clone(),
                        )));
                    };
                    let args = self
                        .bind_args(&resolved.schema(), command, scope)
                        .map_err(|e| fault_payload(&e))?;
                    let upstream = std::mem::take(&mut stream);
                    stream = resolved
                        .run(args, upstream, ctx)
                        .await
                        .map_err(|e| fault_payload(&e))?;
                }
            }
        }
        Ok(stream)
    }

    /// Bind AST arguments against a command schema. A flag naming a
    /// non-boolean parameter consumes the next positional argument as its
    /// value.
    fn bind_args(
        &self,
        schema: &CommandSchema,
        command: &crate::ast::Command,
        scope: &mut Scope,
    ) -> Result<CommandArgs, ShellError> {
        let mut args = CommandArgs::new();
        let mut pending: Option<String> = None;
        for arg in &command.args {
            match arg {
                CommandArg::Flag(flag) => {
                    if let Some(name) = pending.take() {
                        args.flags.insert(name);
                    }
                    let folded = flag.to_lowercase();
                    if schema.takes_value(&folded) {
                        pending = Some(folded);
                    } else {
                        args.flags.insert(folded);
                    }
                }
                CommandArg::Positional(expr) => {
                    let value = self.eval(expr, scope)?;
                    match pending.take() {
                        Some(name) => {
                            args.named.insert(name, value);
                        }
                        None => args.positional.push(value),
                    }
                }
            }
        }
        if let Some(name) = pending {
            args.flags.insert(name);
        }
        Ok(args)
    }

    fn assign(
        &self,
        target: &AssignTarget,
        value: Value,
        scope: &mut Scope,
    ) -> Result<(), ShellError> {
        match target {
            AssignTarget::Variable(name) => {
                scope.set(name, value);
                Ok(())
            }
            AssignTarget::Member { base, name } => {
                // A variable holding a bare record is mutated through the
                // scope; wrapped objects mutate through their shared cell.
                if let Expr::Variable(var) = base {
                    let current = scope.get(var).cloned().unwrap_or(Value::Null);
                    return match current {
                        Value::Record(mut json) => {
                            if !object::record_set(&mut json, name, &value) {
                                if let serde_json::Value::Object(map) = &mut json {
                                    map.insert(name.clone(), opsh_types::value_to_json(&value));
                                } else {
                                    return Err(MemberError::ReadOnly(name.clone()).into());
                                }
                            }
                            scope.set(var, Value::Record(json));
                            Ok(())
                        }
                        other => object::set_member(&other, name, value).map_err(Into::into),
                    };
                }
                let base_value = self.eval(base, scope)?;
                object::set_member(&base_value, name, value).map_err(Into::into)
            }
        }
    }

    fn eval(&self, expr: &Expr, scope: &mut Scope) -> Result<Value, ShellError> {
        Evaluator {
            scope,
            types: self.types,
        }
        .eval(expr)
    }
}

/// Collapse captured pipeline output into one assignable value.
fn collapse(mut values: Vec<Value>) -> Value {
    match values.len() {
        0 => Value::Null,
        1 => values.remove(0),
        _ => Value::Record(serde_json::Value::Array(
            values.iter().map(opsh_types::value_to_json).collect(),
        )),
    }
}
