//! Abstract syntax tree for the opsh surface grammar.

use opsh_types::Value;

/// A parsed script fragment: zero or more statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

/// One statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// A pipeline of commands, optionally headed by an expression.
    Pipeline(Pipeline),
    /// Variable or member assignment. The right-hand side is a pipeline so
    /// command output can be captured (`$a = new-object psobject`).
    Assign { target: AssignTarget, value: Pipeline },
    /// Raise a terminating fault.
    Throw(Option<Expr>),
    /// Request host exit with an optional code.
    Exit(Option<Expr>),
}

/// The left-hand side of an assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignTarget {
    Variable(String),
    Member { base: Expr, name: String },
}

/// A sequence of pipeline elements connected by `|`.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    pub elements: Vec<PipelineElement>,
}

/// One stage of a pipeline. Expressions are only valid as the first stage.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineElement {
    Expr(Expr),
    Command(Command),
}

/// A command invocation: name plus arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub name: String,
    pub args: Vec<CommandArg>,
}

/// One command argument.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandArg {
    Positional(Expr),
    /// `-name`; whether it consumes the following argument as its value is
    /// decided against the command's schema at bind time.
    Flag(String),
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    /// `$name`. `$true`, `$false` and `$null` are resolved by the evaluator.
    Variable(String),
    /// A bracketed type literal, verbatim as written.
    TypeLiteral(String),
    /// `@{key = expr; ...}`, insertion ordered.
    HashTable(Vec<(String, Expr)>),
    /// `base.Name`.
    Member { base: Box<Expr>, name: String },
    /// `base.Name(args...)`.
    MethodCall {
        base: Box<Expr>,
        name: String,
        args: Vec<Expr>,
    },
}
