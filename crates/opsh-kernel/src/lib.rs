//! opsh-kernel: the core of the opsh object-pipeline shell.
//!
//! This crate provides:
//!
//! - **Lexer**: tokenizes opsh source using logos
//! - **Parser**: builds the statement AST from tokens
//! - **Object adapter**: the uniform member-access protocol
//! - **Type resolution**: alias table, curated and exhaustive library search
//! - **Interpreter**: case-insensitive scope and expression evaluation
//! - **Pipeline**: execution units with ordered error capture and the
//!   single-depth error redisplay
//! - **Commands**: the command trait, registry, and builtins

pub mod ast;
pub mod commands;
pub mod error;
pub mod host;
pub mod interpreter;
pub mod lexer;
pub mod object;
pub mod parser;
pub mod pipeline;
pub mod shell;
pub mod types;

pub use commands::OutputSink;
pub use error::ShellError;
pub use host::SharedHostState;
pub use pipeline::{ExecutionRecord, PipelineState};
pub use shell::{Shell, ShellConfig};
