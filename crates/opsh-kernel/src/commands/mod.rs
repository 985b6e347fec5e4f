//! Command system for opsh.
//!
//! Every pipeline stage is a command — the default output formatter and the
//! error-redisplay path included. Commands implement one trait and are
//! looked up case-insensitively in the registry.

mod builtin;
mod context;
mod registry;
mod traits;

pub use builtin::register_builtins;
pub use context::{ExecContext, OutputSink};
pub use registry::CommandRegistry;
pub use traits::{Command, CommandArgs, CommandSchema, ParamSchema};
