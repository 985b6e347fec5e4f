//! Built-in commands.
//!
//! These are always available. The host unconditionally appends
//! `out-default` to every run and uses `out-errors` for the redisplay
//! retry; the rest exist for script code and the interactive prompt.

mod add_member;
mod new_object;
mod out_default;
mod out_errors;
mod prompt;
mod write_error;
mod write_host;
mod write_output;

use super::CommandRegistry;

/// Register all built-in commands with the registry.
pub fn register_builtins(registry: &mut CommandRegistry) {
    registry.register(add_member::AddMember);
    registry.register(new_object::NewObject);
    registry.register(out_default::OutDefault);
    registry.register(out_errors::OutErrors);
    registry.register(prompt::Prompt);
    registry.register(write_error::WriteError);
    registry.register(write_host::WriteHost);
    registry.register(write_output::WriteOutput);
}
