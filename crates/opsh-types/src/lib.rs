//! opsh-types: the value model shared by the opsh runtime.
//!
//! This crate provides:
//!
//! - **Value**: every datum that flows through a pipeline
//! - **ShellObject**: the shared-handle wrapper behind the uniform
//!   member-access protocol (reference semantics, added members)
//! - **TypeDescriptor**: a resolved runtime type
//! - **ErrorRecord / FaultPayload**: the structured error records carried
//!   through the pipeline error channel

pub mod descriptor;
pub mod error;
pub mod object;
pub mod value;

pub use descriptor::TypeDescriptor;
pub use error::{
    wants_error_stream, ErrorCategory, ErrorRecord, FaultPayload, MemberError,
    WRITE_TO_ERROR_STREAM,
};
pub use object::{AddedMember, MemberKind, MethodFn, ShellObject};
pub use value::{display_value, json_to_value, value_to_json, BoundMethod, Value};
