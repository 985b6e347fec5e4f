//! Runtime error taxonomy.

use opsh_types::MemberError;
use thiserror::Error;

/// Errors raised while executing script text.
///
/// Every variant except `Pipeline` carries enough structure for a full
/// error record; `Pipeline` is the opaque catch-all for faults with no
/// structured payload.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ShellError {
    #[error("parse error: {0}")]
    Parse(String),
    #[error("unknown type '{0}'; the type cannot be resolved")]
    UnknownType(String),
    #[error("the term '{0}' is not recognized as the name of a command")]
    CommandNotFound(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Member(#[from] MemberError),
    #[error("pipeline error: {0}")]
    Pipeline(String),
}
