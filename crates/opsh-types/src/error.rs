//! Structured error records for the pipeline error channel.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::object::{AddedMember, ShellObject};
use crate::value::Value;

/// Name of the note property that routes a redisplayed record to the error
/// stream of the output formatter.
pub const WRITE_TO_ERROR_STREAM: &str = "writeToErrorStream";

/// Broad classification attached to every captured error record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCategory {
    NotSpecified,
    ParserError,
    InvalidOperation,
    InvalidArgument,
    InvalidType,
    CommandNotFound,
    OperationStopped,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::NotSpecified => "NotSpecified",
            ErrorCategory::ParserError => "ParserError",
            ErrorCategory::InvalidOperation => "InvalidOperation",
            ErrorCategory::InvalidArgument => "InvalidArgument",
            ErrorCategory::InvalidType => "InvalidType",
            ErrorCategory::CommandNotFound => "CommandNotFound",
            ErrorCategory::OperationStopped => "OperationStopped",
        };
        f.write_str(name)
    }
}

/// One captured error: message, category, optional target object text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorRecord {
    pub message: String,
    pub category: ErrorCategory,
    pub target: Option<String>,
}

impl ErrorRecord {
    pub fn new(
        message: impl Into<String>,
        category: ErrorCategory,
        target: Option<String>,
    ) -> Self {
        Self {
            message: message.into(),
            category,
            target,
        }
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// A fault captured from a pipeline run.
///
/// `Structured` carries a full error record; `Opaque` is a bare message from
/// a fault that had no structured payload and gets a generic record when
/// displayed.
#[derive(Debug, Clone, PartialEq)]
pub enum FaultPayload {
    Structured(ErrorRecord),
    Opaque(String),
}

impl FaultPayload {
    /// The record form. An opaque fault becomes an uncategorized operation
    /// error with no target.
    pub fn record(&self) -> ErrorRecord {
        match self {
            FaultPayload::Structured(record) => record.clone(),
            FaultPayload::Opaque(message) => {
                ErrorRecord::new(message.clone(), ErrorCategory::InvalidOperation, None)
            }
        }
    }

    /// The payload as a pipeline value for the redisplay run: the record
    /// wrapped as an object flagged for the error stream.
    pub fn to_value(&self) -> Value {
        let record = self.record();
        let underlying = serde_json::to_value(&record)
            .map(Value::Record)
            .unwrap_or(Value::String(record.message.clone()));
        let object = ShellObject::new(underlying);
        object.insert_added(AddedMember::note(WRITE_TO_ERROR_STREAM, Value::Bool(true)));
        Value::Object(object)
    }

    pub fn message(&self) -> &str {
        match self {
            FaultPayload::Structured(record) => &record.message,
            FaultPayload::Opaque(message) => message,
        }
    }
}

/// Whether a value has been flagged for the error stream of the output
/// formatter.
pub fn wants_error_stream(value: &Value) -> bool {
    let Value::Object(object) = value else {
        return false;
    };
    match object.find_added(WRITE_TO_ERROR_STREAM) {
        Some(member) => match member.kind {
            crate::object::MemberKind::Note(Value::Bool(b)) => b,
            crate::object::MemberKind::Note(Value::Null) => false,
            crate::object::MemberKind::Note(_) => true,
            crate::object::MemberKind::Method(_) => false,
        },
        None => false,
    }
}

/// Errors raised by the member-access protocol.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MemberError {
    #[error("you cannot call a method on a null-valued expression")]
    NullInvocation(String),
    #[error("the property '{0}' cannot be found on a null-valued expression")]
    NullTarget(String),
    #[error("the member '{0}' cannot be found on this object")]
    MemberNotFound(String),
    #[error("the property '{0}' cannot be set on this value")]
    ReadOnly(String),
    #[error("exception calling '{member}': {cause}")]
    Invocation { member: String, cause: String },
}
