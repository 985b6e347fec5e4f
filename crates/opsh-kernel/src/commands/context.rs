//! Execution context shared with commands during a pipeline run.

use std::sync::{Arc, Mutex, PoisonError};

use opsh_types::{ErrorRecord, FaultPayload};

/// Where formatted output goes: the process streams, or an in-memory
/// buffer for embedding and tests.
#[derive(Debug, Clone)]
pub enum OutputSink {
    /// stdout/stderr of the process.
    Std,
    /// A shared buffer capturing both streams in arrival order. Error
    /// lines are prefixed so ordering stays observable.
    Capture(Arc<Mutex<String>>),
}

impl OutputSink {
    /// A fresh capturing sink.
    pub fn capture() -> Self {
        OutputSink::Capture(Arc::new(Mutex::new(String::new())))
    }

    /// Write without a trailing newline.
    pub fn write(&self, text: &str) {
        match self {
            OutputSink::Std => print!("{text}"),
            OutputSink::Capture(buffer) => {
                buffer
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push_str(text);
            }
        }
    }

    /// Write one line of normal output.
    pub fn write_line(&self, text: &str) {
        match self {
            OutputSink::Std => println!("{text}"),
            OutputSink::Capture(buffer) => {
                let mut buffer = buffer.lock().unwrap_or_else(PoisonError::into_inner);
                buffer.push_str(text);
                buffer.push('\n');
            }
        }
    }

    /// Write one line through the error stream.
    pub fn write_error_line(&self, text: &str) {
        match self {
            OutputSink::Std => eprintln!("{text}"),
            OutputSink::Capture(buffer) => {
                let mut buffer = buffer.lock().unwrap_or_else(PoisonError::into_inner);
                buffer.push_str("ERROR: ");
                buffer.push_str(text);
                buffer.push('\n');
            }
        }
    }

    /// Contents of a capturing sink; empty for the process streams.
    pub fn captured(&self) -> String {
        match self {
            OutputSink::Std => String::new(),
            OutputSink::Capture(buffer) => buffer
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }
}

/// Per-run state handed to commands: the output sink and the buffered
/// error channel.
pub struct ExecContext {
    pub ui: OutputSink,
    errors: Vec<FaultPayload>,
}

impl ExecContext {
    pub fn new(ui: OutputSink) -> Self {
        Self {
            ui,
            errors: Vec::new(),
        }
    }

    /// Append a non-terminating error record to the ordered channel.
    pub fn write_error(&mut self, record: ErrorRecord) {
        self.errors.push(FaultPayload::Structured(record));
    }

    /// Drain the buffered error channel, preserving first-seen order.
    pub fn take_errors(&mut self) -> Vec<FaultPayload> {
        std::mem::take(&mut self.errors)
    }
}
