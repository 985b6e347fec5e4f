//! Process-wide host state.
//!
//! The only mutable resource shared across pipeline runs: whether the host
//! should exit, and with what code. Mutated only through an explicit exit
//! request reachable from script execution; read by the host loop at the
//! top of each iteration and at shutdown.

use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Default)]
struct HostState {
    should_exit: bool,
    exit_code: i32,
}

/// Shared handle to the host state. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct SharedHostState {
    inner: Arc<Mutex<HostState>>,
}

impl SharedHostState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HostState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Request host exit with the given code.
    pub fn request_exit(&self, code: i32) {
        let mut state = self.lock();
        state.should_exit = true;
        state.exit_code = code;
    }

    pub fn should_exit(&self) -> bool {
        self.lock().should_exit
    }

    pub fn exit_code(&self) -> i32 {
        self.lock().exit_code
    }
}
