//! The Shell — owns and coordinates the runtime components.
//!
//! The Shell holds the variable scope, the command registry, the type
//! resolver, and the shared host state. `execute` drives one line of input
//! through the pipeline executor and, on failure, runs the single
//! error-redisplay retry.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::RwLock;

use opsh_types::{FaultPayload, Value};

use crate::commands::{register_builtins, CommandRegistry, OutputSink};
use crate::host::SharedHostState;
use crate::interpreter::Scope;
use crate::pipeline::{ExecutionRecord, PipelineExecutor, REDISPLAY_COMMAND};
use crate::types::{LibraryRegistry, TypeResolver};

/// Configuration for shell construction.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Where formatted output goes.
    pub sink: OutputSink,
    /// Curated library names searched, in order, before the exhaustive
    /// pass. Only the two-tier search algorithm is fixed; this ordering and
    /// the prefix below are environment policy.
    pub type_search_path: Vec<String>,
    /// Namespace prefix tried per curated library after the exact name.
    pub type_namespace_prefix: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            sink: OutputSink::Std,
            type_search_path: vec!["corlib".to_string(), "system.extra".to_string()],
            type_namespace_prefix: "System.".to_string(),
        }
    }
}

impl ShellConfig {
    /// Use the given output sink.
    pub fn with_sink(mut self, sink: OutputSink) -> Self {
        self.sink = sink;
        self
    }

    /// Override the curated type-search order.
    pub fn with_type_search_path(mut self, path: Vec<String>) -> Self {
        self.type_search_path = path;
        self
    }
}

/// The opsh runtime facade.
pub struct Shell {
    scope: RwLock<Scope>,
    commands: CommandRegistry,
    libraries: Arc<LibraryRegistry>,
    types: TypeResolver,
    host: SharedHostState,
    ui: Mutex<OutputSink>,
}

impl Shell {
    /// Create a shell with registered builtins and the default type
    /// libraries loaded.
    pub fn new(config: ShellConfig) -> Self {
        let mut commands = CommandRegistry::new();
        register_builtins(&mut commands);

        let libraries = Arc::new(LibraryRegistry::with_defaults());
        let types = TypeResolver::new(
            libraries.clone(),
            config.type_search_path.clone(),
            config.type_namespace_prefix.clone(),
        );

        Self {
            scope: RwLock::new(Scope::new()),
            commands,
            libraries,
            types,
            host: SharedHostState::new(),
            ui: Mutex::new(config.sink),
        }
    }

    /// The shared host state handle.
    pub fn host_state(&self) -> SharedHostState {
        self.host.clone()
    }

    /// The loaded-library registry, for loading type libraries mid-session.
    pub fn libraries(&self) -> Arc<LibraryRegistry> {
        self.libraries.clone()
    }

    /// Current output sink.
    pub fn sink(&self) -> OutputSink {
        self.ui.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Swap the output sink, returning the previous one. The host uses this
    /// to capture the prompt pipeline's text.
    pub fn swap_sink(&self, sink: OutputSink) -> OutputSink {
        let mut guard = self.ui.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, sink)
    }

    /// Set a session variable.
    pub async fn set_variable(&self, name: &str, value: Value) {
        self.scope.write().await.set(name, value);
    }

    /// Read a session variable.
    pub async fn get_variable(&self, name: &str) -> Option<Value> {
        self.scope.read().await.get(name).cloned()
    }

    /// Execute one line of input.
    pub async fn execute(&self, text: &str) -> ExecutionRecord {
        self.execute_with_input(text, None).await
    }

    /// Execute one line of input, feeding `input` into its first pipeline.
    ///
    /// On failure with captured errors, a second execution unit runs the
    /// error-redisplay command over the collected payloads. That retry is
    /// depth-limited to one: its own failures are swallowed.
    #[tracing::instrument(level = "info", skip(self, input), fields(input_len = text.len()))]
    pub async fn execute_with_input(
        &self,
        text: &str,
        input: Option<Vec<Value>>,
    ) -> ExecutionRecord {
        let mut scope = self.scope.write().await;
        let executor = PipelineExecutor {
            commands: &self.commands,
            types: &self.types,
            host: self.host.clone(),
            ui: self.sink(),
        };
        let record = executor.run(text, &mut scope, input).await;

        if !record.succeeded && !record.errors.is_empty() {
            let payloads: Vec<Value> = record.errors.iter().map(FaultPayload::to_value).collect();
            let retry = executor.run(REDISPLAY_COMMAND, &mut scope, Some(payloads)).await;
            if !retry.succeeded {
                tracing::warn!("error redisplay failed; giving up after one attempt");
            }
        }
        record
    }
}
