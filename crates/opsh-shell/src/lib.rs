//! opsh host — the interactive loop around the kernel.
//!
//! The host sequences profile bootstrap, banner or one-shot execution, the
//! interactive prompt/read/execute loop, and exit-code resolution. It owns
//! the tokio runtime and drives the async kernel from synchronous code.

use std::path::PathBuf;

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use tokio::runtime::Runtime;

use opsh_kernel::{OutputSink, Shell, ShellConfig};
use opsh_types::{ShellObject, Value};

/// Banner printed when the host starts without a one-shot command.
pub const BANNER_TEXT: &str = concat!(
    "opsh ",
    env!("CARGO_PKG_VERSION"),
    " — object pipeline shell"
);

/// Name of the session variable exposing the resolved profile paths.
pub const PROFILE_VARIABLE: &str = "Profile";

/// Host configuration.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Whether to enter the interactive loop.
    pub interactive: bool,
    /// Override for the profile script location; `None` resolves the
    /// platform-conditional default.
    pub profile_path: Option<PathBuf>,
    /// Where formatted output goes.
    pub sink: OutputSink,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            interactive: false,
            profile_path: None,
            sink: OutputSink::Std,
        }
    }
}

impl HostConfig {
    /// Configuration for an interactive session on the process streams.
    pub fn interactive() -> Self {
        Self {
            interactive: true,
            ..Self::default()
        }
    }

    pub fn with_profile_path(mut self, path: PathBuf) -> Self {
        self.profile_path = Some(path);
        self
    }

    pub fn with_sink(mut self, sink: OutputSink) -> Self {
        self.sink = sink;
        self
    }
}

/// Resolve the single well-known profile location.
///
/// On Windows this sits next to the user's documents, elsewhere it is a
/// dotfile in the home directory.
pub fn default_profile_path() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        directories::UserDirs::new()
            .and_then(|dirs| dirs.document_dir().map(|d| d.to_path_buf()))
            .map(|docs| docs.join("opsh_profile.osh"))
    }
    #[cfg(not(windows))]
    {
        directories::BaseDirs::new().map(|dirs| dirs.home_dir().join(".opsh_profile.osh"))
    }
}

/// The host: a shell, a runtime, and the loop state.
pub struct Host {
    shell: Shell,
    runtime: Runtime,
    interactive: bool,
    profile_path: Option<PathBuf>,
    sink: OutputSink,
}

impl Host {
    pub fn new(config: HostConfig) -> Result<Self> {
        let shell = Shell::new(ShellConfig::default().with_sink(config.sink.clone()));
        let runtime = Runtime::new().context("failed to create tokio runtime")?;
        let profile_path = config.profile_path.or_else(default_profile_path);
        Ok(Self {
            shell,
            runtime,
            interactive: config.interactive,
            profile_path,
            sink: config.sink,
        })
    }

    /// Run the host: bootstrap, banner or one-shot, interactive loop,
    /// exit-code resolution. Returns the process exit code.
    pub fn run(&mut self, commands: Option<&str>) -> Result<i32> {
        self.bootstrap();

        match commands {
            None => {
                self.sink.write_line(BANNER_TEXT);
                self.sink.write_line("");
            }
            Some(cmd) => self.execute_line(cmd),
        }

        if self.interactive {
            self.interactive_loop()?;
        }

        Ok(self.shell.host_state().exit_code())
    }

    /// Profile bootstrap: execute the profile if present, then publish the
    /// `$Profile` object regardless of whether the file existed. A failing
    /// profile behaves like any other failed execution and does not abort
    /// the session.
    fn bootstrap(&self) {
        let path_text = self
            .profile_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        if let Some(path) = &self.profile_path {
            match std::fs::read_to_string(path) {
                Ok(source) => self.execute_line(&source),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!("failed to read profile {}: {}", path.display(), e),
            }
        }

        let profile = ShellObject::new(Value::String(path_text.clone()));
        let fields = [
            ("CurrentUserCurrentHost", path_text),
            ("CurrentUserAllHosts", String::new()),
            ("AllUsersCurrentHost", String::new()),
            ("AllUsersAllHosts", String::new()),
        ];
        for (name, value) in fields {
            opsh_kernel::object::add_note_property(&profile, name, Value::String(value));
        }
        self.runtime.block_on(
            self.shell
                .set_variable(PROFILE_VARIABLE, Value::Object(profile)),
        );
    }

    /// Execute one line and apply the exit-code rule: a failed run in a
    /// non-interactive host forces the exit code to 1 unless an exit code
    /// was already requested.
    fn execute_line(&self, text: &str) {
        let record = self.runtime.block_on(self.shell.execute(text));
        let host = self.shell.host_state();
        if !record.succeeded && !self.interactive && host.exit_code() == 0 {
            host.request_exit(1);
        }
    }

    /// Render the prompt by running the conventional prompt pipeline with
    /// a capturing writer, then hand the text to the line editor.
    fn prompt_text(&self) -> String {
        let capture = OutputSink::capture();
        let previous = self.shell.swap_sink(capture.clone());
        let _ = self
            .runtime
            .block_on(self.shell.execute("prompt | write-host -nonewline"));
        self.shell.swap_sink(previous);
        capture.captured()
    }

    fn interactive_loop(&self) -> Result<()> {
        let mut editor: Editor<(), DefaultHistory> =
            Editor::new().context("failed to create line editor")?;

        let history_path = directories::BaseDirs::new()
            .map(|dirs| dirs.data_dir().join("opsh").join("history.txt"));
        if let Some(path) = &history_path {
            if let Err(e) = editor.load_history(path) {
                let not_found = matches!(&e, ReadlineError::Io(io) if io.kind() == std::io::ErrorKind::NotFound);
                if !not_found {
                    tracing::warn!("failed to load history: {}", e);
                }
            }
        }

        let host = self.shell.host_state();
        while !host.should_exit() {
            let prompt = self.prompt_text();
            match editor.readline(&prompt) {
                Ok(line) => {
                    if let Err(e) = editor.add_history_entry(line.as_str()) {
                        tracing::warn!("failed to add history entry: {}", e);
                    }
                    self.execute_line(&line);
                }
                Err(ReadlineError::Interrupted) => {
                    self.sink.write_line("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => break,
                Err(e) => {
                    tracing::warn!("read error: {}", e);
                    break;
                }
            }
        }

        if let Some(path) = &history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Err(e) = editor.save_history(path) {
                tracing::warn!("failed to save history: {}", e);
            }
        }
        Ok(())
    }
}
