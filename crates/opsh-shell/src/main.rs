//! opsh CLI entry point.
//!
//! Usage:
//!   opsh                 # Interactive session
//!   opsh -c <command>    # Execute a command string and exit
//!   opsh script.osh      # Run a script file

use std::env;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use opsh_shell::{Host, HostConfig};

fn main() -> ExitCode {
    // Initialize tracing (respects RUST_LOG).
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(code) => ExitCode::from(code.clamp(0, u8::MAX as i32) as u8),
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<i32> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        None => {
            let mut host = Host::new(HostConfig::interactive())?;
            host.run(None)
        }

        Some("--help" | "-h") => {
            print_help();
            Ok(0)
        }

        Some("--version" | "-V") => {
            println!("opsh {}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }

        Some("-c") => {
            let cmd = args.get(2).context("-c requires a command argument")?;
            let mut host = Host::new(HostConfig::default())?;
            host.run(Some(cmd))
        }

        Some(path) if !path.starts_with('-') => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read script: {path}"))?;
            let mut host = Host::new(HostConfig::default())?;
            host.run(Some(&source))
        }

        Some(unknown) => {
            eprintln!("Unknown option: {unknown}");
            eprintln!("Run 'opsh --help' for usage.");
            Ok(1)
        }
    }
}

fn print_help() {
    println!(
        r#"opsh v{} — object pipeline shell

Usage:
  opsh                 Interactive session
  opsh -c <command>    Execute a command string and exit
  opsh <script.osh>    Run a script file

Options:
  -c <command>         Execute command string and exit
  -h, --help           Show this help
  -V, --version        Show version

Exit codes:
  0   success
  1   a non-interactive run failed with no explicit exit request
  N   whatever script code requested via `exit N`
"#,
        env!("CARGO_PKG_VERSION")
    );
}
