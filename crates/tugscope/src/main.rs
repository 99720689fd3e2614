//! Binary entry point for the tugscope CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Report every module, object and test case in a manifest
//! tugscope snapshot project.json
//!
//! # Derive the dotted locator of a subpath
//! tugscope locate pkg/widget.py
//!
//! # Print the code recorded for a method
//! tugscope code project.json --module pkg.widget --object Widget.render
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use tugscope::cli::{run_code, run_locate, run_snapshot};
use tugscope::error::{CliError, OutputErrorCode};
use tugscope::output::{emit_response, ErrorResponse};

// ============================================================================
// CLI Structure
// ============================================================================

/// Inspect the project model a test generator works against.
///
/// All output is JSON.
#[derive(Parser, Debug)]
#[command(name = "tugscope", version, about = "Inspect project models for test generation")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Load a manifest and report every module.
    Snapshot {
        /// Path to the JSON manifest.
        manifest: PathBuf,
    },
    /// Print the dotted locator of a subpath.
    Locate {
        /// Project-relative path.
        subpath: String,
        /// Separator used in the subpath (default: TUGSCOPE_PATH_SEPARATOR or host).
        #[arg(long)]
        separator: Option<char>,
    },
    /// Print the code recorded for a module or one of its objects.
    Code {
        /// Path to the JSON manifest.
        manifest: PathBuf,
        /// Module subpath or locator.
        #[arg(long)]
        module: String,
        /// Dotted object name inside the module (e.g. `Widget.render`).
        #[arg(long)]
        object: Option<String>,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::from_error(&err);

            // Errors go to stdout as JSON, like every other response
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Snapshot { manifest } => {
            let response = run_snapshot(&manifest)?;
            emit_response(&response, &mut io::stdout())?;
        }
        Command::Locate { subpath, separator } => {
            let response = run_locate(&subpath, separator)?;
            emit_response(&response, &mut io::stdout())?;
        }
        Command::Code {
            manifest,
            module,
            object,
        } => {
            let response = run_code(&manifest, &module, object.as_deref())?;
            emit_response(&response, &mut io::stdout())?;
        }
    }
    let _ = io::stdout().flush();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_maps_to_tracing() {
        assert_eq!(LogLevel::Trace.to_tracing_level(), tracing::Level::TRACE);
        assert_eq!(LogLevel::Warn.to_tracing_level(), tracing::Level::WARN);
        assert_eq!(LogLevel::Error.to_tracing_level(), tracing::Level::ERROR);
    }

    #[test]
    fn parses_code_command() {
        let cli = Cli::try_parse_from([
            "tugscope",
            "--log-level",
            "debug",
            "code",
            "project.json",
            "--module",
            "pkg.widget",
            "--object",
            "Widget.render",
        ])
        .unwrap();

        match cli.command {
            Command::Code { module, object, .. } => {
                assert_eq!(module, "pkg.widget");
                assert_eq!(object.as_deref(), Some("Widget.render"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn separator_must_be_one_character() {
        assert!(Cli::try_parse_from(["tugscope", "locate", "a.py", "--separator", "::"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
