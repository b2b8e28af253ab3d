//! Binary entry point for the impfmt CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Reorganize imports in place
//! impfmt fix src/app.py src/util.py
//!
//! # Report files that would change, without writing
//! impfmt fix --check src/app.py
//!
//! # Rewrite a moved module while reorganizing
//! impfmt fix --rename legacy.api=core.api src/app.py
//!
//! # List imported names as JSON
//! impfmt --format json list src/app.py
//!
//! # Add an import to the top block
//! impfmt add src/app.py os.path.join
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use impfmt::cli::{load_options, parse_rename, run_add, run_fix, run_list, Overrides};
use impfmt_core::error::ImpfmtError;
use impfmt_core::output::{emit_response, ErrorResponse, FileStatus, FixResponse, ListResponse};
use impfmt_python::TransformOptions;

/// Exit status of `fix --check` when some file would change.
const EXIT_WOULD_CHANGE: u8 = 1;

// ============================================================================
// CLI Structure
// ============================================================================

/// Sort, deduplicate and rewrite Python import blocks.
#[derive(Parser, Debug)]
#[command(name = "impfmt", version, about = "Sort, deduplicate and rewrite Python import blocks")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// JSON configuration file (default: .impfmt.json in the current directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

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

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One line per file or symbol.
    #[default]
    Text,
    /// Full JSON response.
    Json,
}

/// Flags that adjust the transformation options.
#[derive(Parser, Debug)]
struct TransformArgs {
    /// Page width for regenerated import statements.
    #[arg(long)]
    width: Option<usize>,

    /// Rename a module or symbol, in `<old>=<new>` format. Repeatable.
    #[arg(long = "rename", value_parser = parse_rename)]
    renames: Vec<(String, String)>,

    /// Apply the rename map from new names back to old names.
    #[arg(long)]
    invert: bool,

    /// Do not rewrite package-level imports to their defining submodule.
    #[arg(long)]
    no_local_imports: bool,
}

impl TransformArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            page_width: self.width,
            renames: self.renames.clone(),
            invert: self.invert,
            no_local_imports: self.no_local_imports,
        }
    }
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Reorganize the imports of Python files in place.
    Fix {
        /// Files to process.
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Report what would change without writing.
        #[arg(long)]
        check: bool,

        #[command(flatten)]
        transform: TransformArgs,
    },
    /// List every imported name of a file.
    List {
        /// File to inspect.
        path: PathBuf,
    },
    /// Add an import to the top import block of a file.
    Add {
        /// File to change.
        path: PathBuf,

        /// Dotted name to import (`a.b.c` becomes `from a.b import c`).
        name: String,

        /// Report whether the file would change without writing.
        #[arg(long)]
        check: bool,

        /// Page width for regenerated import statements.
        #[arg(long)]
        width: Option<usize>,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level);

    let format = cli.global.format;
    match execute(cli) {
        Ok(code) => code,
        Err(err) => {
            let code = err.error_code().code();
            match format {
                // Errors go to stdout in JSON mode so callers parse one stream.
                OutputFormat::Json => {
                    let _ = emit_response(&ErrorResponse::new(&err), &mut io::stdout());
                    let _ = io::stdout().flush();
                }
                OutputFormat::Text => eprintln!("error: {}", err),
            }
            ExitCode::from(code)
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
fn execute(cli: Cli) -> Result<ExitCode, ImpfmtError> {
    let global = &cli.global;
    match &cli.command {
        Command::Fix {
            paths,
            check,
            transform,
        } => {
            let options = options(global, &transform.overrides())?;
            let response = run_fix(paths, options, *check);
            emit_fix(&response, global.format, *check)?;
            Ok(fix_exit_code(&response, *check))
        }
        Command::List { path } => {
            let response = run_list(path)?;
            emit_list(&response, global.format)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Add {
            path,
            name,
            check,
            width,
        } => {
            let overrides = Overrides {
                page_width: *width,
                ..Overrides::default()
            };
            let options = options(global, &overrides)?;
            let response = run_add(path, name, &options, *check)?;
            emit_fix(&response, global.format, *check)?;
            Ok(fix_exit_code(&response, *check))
        }
    }
}

fn options(global: &GlobalArgs, overrides: &Overrides) -> Result<TransformOptions, ImpfmtError> {
    let cwd = std::env::current_dir()
        .map_err(|e| ImpfmtError::internal(format!("cannot read working directory: {}", e)))?;
    load_options(global.config.as_deref(), &cwd, overrides)
}

/// The first failed file decides the exit status. Without failures, `--check`
/// exits non-zero when something would change.
fn fix_exit_code(response: &FixResponse, check: bool) -> ExitCode {
    if let Some(info) = response.files.iter().find_map(|file| file.error.as_ref()) {
        return ExitCode::from(info.code);
    }
    if check && response.summary.files_changed > 0 {
        return ExitCode::from(EXIT_WOULD_CHANGE);
    }
    ExitCode::SUCCESS
}

// ============================================================================
// Output
// ============================================================================

fn write_error(e: io::Error) -> ImpfmtError {
    ImpfmtError::WriteError {
        message: e.to_string(),
        file: None,
    }
}

fn emit_fix(response: &FixResponse, format: OutputFormat, check: bool) -> Result<(), ImpfmtError> {
    let mut out = io::stdout().lock();
    match format {
        OutputFormat::Json => emit_response(response, &mut out).map_err(write_error)?,
        OutputFormat::Text => {
            for file in &response.files {
                let line = match (file.status, &file.error) {
                    (FileStatus::Changed, _) if check => writeln!(out, "would fix {}", file.file),
                    (FileStatus::Changed, _) => writeln!(out, "fixed {}", file.file),
                    (FileStatus::Failed, Some(error)) => {
                        writeln!(out, "failed {}: {}", file.file, error.message)
                    }
                    _ => Ok(()),
                };
                line.map_err(write_error)?;
            }
            let summary = &response.summary;
            writeln!(
                out,
                "{} checked, {} {}, {} failed",
                summary.files_checked,
                summary.files_changed,
                if check { "would change" } else { "changed" },
                summary.files_failed
            )
            .map_err(write_error)?;
        }
    }
    out.flush().map_err(write_error)
}

fn emit_list(response: &ListResponse, format: OutputFormat) -> Result<(), ImpfmtError> {
    let mut out = io::stdout().lock();
    match format {
        OutputFormat::Json => emit_response(response, &mut out).map_err(write_error)?,
        OutputFormat::Text => {
            for symbol in &response.symbols {
                writeln!(out, "{}:{}: {}", response.file, symbol.line, symbol.name)
                    .map_err(write_error)?;
            }
        }
    }
    out.flush().map_err(write_error)
}
