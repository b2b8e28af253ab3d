//! Command implementations for the `impfmt` binary.
//!
//! - `fix` - reorganize the imports of one or more files
//! - `list` - report every imported name of a file
//! - `add` - add an import to the top block of a file
//!
//! ## Error Handling
//!
//! Engine errors are bridged into [`ImpfmtError`] here, where the file being
//! processed is known. `fix` keeps going after a file fails and records the
//! failure in that file's report; `list` and `add` fail as a whole.

use std::fs;
use std::path::{Path, PathBuf};

use impfmt_core::config;
use impfmt_core::error::ImpfmtError;
use impfmt_core::output::{FileReport, FixResponse, ListResponse, SkipInfo, SymbolEntry};
use impfmt_cst::prettify_error;
use impfmt_python::{
    add_import_symbol, list_imported_symbols, Engine, EngineError, SkippedResolution,
    TransformOptions, TransformOutcome,
};
use tracing::{debug, info, warn};

// ============================================================================
// Options
// ============================================================================

/// Command-line settings layered over the configuration file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub page_width: Option<usize>,
    pub renames: Vec<(String, String)>,
    pub invert: bool,
    pub no_local_imports: bool,
}

impl Overrides {
    pub fn apply(&self, options: &mut TransformOptions) {
        if let Some(width) = self.page_width {
            options.page_width = width;
        }
        for (old, new) in &self.renames {
            options.rename_map.insert(old.clone(), new.clone());
        }
        if self.invert {
            options.invert_rename_map = true;
        }
        if self.no_local_imports {
            options.resolve_local_imports = Some(false);
        }
    }
}

/// Parse a rename in `<old>=<new>` format.
pub fn parse_rename(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((old, new)) if !old.is_empty() && !new.is_empty() => {
            Ok((old.to_string(), new.to_string()))
        }
        _ => Err(format!(
            "invalid rename '{}', expected '<old>=<new>' (e.g., 'pkg.old=pkg.new')",
            s
        )),
    }
}

/// Load the configuration file, if any, and apply `overrides` on top.
///
/// `explicit` must exist when given. Otherwise `.impfmt.json` in `dir` is
/// used when present.
pub fn load_options(
    explicit: Option<&Path>,
    dir: &Path,
    overrides: &Overrides,
) -> Result<TransformOptions, ImpfmtError> {
    let mut options: TransformOptions =
        config::load_or_discover(explicit, dir)?.unwrap_or_default();
    overrides.apply(&mut options);
    if options.page_width == 0 {
        return Err(ImpfmtError::invalid_args("page width must be at least 1"));
    }
    Ok(options)
}

// ============================================================================
// Error Bridge
// ============================================================================

/// Convert an engine error for `file` into the CLI error type.
///
/// `source` is the file content, used to point at the offending line of a
/// parse error in the log.
pub fn bridge_error(err: EngineError, file: &Path, source: Option<&str>) -> ImpfmtError {
    let label = file.display().to_string();
    match err {
        EngineError::Parse(parse) => {
            if let Some(source) = source {
                warn!("{}", prettify_error(&parse, source, &label));
            }
            ImpfmtError::ParseError {
                file: label,
                line: parse.line(),
                message: parse.to_string(),
            }
        }
        EngineError::FileTooBig { size, limit } => ImpfmtError::FileTooBig {
            file: label,
            size,
            limit,
        },
        EngineError::InvalidName(name) => {
            ImpfmtError::invalid_args(format!("'{}' is not a dotted Python name", name))
        }
        EngineError::InternalShape { message, line } => {
            ImpfmtError::internal(format!("{}:{}: {}", label, line, message))
        }
        EngineError::Io { path, .. } => ImpfmtError::file_not_found(path.display().to_string()),
    }
}

fn read_source(path: &Path) -> Result<String, ImpfmtError> {
    fs::read_to_string(path).map_err(|err| {
        debug!(path = %path.display(), error = %err, "cannot read file");
        ImpfmtError::file_not_found(path.display().to_string())
    })
}

fn write_source(path: &Path, text: &str) -> Result<(), ImpfmtError> {
    fs::write(path, text).map_err(|err| ImpfmtError::WriteError {
        message: err.to_string(),
        file: Some(path.display().to_string()),
    })
}

fn skip_infos(skipped: &[SkippedResolution]) -> Vec<SkipInfo> {
    skipped
        .iter()
        .map(|skip| SkipInfo {
            name: skip.name.clone(),
            line: skip.line,
            reason: skip.reason.as_str().to_string(),
        })
        .collect()
}

// ============================================================================
// Commands
// ============================================================================

/// Reorganize the imports of every file in `paths`.
///
/// Files are written only when their imports changed and `check` is false.
/// One engine serves the whole run, so each package aggregator is read at
/// most once.
pub fn run_fix(paths: &[PathBuf], options: TransformOptions, check: bool) -> FixResponse {
    let mut engine = Engine::new(options);
    let reports = paths
        .iter()
        .map(|path| match fix_file(&mut engine, path, check) {
            Ok(report) => report,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "file not processed");
                FileReport::failed(path.display().to_string(), &err)
            }
        })
        .collect();
    FixResponse::new(reports)
}

fn fix_file(engine: &mut Engine, path: &Path, check: bool) -> Result<FileReport, ImpfmtError> {
    let source = read_source(path)?;
    let outcome = engine
        .transform_source(&source, Some(path))
        .map_err(|err| bridge_error(err, path, Some(&source)))?;
    finish(path, outcome, check)
}

fn finish(path: &Path, outcome: TransformOutcome, check: bool) -> Result<FileReport, ImpfmtError> {
    if outcome.changed && !check {
        write_source(path, &outcome.output)?;
        info!(path = %path.display(), "rewrote imports");
    }
    Ok(FileReport::changed(
        path.display().to_string(),
        outcome.changed,
        skip_infos(&outcome.skipped),
    ))
}

/// Every imported name of the file at `path`.
pub fn run_list(path: &Path) -> Result<ListResponse, ImpfmtError> {
    let source = read_source(path)?;
    let symbols = list_imported_symbols(&source)
        .map_err(|err| bridge_error(err, path, Some(&source)))?
        .into_iter()
        .map(|symbol| SymbolEntry {
            name: symbol.name,
            line: symbol.line,
        })
        .collect();
    Ok(ListResponse::new(path.display().to_string(), symbols))
}

/// Add an import of `name` to the file at `path`.
pub fn run_add(
    path: &Path,
    name: &str,
    options: &TransformOptions,
    check: bool,
) -> Result<FixResponse, ImpfmtError> {
    let source = read_source(path)?;
    let outcome = add_import_symbol(&source, name, options)
        .map_err(|err| bridge_error(err, path, Some(&source)))?;
    let report = finish(path, outcome, check)?;
    Ok(FixResponse::new(vec![report]))
}

// ============================================================================
// Tests
// ============================================================================
