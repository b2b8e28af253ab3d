//! JSON output types and serialization for CLI responses.
//!
//! ## Design Principles
//!
//! 1. **Status first:** every response has `status` as its first field
//! 2. **Deterministic:** same input, same output (field order, array ordering)
//! 3. **Nullable vs absent:** absent field means "not applicable"
//! 4. **Versioned:** `schema_version` enables forward compatibility

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{ImpfmtError, OutputErrorCode};

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Error Types
// ============================================================================

/// Error information for error responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code (also the process exit status).
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Error-specific structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorInfo {
    /// Create from an ImpfmtError.
    pub fn from_error(err: &ImpfmtError) -> Self {
        let code = OutputErrorCode::from(err).code();
        let message = err.to_string();
        let details = match err {
            ImpfmtError::InvalidArguments { details, .. } => details.clone(),
            ImpfmtError::FileNotFound { path } => Some(serde_json::json!({ "path": path })),
            ImpfmtError::ParseError { file, line, .. } => {
                Some(serde_json::json!({ "file": file, "line": line }))
            }
            ImpfmtError::FileTooBig { file, size, limit } => Some(serde_json::json!({
                "file": file,
                "size": size,
                "limit": limit,
            })),
            ImpfmtError::WriteError { file, .. } => {
                file.as_ref().map(|f| serde_json::json!({ "file": f }))
            }
            ImpfmtError::InternalError { .. } => None,
        };
        ErrorInfo {
            code,
            message,
            details,
        }
    }
}

/// Response emitted when a command fails as a whole.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn new(err: &ImpfmtError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

// ============================================================================
// Per-file Reports
// ============================================================================

/// Outcome of processing one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Unchanged,
    Changed,
    Failed,
}

/// A local-import rewrite that was declined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipInfo {
    pub name: String,
    pub line: u32,
    pub reason: String,
}

/// Report for one processed file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub file: String,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub skipped: Vec<SkipInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl FileReport {
    pub fn changed(file: impl Into<String>, changed: bool, skipped: Vec<SkipInfo>) -> Self {
        FileReport {
            file: file.into(),
            status: if changed {
                FileStatus::Changed
            } else {
                FileStatus::Unchanged
            },
            skipped,
            error: None,
        }
    }

    pub fn failed(file: impl Into<String>, err: &ImpfmtError) -> Self {
        FileReport {
            file: file.into(),
            status: FileStatus::Failed,
            skipped: Vec::new(),
            error: Some(ErrorInfo::from_error(err)),
        }
    }
}

/// Totals over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub files_checked: u32,
    pub files_changed: u32,
    pub files_failed: u32,
}

impl Summary {
    pub fn from_reports(reports: &[FileReport]) -> Self {
        let mut summary = Summary::default();
        for report in reports {
            summary.files_checked += 1;
            match report.status {
                FileStatus::Changed => summary.files_changed += 1,
                FileStatus::Failed => summary.files_failed += 1,
                FileStatus::Unchanged => {}
            }
        }
        summary
    }
}

/// Response for `fix` and `add`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixResponse {
    pub status: String,
    pub schema_version: String,
    pub files: Vec<FileReport>,
    pub summary: Summary,
}

impl FixResponse {
    pub fn new(files: Vec<FileReport>) -> Self {
        let summary = Summary::from_reports(&files);
        FixResponse {
            status: if summary.files_failed == 0 { "ok" } else { "error" }.to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            files,
            summary,
        }
    }
}

/// One imported name, as reported by `list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolEntry {
    pub name: String,
    pub line: u32,
}

/// Response for `list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub status: String,
    pub schema_version: String,
    pub file: String,
    pub symbols: Vec<SymbolEntry>,
}

impl ListResponse {
    pub fn new(file: impl Into<String>, symbols: Vec<SymbolEntry>) -> Self {
        ListResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            file: file.into(),
            symbols,
        }
    }
}

// ============================================================================
// Emission
// ============================================================================

/// Emit a response as pretty JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================
