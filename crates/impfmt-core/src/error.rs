//! Error types and error code constants for impfmt.
//!
//! `ImpfmtError` is the single error type the CLI renders. Engine errors are
//! bridged into it by the front end, which knows the file being processed.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad flags, unreadable config, missing file)
//! - `3`: Refused input (parse error or file above the size threshold)
//! - `4`: Write errors (failed to write the transformed file back)
//! - `10`: Internal errors (engine/grammar mismatch, unexpected state)

use std::fmt;

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output and process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller.
    InvalidArguments = 2,
    /// The input file was refused: malformed or too big.
    InputRefused = 3,
    /// Failed to write the result.
    WriteError = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for CLI output.
#[derive(Debug, Error)]
pub enum ImpfmtError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments {
        message: String,
        details: Option<serde_json::Value>,
    },

    /// File not found or unreadable.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// The file does not parse.
    #[error("parse error in {file}: {message}")]
    ParseError {
        file: String,
        line: Option<u32>,
        message: String,
    },

    /// The file exceeds the size threshold and was not parsed.
    #[error("{file} is {size} bytes, above the {limit} byte limit")]
    FileTooBig {
        file: String,
        size: usize,
        limit: usize,
    },

    /// Failed to write output.
    #[error("write error: {message}")]
    WriteError {
        message: String,
        file: Option<String>,
    },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&ImpfmtError> for OutputErrorCode {
    fn from(err: &ImpfmtError) -> Self {
        match err {
            ImpfmtError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            ImpfmtError::FileNotFound { .. } => OutputErrorCode::InvalidArguments,
            ImpfmtError::ParseError { .. } => OutputErrorCode::InputRefused,
            ImpfmtError::FileTooBig { .. } => OutputErrorCode::InputRefused,
            ImpfmtError::WriteError { .. } => OutputErrorCode::WriteError,
            ImpfmtError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<ImpfmtError> for OutputErrorCode {
    fn from(err: ImpfmtError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Bridge: ConfigError -> ImpfmtError
// ============================================================================

impl From<crate::config::ConfigError> for ImpfmtError {
    fn from(err: crate::config::ConfigError) -> Self {
        use crate::config::ConfigError;
        match err {
            ConfigError::Io { path, source } => ImpfmtError::InvalidArguments {
                message: format!("cannot read config {}: {}", path.display(), source),
                details: None,
            },
            ConfigError::Json { path, source } => ImpfmtError::InvalidArguments {
                message: format!("invalid config {}: {}", path.display(), source),
                details: Some(serde_json::json!({
                    "line": source.line(),
                    "column": source.column(),
                })),
            },
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl ImpfmtError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        ImpfmtError::InvalidArguments {
            message: message.into(),
            details: None,
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        ImpfmtError::FileNotFound { path: path.into() }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ImpfmtError::InternalError {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Tests
// ============================================================================
