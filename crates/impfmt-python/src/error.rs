//! Engine error types.

use std::io;
use std::path::PathBuf;

use impfmt_cst::ParserError;
use thiserror::Error;

/// Errors raised by [`transform`](crate::transform) and friends.
///
/// Declined local-import rewrites are not errors; they are reported in
/// [`TransformOutcome::skipped`](crate::TransformOutcome::skipped).
#[derive(Debug, Error)]
pub enum EngineError {
    /// The source does not tokenize or parse.
    #[error("parse error: {0}")]
    Parse(ParserError),

    /// The source is above the size threshold and was not parsed.
    #[error("file is {size} bytes, above the {limit} byte limit")]
    FileTooBig { size: usize, limit: usize },

    /// The tree has a shape the import analysis does not recognize.
    #[error("internal shape error at line {line}: {message}")]
    InternalShape { message: String, line: u32 },

    /// A name handed to the engine is not a dotted Python identifier.
    #[error("invalid import name '{0}'")]
    InvalidName(String),

    /// Reading the input file failed.
    #[error("cannot read {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
}

impl EngineError {
    pub(crate) fn shape(message: impl Into<String>, line: u32) -> Self {
        EngineError::InternalShape {
            message: message.into(),
            line,
        }
    }
}

impl From<ParserError> for EngineError {
    fn from(err: ParserError) -> Self {
        match err {
            ParserError::FileTooBig { size, limit } => EngineError::FileTooBig { size, limit },
            other => EngineError::Parse(other),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_too_big_is_lifted() {
        let err = EngineError::from(ParserError::FileTooBig { size: 5, limit: 1 });
        assert!(matches!(err, EngineError::FileTooBig { size: 5, limit: 1 }));
    }

    #[test]
    fn syntax_errors_stay_parse_errors() {
        let err = EngineError::from(ParserError::SyntaxError {
            line: 2,
            column: 0,
            expected: "NAME".to_string(),
        });
        assert!(matches!(err, EngineError::Parse(_)));
        assert!(err.to_string().contains("2:0"));
    }
}
