// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

use crate::tokenizer::TokError;

#[allow(clippy::enum_variant_names)]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParserError {
    #[error("file is {size} bytes, larger than the {limit} byte limit")]
    FileTooBig { size: usize, limit: usize },
    #[error("tokenizer error: {0}")]
    TokenizerError(#[from] TokError),
    #[error("syntax error at {line}:{column}: expected {expected}")]
    SyntaxError {
        line: u32,
        column: u32,
        expected: String,
    },
}

impl ParserError {
    /// Source line the error points at, if any.
    pub fn line(&self) -> Option<u32> {
        match self {
            ParserError::FileTooBig { .. } => None,
            ParserError::TokenizerError(err) => Some(err.line),
            ParserError::SyntaxError { line, .. } => Some(*line),
        }
    }

    pub fn column(&self) -> Option<u32> {
        match self {
            ParserError::FileTooBig { .. } => None,
            ParserError::TokenizerError(err) => Some(err.column),
            ParserError::SyntaxError { column, .. } => Some(*column),
        }
    }
}

pub type Result<T> = std::result::Result<T, ParserError>;
