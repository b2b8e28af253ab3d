// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

mod errors;
mod grammar;

pub use errors::{ParserError, Result};
use grammar::{build_tree, python, TokVec};

use crate::nodes::{SyntaxKind, Tree};
use crate::tokenizer::tokenize;

/// Inputs larger than this are refused before tokenizing.
pub const DEFAULT_MAX_FILE_SIZE: usize = 1024 * 1024;

/// Options controlling [`parse_module_with_options`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Size threshold in bytes; `None` disables the check.
    pub max_file_size: Option<usize>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_file_size: Some(DEFAULT_MAX_FILE_SIZE),
        }
    }
}

impl ParseOptions {
    pub fn with_max_file_size(mut self, limit: Option<usize>) -> Self {
        self.max_file_size = limit;
        self
    }
}

/// Parses a module with default options.
pub fn parse_module(text: &str) -> Result<Tree> {
    parse_module_with_options(text, ParseOptions::default())
}

/// Parses a module into a lossless [`Tree`].
///
/// The size threshold is checked first so that oversized inputs are refused
/// without ever reaching the tokenizer.
///
/// # Errors
///
/// [`ParserError::FileTooBig`], [`ParserError::TokenizerError`] or
/// [`ParserError::SyntaxError`].
pub fn parse_module_with_options(text: &str, options: ParseOptions) -> Result<Tree> {
    if let Some(limit) = options.max_file_size {
        if text.len() > limit {
            return Err(ParserError::FileTooBig {
                size: text.len(),
                limit,
            });
        }
    }
    let tokvec: TokVec = tokenize(text)?.into();
    let syn = python::file(&tokvec).map_err(|err| ParserError::SyntaxError {
        line: err.location.line,
        column: err.location.column,
        expected: err.expected.to_string(),
    })?;
    let tree = build_tree(&tokvec, syn);
    debug_assert_eq!(tree.syntax_kind(tree.root()), Some(SyntaxKind::Module));
    Ok(tree)
}
