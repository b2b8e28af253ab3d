// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! A lossless Python tokenizer, parser and Concrete Syntax Tree (CST).
//!
//! Every byte of the input ends up in a leaf: either as a token value or as
//! the *prefix* (whitespace, comments, line continuations) in front of it.
//! Rendering an untouched tree therefore reproduces the input exactly.
//!
//! # Overview
//!
//! - **Parsing**: [`parse_module`] or [`parse_module_with_options`] to apply a
//!   size threshold before tokenizing.
//! - **Tree**: an arena of [`NodeId`]-addressed nodes with parent links and
//!   atomic [`Tree::splice`] edits.
//! - **Traversal**: the [`Visitor`] trait and [`walk`].
//!
//! # Quick Start
//!
//! ```
//! use impfmt_cst::parse_module;
//!
//! let source = "import os  # needed\n\ndef f():\n    return os.sep\n";
//! let tree = parse_module(source).expect("parse error");
//! assert_eq!(tree.render(), source);
//! ```

// ============================================================================
// Public modules and re-exports
// ============================================================================

/// Tokenizer for Python source code.
pub mod tokenizer;
pub use tokenizer::{tokenize, TokError, TokErrorKind, TokType, Token};

/// Visitor infrastructure for tree traversal.
pub mod visitor;
pub use visitor::{walk, walk_children, VisitResult, Visitor};

mod nodes;
pub use nodes::*;

mod parser;
pub use parser::{
    parse_module, parse_module_with_options, ParseOptions, ParserError, Result,
    DEFAULT_MAX_FILE_SIZE,
};

// ============================================================================
// Error formatting
// ============================================================================

/// Returns the byte offset of the beginning of line `n` (1-indexed).
fn bol_offset(source: &str, n: u32) -> usize {
    if n <= 1 {
        return 0;
    }
    source
        .match_indices('\n')
        .nth((n - 2) as usize)
        .map(|(index, _)| index + 1)
        .unwrap_or(source.len())
}

/// Formats a parser error with the offending source line highlighted.
///
/// # Example
///
/// ```
/// use impfmt_cst::{parse_module, prettify_error};
///
/// let source = "from import x\n";
/// if let Err(e) = parse_module(source) {
///     let formatted = prettify_error(&e, source, "example.py");
///     assert!(formatted.contains("example.py"));
/// }
/// ```
pub fn prettify_error(err: &ParserError, source: &str, label: &str) -> String {
    let (Some(line), Some(column)) = (err.line(), err.column()) else {
        return format!("Parse error for {}: {}", label, err);
    };
    use annotate_snippets::{Level, Renderer, Snippet};

    let start_offset = bol_offset(source, line);
    let end_offset = bol_offset(source, line + 1);
    let text = &source[start_offset..end_offset];
    let start = text
        .char_indices()
        .nth(column as usize)
        .map_or(text.len(), |(offset, _)| offset);
    let end = start + text[start..].chars().next().map_or(0, char::len_utf8);
    let message = err.to_string();
    let rendered = Renderer::plain()
        .render(
            Level::Error.title(label).snippet(
                Snippet::source(text)
                    .line_start(line as usize)
                    .fold(false)
                    .annotation(Level::Error.span(start..end).label(&message)),
            ),
        )
        .to_string();
    rendered
}

// ============================================================================
// Tests
// ============================================================================
