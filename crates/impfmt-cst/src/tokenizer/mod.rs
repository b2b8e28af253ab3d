// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Lossless tokenizer for Python source code.
//!
//! Every byte of the input ends up either in a token's `value` or in the
//! `prefix` of the token that follows it. Whitespace, comments, blank lines,
//! backslash continuations and newlines inside brackets are all prefix text,
//! which makes `concat(prefix + value)` over the token stream equal to the
//! input.
//!
//! `Indent` and `Dedent` tokens are zero-width: their value and prefix are
//! always empty, and the indentation whitespace of the line stays in the
//! prefix of the first real token on that line.
//!
//! Lines are 1-indexed, columns are 0-indexed and count `char`s.

use std::fmt;

use thiserror::Error;


/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokType {
    /// Identifier or keyword.
    Name,
    /// Numeric literal.
    Number,
    /// String literal, including any prefix (`b`, `rb`, `f`, ...).
    String,
    /// Operator or delimiter.
    Op,
    /// End of a logical line. The value is empty for the synthetic newline at EOF.
    Newline,
    /// Start of an indented block.
    Indent,
    /// End of an indented block.
    Dedent,
    /// End of input. Its prefix holds any trailing comments and blank lines.
    EndMarker,
}

impl TokType {
    /// Returns the name used in diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokType::Name => "NAME",
            TokType::Number => "NUMBER",
            TokType::String => "STRING",
            TokType::Op => "OP",
            TokType::Newline => "NEWLINE",
            TokType::Indent => "INDENT",
            TokType::Dedent => "DEDENT",
            TokType::EndMarker => "ENDMARKER",
        }
    }
}

impl fmt::Display for TokType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single token with the whitespace and comments preceding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokType,
    pub value: String,
    pub prefix: String,
    /// Line of the first character of `value` (1-indexed).
    pub line: u32,
    /// Column of the first character of `value` (0-indexed, in chars).
    pub column: u32,
}

/// What went wrong while tokenizing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokErrorKind {
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated triple-quoted string literal")]
    UnterminatedTripleQuotedString,
    #[error("unindent does not match any outer indentation level")]
    InconsistentDedent,
    #[error("unmatched '{0}'")]
    UnmatchedClosingBracket(char),
    #[error("closing '{close}' does not match opening '{open}'")]
    MismatchedBracket { open: char, close: char },
    #[error("'{0}' was never closed")]
    UnclosedBracket(char),
    #[error("unexpected end of file after line continuation")]
    ContinuationAtEof,
    #[error("unexpected character after line continuation")]
    BadContinuation,
    #[error("invalid character '{0}'")]
    BadCharacter(char),
}

/// A tokenizer failure with its position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} (line {line}, column {column})")]
pub struct TokError {
    pub kind: TokErrorKind,
    pub line: u32,
    pub column: u32,
}

const OPERATORS_3: &[&str] = &["**=", "//=", ">>=", "<<=", "..."];
const OPERATORS_2: &[&str] = &[
    "!=", "%=", "&=", "**", "*=", "+=", "-=", "->", "//", "/=", ":=", "<<", "<=", "<>", "==",
    ">=", ">>", "@=", "^=", "|=",
];
const OPERATORS_1: &str = "%&()*+,-./:;<=>@[]^{|}~";

/// Tokenizes Python source into a lossless token stream ending in `EndMarker`.
///
/// # Errors
///
/// Returns a [`TokError`] for unterminated strings, unbalanced brackets,
/// inconsistent dedents and characters that cannot start a token.
pub fn tokenize(text: &str) -> Result<Vec<Token>, TokError> {
    Tokenizer::new(text).run()
}

/// Incremental state of one tokenizer run.
pub struct Tokenizer<'t> {
    text: &'t str,
    pos: usize,
    line: u32,
    column: u32,
    prefix: String,
    tokens: Vec<Token>,
    indent_stack: Vec<usize>,
    brackets: Vec<(char, u32, u32)>,
    at_line_start: bool,
    line_has_tokens: bool,
}

impl<'t> Tokenizer<'t> {
    pub fn new(text: &'t str) -> Self {
        Self {
            text,
            pos: 0,
            line: 1,
            column: 0,
            prefix: String::new(),
            tokens: Vec::new(),
            indent_stack: vec![0],
            brackets: Vec::new(),
            at_line_start: true,
            line_has_tokens: false,
        }
    }

    /// Consume the whole input.
    pub fn run(mut self) -> Result<Vec<Token>, TokError> {
        loop {
            if self.at_line_start && self.brackets.is_empty() {
                if !self.start_line()? {
                    break;
                }
                continue;
            }

            self.skip_inline_whitespace();
            let Some(c) = self.peek() else { break };
            match c {
                '#' => self.comment_into_prefix(),
                '\\' => self.continuation()?,
                '\n' | '\r' => {
                    if self.brackets.is_empty() {
                        let (start, line, column) = (self.pos, self.line, self.column);
                        self.bump_newline();
                        self.emit(TokType::Newline, start, line, column);
                        self.at_line_start = true;
                        self.line_has_tokens = false;
                    } else {
                        let start = self.pos;
                        self.bump_newline();
                        self.prefix.push_str(&self.text[start..self.pos]);
                    }
                }
                c if c == '_' || c.is_alphabetic() => self.name_or_string()?,
                c if c.is_ascii_digit() => self.number(),
                '.' if self.peek_at(1).is_some_and(|n| n.is_ascii_digit()) => self.number(),
                '"' | '\'' => {
                    let (start, line, column) = (self.pos, self.line, self.column);
                    self.string_body(line, column)?;
                    self.emit(TokType::String, start, line, column);
                }
                _ => self.operator()?,
            }
        }
        self.finish()
    }

    // ------------------------------------------------------------------------
    // Cursor helpers
    // ------------------------------------------------------------------------

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.text[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        match c {
            '\n' => {
                self.line += 1;
                self.column = 0;
            }
            '\r' if self.peek() != Some('\n') => {
                self.line += 1;
                self.column = 0;
            }
            _ => self.column += 1,
        }
        Some(c)
    }

    /// Consume one `\n`, `\r\n` or `\r`.
    fn bump_newline(&mut self) {
        if self.bump() == Some('\r') && self.peek() == Some('\n') {
            self.bump();
        }
    }

    fn error(&self, kind: TokErrorKind, line: u32, column: u32) -> TokError {
        TokError { kind, line, column }
    }

    fn emit(&mut self, kind: TokType, start: usize, line: u32, column: u32) {
        let prefix = std::mem::take(&mut self.prefix);
        self.tokens.push(Token {
            kind,
            value: self.text[start..self.pos].to_string(),
            prefix,
            line,
            column,
        });
        if !matches!(kind, TokType::Newline) {
            self.line_has_tokens = true;
        }
    }

    fn emit_zero_width(&mut self, kind: TokType) {
        self.tokens.push(Token {
            kind,
            value: String::new(),
            prefix: String::new(),
            line: self.line,
            column: self.column,
        });
    }

    // ------------------------------------------------------------------------
    // Whitespace, comments and indentation
    // ------------------------------------------------------------------------

    /// Handle the start of a physical line outside brackets.
    ///
    /// Blank and comment-only lines are folded into the prefix. Returns
    /// `false` at end of input.
    fn start_line(&mut self) -> Result<bool, TokError> {
        let mut width = 0usize;
        let start = self.pos;
        while let Some(c) = self.peek() {
            match c {
                ' ' => width += 1,
                '\t' => width = (width / 8 + 1) * 8,
                '\x0c' => width = 0,
                '\u{feff}' if self.pos == 0 => {}
                _ => break,
            }
            self.bump();
        }
        self.prefix.push_str(&self.text[start..self.pos]);

        match self.peek() {
            None => return Ok(false),
            Some('#') => {
                self.comment_into_prefix();
                if self.peek().is_some() {
                    let start = self.pos;
                    self.bump_newline();
                    self.prefix.push_str(&self.text[start..self.pos]);
                }
                return Ok(true);
            }
            Some('\n') | Some('\r') => {
                let start = self.pos;
                self.bump_newline();
                self.prefix.push_str(&self.text[start..self.pos]);
                return Ok(true);
            }
            Some(_) => {}
        }

        self.at_line_start = false;
        let current = self.indent_stack.last().copied().unwrap_or(0);
        if width > current {
            self.indent_stack.push(width);
            self.emit_zero_width(TokType::Indent);
        } else {
            while width < self.indent_stack.last().copied().unwrap_or(0) {
                self.indent_stack.pop();
                self.emit_zero_width(TokType::Dedent);
            }
            if width != self.indent_stack.last().copied().unwrap_or(0) {
                return Err(self.error(TokErrorKind::InconsistentDedent, self.line, self.column));
            }
        }
        Ok(true)
    }

    fn skip_inline_whitespace(&mut self) {
        let start = self.pos;
        while matches!(self.peek(), Some(' ' | '\t' | '\x0c')) {
            self.bump();
        }
        self.prefix.push_str(&self.text[start..self.pos]);
    }

    /// Move a `#` comment (without its newline) into the prefix.
    fn comment_into_prefix(&mut self) {
        let rest = &self.text.as_bytes()[self.pos..];
        let len = memchr::memchr2(b'\n', b'\r', rest).unwrap_or(rest.len());
        let comment = &self.text[self.pos..self.pos + len];
        self.prefix.push_str(comment);
        self.column += comment.chars().count() as u32;
        self.pos += len;
    }

    fn continuation(&mut self) -> Result<(), TokError> {
        let (line, column) = (self.line, self.column);
        let start = self.pos;
        self.bump();
        match self.peek() {
            Some('\n') | Some('\r') => {
                self.bump_newline();
                self.prefix.push_str(&self.text[start..self.pos]);
                if self.peek().is_none() {
                    return Err(self.error(TokErrorKind::ContinuationAtEof, line, column));
                }
                Ok(())
            }
            None => Err(self.error(TokErrorKind::ContinuationAtEof, line, column)),
            Some(_) => Err(self.error(TokErrorKind::BadContinuation, line, column)),
        }
    }

    // ------------------------------------------------------------------------
    // Tokens
    // ------------------------------------------------------------------------

    fn name_or_string(&mut self) -> Result<(), TokError> {
        let (start, line, column) = (self.pos, self.line, self.column);
        while self.peek().is_some_and(|c| c == '_' || c.is_alphanumeric()) {
            self.bump();
        }
        if matches!(self.peek(), Some('"' | '\'')) && is_string_prefix(&self.text[start..self.pos]) {
            self.string_body(line, column)?;
            self.emit(TokType::String, start, line, column);
        } else {
            self.emit(TokType::Name, start, line, column);
        }
        Ok(())
    }

    /// Consume a quoted string body starting at the opening quote.
    fn string_body(&mut self, line: u32, column: u32) -> Result<(), TokError> {
        let Some(quote) = self.bump() else {
            return Err(self.error(TokErrorKind::UnterminatedString, line, column));
        };
        if self.peek() == Some(quote) && self.peek_at(1) == Some(quote) {
            self.bump();
            self.bump();
            loop {
                match self.bump() {
                    None => {
                        return Err(self.error(
                            TokErrorKind::UnterminatedTripleQuotedString,
                            line,
                            column,
                        ))
                    }
                    Some('\\') => {
                        if self.bump() == Some('\r') && self.peek() == Some('\n') {
                            self.bump();
                        }
                    }
                    Some(c)
                        if c == quote
                            && self.peek() == Some(quote)
                            && self.peek_at(1) == Some(quote) =>
                    {
                        self.bump();
                        self.bump();
                        return Ok(());
                    }
                    Some(_) => {}
                }
            }
        }
        loop {
            match self.peek() {
                None | Some('\n') | Some('\r') => {
                    return Err(self.error(TokErrorKind::UnterminatedString, line, column))
                }
                Some('\\') => {
                    self.bump();
                    match self.peek() {
                        None => {
                            return Err(self.error(TokErrorKind::UnterminatedString, line, column))
                        }
                        Some('\n') | Some('\r') => self.bump_newline(),
                        Some(_) => {
                            self.bump();
                        }
                    }
                }
                Some(c) if c == quote => {
                    self.bump();
                    return Ok(());
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    fn number(&mut self) {
        let (start, line, column) = (self.pos, self.line, self.column);
        if self.peek() == Some('0')
            && matches!(self.peek_at(1), Some('x' | 'X' | 'o' | 'O' | 'b' | 'B'))
        {
            self.bump();
            self.bump();
            while self.peek().is_some_and(|c| c == '_' || c.is_ascii_alphanumeric()) {
                self.bump();
            }
        } else {
            self.digits();
            if self.peek() == Some('.') {
                self.bump();
                self.digits();
            }
            if matches!(self.peek(), Some('e' | 'E')) {
                let signed = matches!(self.peek_at(1), Some('+' | '-'))
                    && self.peek_at(2).is_some_and(|c| c.is_ascii_digit());
                if signed || self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
                    self.bump();
                    if signed {
                        self.bump();
                    }
                    self.digits();
                }
            }
            if matches!(self.peek(), Some('j' | 'J' | 'l' | 'L')) {
                self.bump();
            }
        }
        self.emit(TokType::Number, start, line, column);
    }

    fn digits(&mut self) {
        while self.peek().is_some_and(|c| c == '_' || c.is_ascii_digit()) {
            self.bump();
        }
    }

    fn operator(&mut self) -> Result<(), TokError> {
        let (start, line, column) = (self.pos, self.line, self.column);
        let rest = &self.text[self.pos..];
        let len = OPERATORS_3
            .iter()
            .chain(OPERATORS_2.iter())
            .find(|op| rest.starts_with(**op))
            .map(|op| op.len());
        match len {
            Some(len) => {
                for _ in 0..len {
                    self.bump();
                }
            }
            None => {
                let Some(c) = self.peek() else { return Ok(()) };
                if !OPERATORS_1.contains(c) {
                    return Err(self.error(TokErrorKind::BadCharacter(c), line, column));
                }
                match c {
                    '(' | '[' | '{' => self.brackets.push((c, line, column)),
                    ')' | ']' | '}' => match self.brackets.pop() {
                        None => {
                            return Err(self.error(
                                TokErrorKind::UnmatchedClosingBracket(c),
                                line,
                                column,
                            ))
                        }
                        Some((open, _, _)) if closing_for(open) != c => {
                            return Err(self.error(
                                TokErrorKind::MismatchedBracket { open, close: c },
                                line,
                                column,
                            ))
                        }
                        Some(_) => {}
                    },
                    _ => {}
                }
                self.bump();
            }
        }
        self.emit(TokType::Op, start, line, column);
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<Token>, TokError> {
        if let Some(&(open, line, column)) = self.brackets.last() {
            return Err(self.error(TokErrorKind::UnclosedBracket(open), line, column));
        }
        if self.line_has_tokens {
            // Only same-line text can be pending here, so a trailing comment
            // stays attached to the last logical line.
            let pos = self.pos;
            let (line, column) = (self.line, self.column);
            self.emit(TokType::Newline, pos, line, column);
        }
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            self.emit_zero_width(TokType::Dedent);
        }
        let pos = self.pos;
        let (line, column) = (self.line, self.column);
        self.emit(TokType::EndMarker, pos, line, column);
        Ok(self.tokens)
    }
}

fn closing_for(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

fn is_string_prefix(ident: &str) -> bool {
    matches!(
        ident.to_ascii_lowercase().as_str(),
        "r" | "u" | "b" | "f" | "t" | "br" | "rb" | "fr" | "rf" | "tr" | "rt"
    )
}
