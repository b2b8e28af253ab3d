// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Grammar kinds for branch nodes.

use std::fmt;

/// The grammar production a branch node was built from.
///
/// Leaves carry a [`TokType`](crate::TokType) instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    /// Whole file: statements followed by the end marker.
    Module,
    /// One logical line: small statements separated by `;` plus its NEWLINE.
    SimpleStatement,
    /// `import a.b as c, d`
    ImportName,
    /// `from .a import (b as c, d)`
    ImportFrom,
    /// Comma separated `DottedAsName` list of an `import` statement.
    DottedAsNames,
    /// `a.b.c as d`
    DottedAsName,
    /// `a.b.c`
    DottedName,
    /// Leading dots and optional dotted name after `from`.
    ImportSource,
    /// Names after `from ... import`, with optional parentheses.
    ImportAsNames,
    /// `b as c`
    ImportAsName,
    /// A small statement containing a top-level `=` or augmented assignment.
    Assignment,
    /// Any other small statement (expressions, `return`, `pass`, ...).
    SmallStatement,
    /// `class Name(bases): suite`
    ClassDef,
    /// `def name(params) -> ret: suite`
    FuncDef,
    /// Parenthesized parameter list of a `def`.
    Parameters,
    /// Decorators followed by a class or function definition.
    Decorated,
    /// `@expr NEWLINE`
    Decorator,
    /// `async` followed by a definition or block statement.
    AsyncStatement,
    /// `if`, `while`, `for`, `try`, `with`, `match` and their clauses.
    BlockStatement,
    /// NEWLINE INDENT statements DEDENT
    Suite,
    /// A bracketed group: `(...)`, `[...]` or `{...}`.
    Atom,
    /// `name.attr.attr`
    Attribute,
    /// `.attr` following a call, subscript or other non-name expression.
    Trailer,
}

impl SyntaxKind {
    /// Returns the name used in diagnostics and debug dumps.
    pub fn as_str(&self) -> &'static str {
        match self {
            SyntaxKind::Module => "module",
            SyntaxKind::SimpleStatement => "simple_statement",
            SyntaxKind::ImportName => "import_name",
            SyntaxKind::ImportFrom => "import_from",
            SyntaxKind::DottedAsNames => "dotted_as_names",
            SyntaxKind::DottedAsName => "dotted_as_name",
            SyntaxKind::DottedName => "dotted_name",
            SyntaxKind::ImportSource => "import_source",
            SyntaxKind::ImportAsNames => "import_as_names",
            SyntaxKind::ImportAsName => "import_as_name",
            SyntaxKind::Assignment => "assignment",
            SyntaxKind::SmallStatement => "small_statement",
            SyntaxKind::ClassDef => "class_def",
            SyntaxKind::FuncDef => "func_def",
            SyntaxKind::Parameters => "parameters",
            SyntaxKind::Decorated => "decorated",
            SyntaxKind::Decorator => "decorator",
            SyntaxKind::AsyncStatement => "async_statement",
            SyntaxKind::BlockStatement => "block_statement",
            SyntaxKind::Suite => "suite",
            SyntaxKind::Atom => "atom",
            SyntaxKind::Attribute => "attribute",
            SyntaxKind::Trailer => "trailer",
        }
    }

    /// Whether nodes of this kind sit directly in a statement list.
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            SyntaxKind::SimpleStatement
                | SyntaxKind::ClassDef
                | SyntaxKind::FuncDef
                | SyntaxKind::Decorated
                | SyntaxKind::AsyncStatement
                | SyntaxKind::BlockStatement
        )
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
