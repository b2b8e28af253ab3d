// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! A single imported name.

use std::fmt;

/// Comment text that pushes an import to the end of its block.
pub const LAST_IMPORT_MARKER: &str = "@last-import";

/// Whether the name came from `import x` or `from m import x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImportKind {
    /// Plain import (`import os.path`).
    Import,
    /// From import (`from os import path`).
    From,
}

impl ImportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportKind::Import => "import",
            ImportKind::From => "from",
        }
    }
}

impl fmt::Display for ImportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One imported name.
///
/// `source_name` is the canonical key. For plain imports it is the dotted
/// module path (`os.path`); for from imports it is the module joined with the
/// imported token (`os.path.join`, `.sibling.Thing`, `..x`, `pkg.*`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSymbol {
    pub source_name: String,
    pub alias: Option<String>,
    pub kind: ImportKind,
    /// Raw comment text including the leading `#`.
    pub comment: Option<String>,
    /// 1-indexed line the name appeared on, 0 if synthesized.
    pub line: u32,
}

impl ImportSymbol {
    pub fn new(
        source_name: impl Into<String>,
        alias: Option<String>,
        comment: Option<String>,
        kind: ImportKind,
        line: u32,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            alias,
            kind,
            comment,
            line,
        }
    }

    /// Module a from import reads from; `None` for plain imports.
    pub fn module(&self) -> Option<&str> {
        match self.kind {
            ImportKind::Import => None,
            ImportKind::From => Some(split_source(&self.source_name).0),
        }
    }

    /// The imported token: the last component for from imports, the whole
    /// dotted path for plain imports.
    pub fn token(&self) -> &str {
        match self.kind {
            ImportKind::Import => &self.source_name,
            ImportKind::From => split_source(&self.source_name).1,
        }
    }

    pub fn is_star(&self) -> bool {
        self.kind == ImportKind::From && self.token() == "*"
    }

    /// The name this import binds in its scope.
    pub fn bound_name(&self) -> &str {
        if let Some(alias) = &self.alias {
            return alias;
        }
        match self.kind {
            ImportKind::From => self.token(),
            ImportKind::Import => self
                .source_name
                .split('.')
                .next()
                .unwrap_or(&self.source_name),
        }
    }

    pub fn has_last_marker(&self) -> bool {
        self.comment
            .as_deref()
            .is_some_and(|c| c.contains(LAST_IMPORT_MARKER))
    }

    /// Rank used before the name when sorting: underscore names first,
    /// marked names last.
    pub fn priority(&self) -> u8 {
        if self.has_last_marker() {
            2
        } else if self.token().starts_with('_') {
            0
        } else {
            1
        }
    }

    /// `name` or `name as alias`, as written inside a statement.
    pub fn render_entry(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} as {}", self.token(), alias),
            None => self.token().to_string(),
        }
    }
}

/// Split a from-import source name into `(module, token)`.
///
/// Leading dots stay with the module, so `.x` splits into `(".", "x")` and
/// `..pkg.x` into `("..pkg", "x")`. A name without dots has an empty module.
pub fn split_source(source_name: &str) -> (&str, &str) {
    match source_name.rfind('.') {
        None => ("", source_name),
        Some(pos) => {
            let module = &source_name[..pos];
            if module.chars().all(|c| c == '.') {
                (&source_name[..=pos], &source_name[pos + 1..])
            } else {
                (module, &source_name[pos + 1..])
            }
        }
    }
}

/// Join a module and token back into a source name.
pub fn join_source(module: &str, token: &str) -> String {
    if module.is_empty() {
        token.to_string()
    } else if module.ends_with('.') {
        format!("{}{}", module, token)
    } else {
        format!("{}.{}", module, token)
    }
}
