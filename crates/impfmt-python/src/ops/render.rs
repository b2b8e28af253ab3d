//! Canonical text for import statements.

use std::cmp::Ordering;

use impfmt_core::text::{display_width, Newline};

use crate::imports::{compare_symbols, group_priority, ImportBlock, ImportSymbol};

/// Symbols rendered together as one statement.
///
/// From-imports share a statement when they agree on module, star-ness and
/// comment. Plain imports always get a statement each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Source module of a from-import; `None` for plain imports.
    pub module: Option<String>,
    pub star: bool,
    pub comment: Option<String>,
    pub symbols: Vec<ImportSymbol>,
}

impl Statement {
    fn single(module: Option<String>, symbol: &ImportSymbol) -> Self {
        Self {
            module,
            star: symbol.is_star(),
            comment: symbol.comment.clone(),
            symbols: vec![symbol.clone()],
        }
    }

    fn name(&self) -> &str {
        match (&self.module, self.symbols.first()) {
            (Some(module), _) => module,
            (None, Some(symbol)) => &symbol.source_name,
            (None, None) => "",
        }
    }

    fn is_last(&self) -> bool {
        self.symbols.iter().any(ImportSymbol::has_last_marker)
    }
}

/// Statement order: marked statements last, from-imports before plain ones,
/// underscore names first, then by name.
pub fn compare_statements(a: &Statement, b: &Statement) -> Ordering {
    fn key(s: &Statement) -> (bool, bool, u8, &str, bool, Option<&str>) {
        (
            s.is_last(),
            s.module.is_none(),
            group_priority(s.name()),
            s.name(),
            s.star,
            s.comment.as_deref(),
        )
    }
    key(a).cmp(&key(b))
}

/// Split a block into sorted statements.
pub fn partition(block: &ImportBlock) -> Vec<Statement> {
    let mut statements: Vec<Statement> = Vec::new();
    for symbol in block.symbols() {
        let module = symbol.module().filter(|module| !module.is_empty());
        let Some(module) = module else {
            statements.push(Statement::single(None, symbol));
            continue;
        };
        let star = symbol.is_star();
        let existing = statements.iter_mut().find(|s| {
            s.module.as_deref() == Some(module) && s.star == star && s.comment == symbol.comment
        });
        match existing {
            Some(statement) => statement.symbols.push(symbol.clone()),
            None => statements.push(Statement::single(Some(module.to_string()), symbol)),
        }
    }
    for statement in &mut statements {
        statement.symbols.sort_by(compare_symbols);
    }
    statements.sort_by(compare_statements);
    statements
}

/// Render one statement without its leading indentation or line break.
///
/// A from-import whose code is wider than `page_width` (counting `indent`) is
/// wrapped into the parenthesized form, continuation lines indented four
/// spaces past `indent`. The trailing comment does not count toward the width.
pub fn render_statement(
    statement: &Statement,
    indent: &str,
    page_width: usize,
    newline: Newline,
) -> String {
    let entries: Vec<String> = statement
        .symbols
        .iter()
        .map(|symbol| match statement.module {
            Some(_) => symbol.render_entry(),
            None => match &symbol.alias {
                Some(alias) => format!("{} as {}", symbol.source_name, alias),
                None => symbol.source_name.clone(),
            },
        })
        .collect();

    let mut code = match &statement.module {
        None => format!("import {}", entries.join(", ")),
        Some(module) if statement.star => format!("from {} import *", module),
        Some(module) => {
            let head = format!("from {} import ", module);
            let line = format!("{}{}", head, entries.join(", "));
            if entries.len() > 1 && display_width(indent) + display_width(&line) > page_width {
                wrap(&head, &entries, indent, page_width, newline)
            } else {
                line
            }
        }
    };
    if let Some(comment) = &statement.comment {
        code.push_str("  ");
        code.push_str(comment);
    }
    code
}

fn wrap(head: &str, entries: &[String], indent: &str, page_width: usize, newline: Newline) -> String {
    let continuation = format!("{}    ", indent);
    let mut lines = Vec::new();
    let mut line = format!("{}(", head);
    let mut width = display_width(indent) + display_width(&line);
    for (index, entry) in entries.iter().enumerate() {
        let closing = if index + 1 == entries.len() { ")" } else { "," };
        let piece = format!("{}{}", entry, closing);
        if index == 0 {
            width += display_width(&piece);
            line.push_str(&piece);
        } else if width + 1 + display_width(&piece) > page_width {
            lines.push(std::mem::take(&mut line));
            line = format!("{}{}", continuation, piece);
            width = display_width(&line);
        } else {
            width += 1 + display_width(&piece);
            line.push(' ');
            line.push_str(&piece);
        }
    }
    lines.push(line);
    lines.join(newline.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imports::ImportKind;

    fn from(module: &str, names: &[&str]) -> Statement {
        Statement {
            module: Some(module.to_string()),
            star: false,
            comment: None,
            symbols: names
                .iter()
                .map(|name| {
                    ImportSymbol::new(format!("{}.{}", module, name), None, None, ImportKind::From, 1)
                })
                .collect(),
        }
    }

    #[test]
    fn renders_single_lines() {
        let mut statement = from("os.path", &["exists", "join"]);
        statement.symbols[1].alias = Some("pjoin".into());
        statement.comment = Some("# paths".into());
        assert_eq!(
            render_statement(&statement, "", 100, Newline::Lf),
            "from os.path import exists, join as pjoin  # paths"
        );

        let plain = Statement {
            module: None,
            star: false,
            comment: None,
            symbols: vec![ImportSymbol::new(
                "numpy",
                Some("np".into()),
                None,
                ImportKind::Import,
                1,
            )],
        };
        assert_eq!(render_statement(&plain, "", 100, Newline::Lf), "import numpy as np");
    }

    #[test]
    fn wraps_long_from_imports() {
        let names: Vec<String> = (0..10).map(|i| format!("Name{}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let statement = from("package", &refs);
        let expected = "\
from package import (Name0, Name1,
    Name2, Name3, Name4, Name5, Name6,
    Name7, Name8, Name9)";
        assert_eq!(render_statement(&statement, "", 40, Newline::Lf), expected);
        for line in expected.lines() {
            assert!(line.chars().count() <= 40);
        }
    }

    #[test]
    fn wrapped_continuation_follows_indent() {
        let statement = from("pkg", &["alpha", "beta", "gamma"]);
        let rendered = render_statement(&statement, "    ", 34, Newline::CrLf);
        assert_eq!(rendered, "from pkg import (alpha, beta,\r\n        gamma)");
    }

    #[test]
    fn star_is_never_wrapped() {
        let mut statement = from("a_rather_long_module_name", &["*"]);
        statement.star = true;
        assert_eq!(
            render_statement(&statement, "", 10, Newline::Lf),
            "from a_rather_long_module_name import *"
        );
    }

    #[test]
    fn statement_ordering() {
        let mut block = ImportBlock::new(0, impfmt_cst::Tree::new(impfmt_cst::SyntaxKind::Module).root(), "");
        block.obtain_symbol("charlie", None, None, ImportKind::Import, 1);
        block.obtain_symbol("zulu.Z2", None, None, ImportKind::From, 2);
        block.obtain_symbol("alpha.A1", None, None, ImportKind::From, 3);
        block.obtain_symbol("bravo", None, None, ImportKind::Import, 4);
        block.obtain_symbol("zulu.Z1", None, None, ImportKind::From, 5);
        block.obtain_symbol("late", None, Some("# @last-import".into()), ImportKind::Import, 6);
        block.obtain_symbol("_private.x", None, None, ImportKind::From, 7);
        block.obtain_symbol("zulu.*", None, None, ImportKind::From, 8);
        let rendered: Vec<String> = partition(&block)
            .iter()
            .map(|s| render_statement(s, "", 100, Newline::Lf))
            .collect();
        assert_eq!(
            rendered,
            vec![
                "from _private import x",
                "from alpha import A1",
                "from zulu import Z1, Z2",
                "from zulu import *",
                "import bravo",
                "import charlie",
                "import late  # @last-import",
            ]
        );
    }
}
