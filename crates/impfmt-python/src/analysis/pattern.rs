// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Grammar patterns recognized by the import pass.
//!
//! [`match_pattern`] maps a tree node to one [`Pattern`] variant. Shapes are
//! tried in a fixed order: module root, class definition, function definition,
//! `import`, `from ... import`, attribute chain, assignment. Anything else is
//! [`Pattern::Generic`] and is descended into by the walker.
//!
//! A recognized production with unexpected children (for example a class
//! definition whose second child is not a name) is an
//! [`EngineError::InternalShape`]: the grammar and this module disagree.

use impfmt_cst::{NodeId, SyntaxKind, TokType, Tree};

use crate::error::{EngineError, EngineResult};
use crate::imports::{join_source, ImportKind, ImportSymbol};

/// A recognized grammar shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    Module,
    ClassDef { name: String, bases: Vec<String> },
    FuncDef { name: String, params: Vec<String> },
    ImportName { symbols: Vec<ImportSymbol> },
    ImportFrom { symbols: Vec<ImportSymbol> },
    Attribute { dotted: String },
    Assignment { targets: Vec<String> },
    Generic,
}

pub fn match_pattern(tree: &Tree, node: NodeId) -> EngineResult<Pattern> {
    let Some(kind) = tree.syntax_kind(node) else {
        return Ok(Pattern::Generic);
    };
    match kind {
        SyntaxKind::Module => Ok(Pattern::Module),
        SyntaxKind::ClassDef => match_class_def(tree, node),
        SyntaxKind::FuncDef => match_func_def(tree, node),
        SyntaxKind::ImportName => match_import_name(tree, node),
        SyntaxKind::ImportFrom => match_import_from(tree, node),
        SyntaxKind::Attribute => Ok(Pattern::Attribute {
            dotted: tree.code(node),
        }),
        SyntaxKind::Assignment => Ok(Pattern::Assignment {
            targets: assignment_targets(tree, node),
        }),
        _ => Ok(Pattern::Generic),
    }
}

// ============================================================================
// Definitions
// ============================================================================

fn definition_name(tree: &Tree, node: NodeId, what: &str) -> EngineResult<String> {
    tree.children(node)
        .get(1)
        .filter(|&&child| tree.tok_type(child) == Some(TokType::Name))
        .map(|&child| tree.value(child).to_string())
        .ok_or_else(|| EngineError::shape(format!("{} without a name", what), tree.line(node)))
}

fn match_class_def(tree: &Tree, node: NodeId) -> EngineResult<Pattern> {
    let name = definition_name(tree, node, "class definition")?;
    let bases = tree
        .children(node)
        .iter()
        .skip(2)
        .take_while(|&&child| !tree.is_token(child, TokType::Op, ":"))
        .find(|&&child| {
            tree.syntax_kind(child) == Some(SyntaxKind::Atom)
                && tree
                    .first_leaf(child)
                    .is_some_and(|leaf| tree.value(leaf) == "(")
        })
        .map(|&atom| base_names(tree, atom))
        .unwrap_or_default();
    Ok(Pattern::ClassDef { name, bases })
}

/// Positional base classes of a `(...)` atom; keyword arguments are skipped.
fn base_names(tree: &Tree, atom: NodeId) -> Vec<String> {
    let children = tree.children(atom);
    let inner = &children[1..children.len().saturating_sub(1).max(1)];
    inner
        .split(|&child| tree.is_token(child, TokType::Op, ","))
        .filter(|segment| !segment.iter().any(|&c| tree.is_token(c, TokType::Op, "=")))
        .filter_map(|segment| segment.first())
        .filter_map(|&first| match tree.syntax_kind(first) {
            Some(SyntaxKind::Attribute) => Some(tree.code(first)),
            None if tree.tok_type(first) == Some(TokType::Name) => {
                Some(tree.value(first).to_string())
            }
            _ => None,
        })
        .collect()
}

fn match_func_def(tree: &Tree, node: NodeId) -> EngineResult<Pattern> {
    let name = definition_name(tree, node, "function definition")?;
    let params = tree
        .children(node)
        .iter()
        .find(|&&child| tree.syntax_kind(child) == Some(SyntaxKind::Parameters))
        .ok_or_else(|| {
            EngineError::shape(
                format!("function '{}' without parameters", name),
                tree.line(node),
            )
        })?;
    let mut names = Vec::new();
    let mut previous: Option<NodeId> = None;
    for &child in tree.children(*params) {
        let after_separator = previous.is_some_and(|prev| {
            tree.tok_type(prev) == Some(TokType::Op)
                && matches!(tree.value(prev), "(" | "," | "*" | "**")
        });
        if after_separator && tree.tok_type(child) == Some(TokType::Name) {
            names.push(tree.value(child).to_string());
        }
        previous = Some(child);
    }
    Ok(Pattern::FuncDef {
        name,
        params: names,
    })
}

// ============================================================================
// Imports
// ============================================================================

/// Comment lines in a prefix, joined with a space.
pub fn comment_in(prefix: &str) -> Option<String> {
    let comments: Vec<&str> = prefix
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('#'))
        .collect();
    if comments.is_empty() {
        None
    } else {
        Some(comments.join(" "))
    }
}

fn join_comments(a: Option<String>, b: Option<String>) -> Option<String> {
    match (a, b) {
        (Some(a), Some(b)) => Some(format!("{} {}", a, b)),
        (a, b) => a.or(b),
    }
}

/// Trailing comment of the statement line holding `import_node`.
fn statement_comment(tree: &Tree, import_node: NodeId) -> Option<String> {
    let statement = tree.ancestor_of_kind(import_node, SyntaxKind::SimpleStatement)?;
    let newline = tree.last_leaf(statement)?;
    comment_in(&tree.leaf(newline)?.prefix)
}

fn shape_error(tree: &Tree, node: NodeId, what: &str) -> EngineError {
    EngineError::shape(
        format!("unexpected {} shape: {}", what, tree.code(node)),
        tree.line(node),
    )
}

fn match_import_name(tree: &Tree, node: NodeId) -> EngineResult<Pattern> {
    let children = tree.children(node);
    let names = match children {
        [keyword, names]
            if tree.value(*keyword) == "import"
                && tree.syntax_kind(*names) == Some(SyntaxKind::DottedAsNames) =>
        {
            *names
        }
        _ => return Err(shape_error(tree, node, "import")),
    };
    let comment = statement_comment(tree, node);
    let mut symbols = Vec::new();
    for &entry in tree.children(names) {
        if tree.is_token(entry, TokType::Op, ",") {
            continue;
        }
        let parts = tree.children(entry);
        let dotted = match parts.first() {
            Some(&dotted) if tree.syntax_kind(dotted) == Some(SyntaxKind::DottedName) => dotted,
            _ => return Err(shape_error(tree, entry, "dotted import name")),
        };
        let alias = parts.get(2).map(|&alias| tree.value(alias).to_string());
        symbols.push(ImportSymbol::new(
            tree.code(dotted),
            alias,
            comment.clone(),
            ImportKind::Import,
            tree.line(entry),
        ));
    }
    Ok(Pattern::ImportName { symbols })
}

fn match_import_from(tree: &Tree, node: NodeId) -> EngineResult<Pattern> {
    let (source, names) = match tree.children(node) {
        [from, source, import, names]
            if tree.value(*from) == "from"
                && tree.syntax_kind(*source) == Some(SyntaxKind::ImportSource)
                && tree.value(*import) == "import"
                && tree.syntax_kind(*names) == Some(SyntaxKind::ImportAsNames) =>
        {
            (*source, *names)
        }
        _ => return Err(shape_error(tree, node, "from-import")),
    };
    let module = tree.code(source);
    let trailing = statement_comment(tree, node);

    // Comments inside parentheses belong to the entry before them; comments
    // ahead of the first entry belong to the whole statement.
    let mut leading: Option<String> = None;
    let mut entries: Vec<(String, Option<String>, Option<String>, u32)> = Vec::new();
    for &child in tree.children(names) {
        let prefix_comment = comment_in(tree.prefix(child));
        match tree.syntax_kind(child) {
            Some(SyntaxKind::ImportAsName) => {
                match entries.last_mut() {
                    Some(previous) => previous.2 = join_comments(previous.2.take(), prefix_comment),
                    None => leading = join_comments(leading, prefix_comment),
                }
                let parts = tree.children(child);
                let name = match parts.first() {
                    Some(&name) if tree.tok_type(name) == Some(TokType::Name) => {
                        tree.value(name).to_string()
                    }
                    _ => return Err(shape_error(tree, child, "imported name")),
                };
                let alias = parts.get(2).map(|&alias| tree.value(alias).to_string());
                let inner = parts
                    .iter()
                    .skip(1)
                    .filter_map(|&part| comment_in(tree.prefix(part)))
                    .reduce(|a, b| format!("{} {}", a, b));
                entries.push((name, alias, inner, tree.line(child)));
            }
            None if tree.value(child) == "*" => {
                entries.push(("*".to_string(), None, None, tree.line(child)));
            }
            None => match entries.last_mut() {
                Some(previous) => previous.2 = join_comments(previous.2.take(), prefix_comment),
                None => leading = join_comments(leading, prefix_comment),
            },
            Some(_) => return Err(shape_error(tree, child, "imported name")),
        }
    }

    let statement = join_comments(leading, trailing);
    let symbols = entries
        .into_iter()
        .map(|(name, alias, own, line)| {
            ImportSymbol::new(
                join_source(&module, &name),
                alias,
                own.or_else(|| statement.clone()),
                ImportKind::From,
                line,
            )
        })
        .collect();
    Ok(Pattern::ImportFrom { symbols })
}

// ============================================================================
// Assignments
// ============================================================================

const ASSIGN_OPS: &[&str] = &[
    "=", "+=", "-=", "*=", "/=", "//=", "%=", "**=", ">>=", "<<=", "&=", "^=", "|=", "@=",
];

/// Names bound by an assignment: plain names and names inside tuple/list
/// targets, left of the last assignment operator. Annotations are ignored.
fn assignment_targets(tree: &Tree, node: NodeId) -> Vec<String> {
    let children = tree.children(node);
    let Some(last_op) = children.iter().rposition(|&child| {
        tree.tok_type(child) == Some(TokType::Op) && ASSIGN_OPS.contains(&tree.value(child))
    }) else {
        return Vec::new();
    };
    let mut targets = Vec::new();
    for segment in children[..last_op].split(|&child| {
        tree.tok_type(child) == Some(TokType::Op) && ASSIGN_OPS.contains(&tree.value(child))
    }) {
        let end = segment
            .iter()
            .position(|&child| tree.is_token(child, TokType::Op, ":"))
            .unwrap_or(segment.len());
        collect_names(tree, &segment[..end], &mut targets);
    }
    targets
}

/// Bare names and grouped names in `items`; subscripted or called names are
/// not bindings.
fn collect_names(tree: &Tree, items: &[NodeId], out: &mut Vec<String>) {
    for (index, &child) in items.iter().enumerate() {
        let previous = index.checked_sub(1).map(|i| items[i]);
        match tree.syntax_kind(child) {
            None if tree.tok_type(child) == Some(TokType::Name) => {
                let followed = items.get(index + 1).is_some_and(|&next| {
                    matches!(
                        tree.syntax_kind(next),
                        Some(SyntaxKind::Atom | SyntaxKind::Trailer)
                    )
                });
                if !followed {
                    out.push(tree.value(child).to_string());
                }
            }
            Some(SyntaxKind::Atom) if !follows_primary(tree, previous) => {
                let children = tree.children(child);
                let inner = &children[1..children.len().saturating_sub(1).max(1)];
                collect_names(tree, inner, out);
            }
            _ => {}
        }
    }
}

/// Whether an atom after `previous` is a call or subscript rather than a group.
fn follows_primary(tree: &Tree, previous: Option<NodeId>) -> bool {
    previous.is_some_and(|prev| match tree.syntax_kind(prev) {
        Some(SyntaxKind::Atom | SyntaxKind::Attribute | SyntaxKind::Trailer) => true,
        Some(_) => false,
        None => matches!(tree.tok_type(prev), Some(TokType::Name | TokType::String)),
    })
}
