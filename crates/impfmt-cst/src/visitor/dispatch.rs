// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Walk functions for tree traversal.
//!
//! - **Pre-order**: `visit_*` is called before descending into children
//! - **Post-order**: `leave_*` is called after all children have been visited
//! - **Source order**: children are visited left-to-right, top-to-bottom
//!
//! # Control Flow
//!
//! - `VisitResult::Continue` - traverse into children
//! - `VisitResult::SkipChildren` - skip children but still call `leave_*`
//! - `VisitResult::Stop` - halt traversal immediately (no `leave_*` called)

use super::traits::{VisitResult, Visitor};
use crate::nodes::{NodeId, SyntaxKind, Tree};

/// Walk the subtree rooted at `node`.
///
/// Returns `VisitResult::Stop` if the visitor stopped the traversal,
/// `VisitResult::Continue` otherwise.
pub fn walk<V: Visitor + ?Sized>(visitor: &mut V, tree: &Tree, node: NodeId) -> VisitResult {
    let Some(kind) = tree.syntax_kind(node) else {
        return match visitor.visit_leaf(tree, node) {
            VisitResult::Stop => VisitResult::Stop,
            _ => VisitResult::Continue,
        };
    };

    match visit(visitor, kind, tree, node) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => {
            if walk_children(visitor, tree, node) == VisitResult::Stop {
                return VisitResult::Stop;
            }
        }
    }
    leave(visitor, kind, tree, node);
    VisitResult::Continue
}

/// Walk every child of `node` in order without visiting `node` itself.
pub fn walk_children<V: Visitor + ?Sized>(
    visitor: &mut V,
    tree: &Tree,
    node: NodeId,
) -> VisitResult {
    for &child in tree.children(node) {
        if walk(visitor, tree, child) == VisitResult::Stop {
            return VisitResult::Stop;
        }
    }
    VisitResult::Continue
}

fn visit<V: Visitor + ?Sized>(
    visitor: &mut V,
    kind: SyntaxKind,
    tree: &Tree,
    node: NodeId,
) -> VisitResult {
    match kind {
        SyntaxKind::Module => visitor.visit_module(tree, node),
        SyntaxKind::SimpleStatement => visitor.visit_simple_statement(tree, node),
        SyntaxKind::SmallStatement => visitor.visit_small_statement(tree, node),
        SyntaxKind::Assignment => visitor.visit_assignment(tree, node),
        SyntaxKind::Suite => visitor.visit_suite(tree, node),
        SyntaxKind::ImportName => visitor.visit_import_name(tree, node),
        SyntaxKind::ImportFrom => visitor.visit_import_from(tree, node),
        SyntaxKind::DottedAsNames => visitor.visit_dotted_as_names(tree, node),
        SyntaxKind::DottedAsName => visitor.visit_dotted_as_name(tree, node),
        SyntaxKind::DottedName => visitor.visit_dotted_name(tree, node),
        SyntaxKind::ImportSource => visitor.visit_import_source(tree, node),
        SyntaxKind::ImportAsNames => visitor.visit_import_as_names(tree, node),
        SyntaxKind::ImportAsName => visitor.visit_import_as_name(tree, node),
        SyntaxKind::ClassDef => visitor.visit_class_def(tree, node),
        SyntaxKind::FuncDef => visitor.visit_func_def(tree, node),
        SyntaxKind::Parameters => visitor.visit_parameters(tree, node),
        SyntaxKind::Decorated => visitor.visit_decorated(tree, node),
        SyntaxKind::Decorator => visitor.visit_decorator(tree, node),
        SyntaxKind::AsyncStatement => visitor.visit_async_statement(tree, node),
        SyntaxKind::BlockStatement => visitor.visit_block_statement(tree, node),
        SyntaxKind::Atom => visitor.visit_atom(tree, node),
        SyntaxKind::Attribute => visitor.visit_attribute(tree, node),
        SyntaxKind::Trailer => visitor.visit_trailer(tree, node),
    }
}

fn leave<V: Visitor + ?Sized>(visitor: &mut V, kind: SyntaxKind, tree: &Tree, node: NodeId) {
    match kind {
        SyntaxKind::Module => visitor.leave_module(tree, node),
        SyntaxKind::SimpleStatement => visitor.leave_simple_statement(tree, node),
        SyntaxKind::SmallStatement => visitor.leave_small_statement(tree, node),
        SyntaxKind::Assignment => visitor.leave_assignment(tree, node),
        SyntaxKind::Suite => visitor.leave_suite(tree, node),
        SyntaxKind::ImportName => visitor.leave_import_name(tree, node),
        SyntaxKind::ImportFrom => visitor.leave_import_from(tree, node),
        SyntaxKind::DottedAsNames => visitor.leave_dotted_as_names(tree, node),
        SyntaxKind::DottedAsName => visitor.leave_dotted_as_name(tree, node),
        SyntaxKind::DottedName => visitor.leave_dotted_name(tree, node),
        SyntaxKind::ImportSource => visitor.leave_import_source(tree, node),
        SyntaxKind::ImportAsNames => visitor.leave_import_as_names(tree, node),
        SyntaxKind::ImportAsName => visitor.leave_import_as_name(tree, node),
        SyntaxKind::ClassDef => visitor.leave_class_def(tree, node),
        SyntaxKind::FuncDef => visitor.leave_func_def(tree, node),
        SyntaxKind::Parameters => visitor.leave_parameters(tree, node),
        SyntaxKind::Decorated => visitor.leave_decorated(tree, node),
        SyntaxKind::Decorator => visitor.leave_decorator(tree, node),
        SyntaxKind::AsyncStatement => visitor.leave_async_statement(tree, node),
        SyntaxKind::BlockStatement => visitor.leave_block_statement(tree, node),
        SyntaxKind::Atom => visitor.leave_atom(tree, node),
        SyntaxKind::Attribute => visitor.leave_attribute(tree, node),
        SyntaxKind::Trailer => visitor.leave_trailer(tree, node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_module;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        stop_at_class: bool,
    }

    impl Visitor for Recorder {
        fn visit_func_def(&mut self, tree: &Tree, node: NodeId) -> VisitResult {
            self.events.push(format!("visit def {}", tree.value(tree.children(node)[1])));
            VisitResult::Continue
        }

        fn leave_func_def(&mut self, tree: &Tree, node: NodeId) {
            self.events.push(format!("leave def {}", tree.value(tree.children(node)[1])));
        }

        fn visit_class_def(&mut self, _tree: &Tree, _node: NodeId) -> VisitResult {
            if self.stop_at_class {
                return VisitResult::Stop;
            }
            self.events.push("visit class".to_string());
            VisitResult::SkipChildren
        }

        fn leave_class_def(&mut self, _tree: &Tree, _node: NodeId) {
            self.events.push("leave class".to_string());
        }

        fn visit_import_name(&mut self, tree: &Tree, node: NodeId) -> VisitResult {
            self.events.push(format!("import {}", tree.code(tree.children(node)[1])));
            VisitResult::Continue
        }
    }

    const SOURCE: &str = "\
def outer():
    import os
    def inner():
        pass
class A:
    def method(self):
        pass
import sys
";

    #[test]
    fn test_walk_order() {
        let tree = parse_module(SOURCE).unwrap();
        let mut recorder = Recorder::default();
        assert_eq!(walk(&mut recorder, &tree, tree.root()), VisitResult::Continue);
        assert_eq!(
            recorder.events,
            vec![
                "visit def outer",
                "import os",
                "visit def inner",
                "leave def inner",
                "leave def outer",
                "visit class",
                "leave class",
                "import sys",
            ]
        );
    }

    #[test]
    fn test_walk_stop() {
        let tree = parse_module(SOURCE).unwrap();
        let mut recorder = Recorder {
            stop_at_class: true,
            ..Default::default()
        };
        assert_eq!(walk(&mut recorder, &tree, tree.root()), VisitResult::Stop);
        assert_eq!(recorder.events.last().map(String::as_str), Some("leave def outer"));
    }
}
