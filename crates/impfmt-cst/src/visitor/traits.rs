// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Visitor trait definitions for tree traversal.

use crate::nodes::{NodeId, Tree};

/// Result of visiting a node - controls traversal behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisitResult {
    /// Continue traversal into children.
    ///
    /// After visiting children, `leave_*` will be called for this node.
    #[default]
    Continue,

    /// Skip children, continue with siblings.
    ///
    /// The walker will not descend into this node's children, but `leave_*`
    /// will still be called for this node.
    SkipChildren,

    /// Stop traversal entirely.
    ///
    /// No further `visit_*` or `leave_*` methods will be called.
    Stop,
}

/// Generates `visit_*` / `leave_*` pairs for branch kinds.
///
/// ```ignore
/// visitor_methods! {
///     // Generates visit_import_from and leave_import_from
///     import_from: ImportFrom,
/// }
/// ```
macro_rules! visitor_methods {
    (
        $(
            $(#[$meta:meta])*
            $base_name:ident : $kind:ident
        ),* $(,)?
    ) => {
        paste::paste! {
            $(
                $(#[$meta])*
                #[doc = concat!("Visit a [`SyntaxKind::", stringify!($kind), "`](crate::SyntaxKind::", stringify!($kind), ") node.")]
                #[doc = ""]
                #[doc = "Called before descending into children. Return `VisitResult` to control traversal."]
                #[allow(unused_variables)]
                fn [<visit_ $base_name>](&mut self, tree: &Tree, node: NodeId) -> VisitResult {
                    VisitResult::Continue
                }

                $(#[$meta])*
                #[doc = concat!("Leave a [`SyntaxKind::", stringify!($kind), "`](crate::SyntaxKind::", stringify!($kind), ") node.")]
                #[doc = ""]
                #[doc = "Called after all children have been visited. Called even if `SkipChildren` was returned."]
                #[allow(unused_variables)]
                fn [<leave_ $base_name>](&mut self, tree: &Tree, node: NodeId) {}
            )*
        }
    };
}

/// Read-only visitor over a [`Tree`].
///
/// # Traversal Order
///
/// - `visit_*` is called in **pre-order** (before children)
/// - `leave_*` is called in **post-order** (after children)
/// - Children are visited in source order
///
/// Leaves are reported through [`Visitor::visit_leaf`].
///
/// # Example
///
/// ```
/// use impfmt_cst::visitor::{walk, Visitor, VisitResult};
/// use impfmt_cst::{parse_module, NodeId, Tree};
///
/// struct ImportCounter(usize);
///
/// impl Visitor for ImportCounter {
///     fn visit_import_name(&mut self, _tree: &Tree, _node: NodeId) -> VisitResult {
///         self.0 += 1;
///         VisitResult::SkipChildren
///     }
/// }
///
/// let tree = parse_module("import os\nimport sys\n").unwrap();
/// let mut counter = ImportCounter(0);
/// walk(&mut counter, &tree, tree.root());
/// assert_eq!(counter.0, 2);
/// ```
pub trait Visitor {
    // Module and statements
    visitor_methods! {
        module: Module,
        simple_statement: SimpleStatement,
        small_statement: SmallStatement,
        assignment: Assignment,
        suite: Suite,
    }

    // Imports
    visitor_methods! {
        import_name: ImportName,
        import_from: ImportFrom,
        dotted_as_names: DottedAsNames,
        dotted_as_name: DottedAsName,
        dotted_name: DottedName,
        import_source: ImportSource,
        import_as_names: ImportAsNames,
        import_as_name: ImportAsName,
    }

    // Compound statements
    visitor_methods! {
        class_def: ClassDef,
        func_def: FuncDef,
        parameters: Parameters,
        decorated: Decorated,
        decorator: Decorator,
        async_statement: AsyncStatement,
        block_statement: BlockStatement,
    }

    // Expressions
    visitor_methods! {
        atom: Atom,
        attribute: Attribute,
        trailer: Trailer,
    }

    /// Visit a token leaf.
    #[allow(unused_variables)]
    fn visit_leaf(&mut self, tree: &Tree, node: NodeId) -> VisitResult {
        VisitResult::Continue
    }
}
