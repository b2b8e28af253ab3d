// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Arena-backed concrete syntax tree.
//!
//! Nodes live in a single `Vec` and are addressed by [`NodeId`]. Parents are
//! stored as ids, so structural edits are index rewrites and never fight the
//! borrow checker. Detached nodes stay in the arena; they are simply
//! unreachable from the root and therefore never rendered.
//!
//! # Round trip
//!
//! Rendering concatenates `prefix + value` of every reachable leaf in order.
//! For a freshly parsed tree this reproduces the input byte for byte.

use std::fmt;

use thiserror::Error;

use super::kind::SyntaxKind;
use crate::tokenizer::{TokType, Token};

/// Handle to a node in a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A terminal token together with the trivia preceding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    pub kind: TokType,
    pub value: String,
    pub prefix: String,
    pub line: u32,
    pub column: u32,
}

impl Leaf {
    /// Create a leaf with no position, for synthesized tokens.
    pub fn new(kind: TokType, value: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            prefix: prefix.into(),
            line: 0,
            column: 0,
        }
    }
}

impl From<Token> for Leaf {
    fn from(token: Token) -> Self {
        Self {
            kind: token.kind,
            value: token.value,
            prefix: token.prefix,
            line: token.line,
            column: token.column,
        }
    }
}

#[derive(Debug, Clone)]
enum Payload {
    Leaf(Leaf),
    Branch {
        kind: SyntaxKind,
        children: Vec<NodeId>,
    },
}

#[derive(Debug, Clone)]
struct Entry {
    parent: Option<NodeId>,
    payload: Payload,
}

/// Error raised by structural edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("node {0} is not attached to a parent")]
    Detached(NodeId),
    #[error("nodes to splice must be contiguous siblings")]
    NotContiguous,
    #[error("no nodes given to splice")]
    Empty,
}

/// A mutable concrete syntax tree.
#[derive(Debug, Clone)]
pub struct Tree {
    entries: Vec<Entry>,
    root: NodeId,
}

impl Tree {
    /// Create a tree holding a single empty branch of `kind` as its root.
    pub fn new(kind: SyntaxKind) -> Self {
        let mut tree = Self {
            entries: Vec::new(),
            root: NodeId(0),
        };
        tree.root = tree.new_branch(kind, Vec::new());
        tree
    }

    /// An arena with no nodes; the parser fills it and sets the root.
    pub(crate) fn empty() -> Self {
        Self {
            entries: Vec::new(),
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub(crate) fn set_root(&mut self, root: NodeId) {
        self.root = root;
    }

    /// Number of nodes in the arena, including detached ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // ------------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------------

    pub fn new_leaf(&mut self, leaf: Leaf) -> NodeId {
        let id = NodeId(self.entries.len() as u32);
        self.entries.push(Entry {
            parent: None,
            payload: Payload::Leaf(leaf),
        });
        id
    }

    /// Create a branch and adopt `children`, which must be detached.
    pub fn new_branch(&mut self, kind: SyntaxKind, children: Vec<NodeId>) -> NodeId {
        let id = NodeId(self.entries.len() as u32);
        for &child in &children {
            self.entries[child.index()].parent = Some(id);
        }
        self.entries.push(Entry {
            parent: None,
            payload: Payload::Branch { kind, children },
        });
        id
    }

    /// Deep-copy the subtree at `id` of `other` into this arena.
    ///
    /// The copy is detached; insert it with [`Tree::splice`] or
    /// [`Tree::insert_before`].
    pub fn graft(&mut self, other: &Tree, id: NodeId) -> NodeId {
        match &other.entries[id.index()].payload {
            Payload::Leaf(leaf) => self.new_leaf(leaf.clone()),
            Payload::Branch { kind, children } => {
                let copies = children
                    .iter()
                    .map(|&child| self.graft(other, child))
                    .collect();
                self.new_branch(*kind, copies)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------------

    pub fn syntax_kind(&self, id: NodeId) -> Option<SyntaxKind> {
        match &self.entries[id.index()].payload {
            Payload::Branch { kind, .. } => Some(*kind),
            Payload::Leaf(_) => None,
        }
    }

    pub fn leaf(&self, id: NodeId) -> Option<&Leaf> {
        match &self.entries[id.index()].payload {
            Payload::Leaf(leaf) => Some(leaf),
            Payload::Branch { .. } => None,
        }
    }

    pub fn leaf_mut(&mut self, id: NodeId) -> Option<&mut Leaf> {
        match &mut self.entries[id.index()].payload {
            Payload::Leaf(leaf) => Some(leaf),
            Payload::Branch { .. } => None,
        }
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.leaf(id).is_some()
    }

    pub fn tok_type(&self, id: NodeId) -> Option<TokType> {
        self.leaf(id).map(|leaf| leaf.kind)
    }

    /// Whether `id` is a leaf of `kind` whose value is `value`.
    pub fn is_token(&self, id: NodeId, kind: TokType, value: &str) -> bool {
        self.leaf(id)
            .is_some_and(|leaf| leaf.kind == kind && leaf.value == value)
    }

    /// The value of a leaf, or `""` for branches.
    pub fn value(&self, id: NodeId) -> &str {
        self.leaf(id).map_or("", |leaf| leaf.value.as_str())
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.entries[id.index()].payload {
            Payload::Branch { children, .. } => children,
            Payload::Leaf(_) => &[],
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.entries[id.index()].parent
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&child| child == id)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.children(parent).get(index + 1).copied()
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        index
            .checked_sub(1)
            .and_then(|i| self.children(parent).get(i).copied())
    }

    /// Nearest ancestor (excluding `id` itself) of the given kind.
    pub fn ancestor_of_kind(&self, id: NodeId, kind: SyntaxKind) -> Option<NodeId> {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if self.syntax_kind(node) == Some(kind) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    pub fn first_leaf(&self, id: NodeId) -> Option<NodeId> {
        if self.is_leaf(id) {
            return Some(id);
        }
        self.children(id)
            .iter()
            .find_map(|&child| self.first_leaf(child))
    }

    pub fn last_leaf(&self, id: NodeId) -> Option<NodeId> {
        if self.is_leaf(id) {
            return Some(id);
        }
        self.children(id)
            .iter()
            .rev()
            .find_map(|&child| self.last_leaf(child))
    }

    /// All leaves below `id` in source order.
    pub fn leaves(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_leaves(id, &mut out);
        out
    }

    fn collect_leaves(&self, id: NodeId, out: &mut Vec<NodeId>) {
        match &self.entries[id.index()].payload {
            Payload::Leaf(_) => out.push(id),
            Payload::Branch { children, .. } => {
                for &child in children {
                    self.collect_leaves(child, out);
                }
            }
        }
    }

    /// Trivia in front of the node: the prefix of its first leaf.
    pub fn prefix(&self, id: NodeId) -> &str {
        self.first_leaf(id)
            .and_then(|leaf| self.leaf(leaf))
            .map_or("", |leaf| leaf.prefix.as_str())
    }

    pub fn set_prefix(&mut self, id: NodeId, prefix: impl Into<String>) {
        if let Some(first) = self.first_leaf(id) {
            if let Some(leaf) = self.leaf_mut(first) {
                leaf.prefix = prefix.into();
            }
        }
    }

    /// Indentation of a statement: the prefix text after its last line break.
    pub fn indent(&self, id: NodeId) -> &str {
        let prefix = self.prefix(id);
        match memchr::memrchr2(b'\n', b'\r', prefix.as_bytes()) {
            Some(pos) => &prefix[pos + 1..],
            None => prefix,
        }
    }

    /// Source line of the node's first token (1-indexed, 0 if synthesized).
    pub fn line(&self, id: NodeId) -> u32 {
        self.first_leaf(id)
            .and_then(|leaf| self.leaf(leaf))
            .map_or(0, |leaf| leaf.line)
    }

    /// Source column of the node's first token (0-indexed).
    pub fn column(&self, id: NodeId) -> u32 {
        self.first_leaf(id)
            .and_then(|leaf| self.leaf(leaf))
            .map_or(0, |leaf| leaf.column)
    }

    /// Concatenated token values below `id`, ignoring all trivia.
    ///
    /// For `a . b` this returns `a.b`.
    pub fn code(&self, id: NodeId) -> String {
        self.leaves(id)
            .into_iter()
            .map(|leaf| self.value(leaf))
            .collect()
    }

    /// Exact source text of the subtree, including its leading prefix.
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match &self.entries[id.index()].payload {
            Payload::Leaf(leaf) => {
                out.push_str(&leaf.prefix);
                out.push_str(&leaf.value);
            }
            Payload::Branch { children, .. } => {
                for &child in children {
                    self.write_node(child, out);
                }
            }
        }
    }

    /// Render the whole tree back to source.
    pub fn render(&self) -> String {
        self.text(self.root)
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Remove `id` from its parent. A detached node is left untouched.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.parent(id) {
            if let Payload::Branch { children, .. } = &mut self.entries[parent.index()].payload {
                children.retain(|&child| child != id);
            }
            self.entries[id.index()].parent = None;
        }
    }

    /// Insert detached `nodes` in front of `anchor`, in order.
    pub fn insert_before(&mut self, anchor: NodeId, nodes: Vec<NodeId>) -> Result<(), TreeError> {
        let parent = self.parent(anchor).ok_or(TreeError::Detached(anchor))?;
        let index = self
            .index_in_parent(anchor)
            .ok_or(TreeError::Detached(anchor))?;
        for &node in &nodes {
            self.entries[node.index()].parent = Some(parent);
        }
        if let Payload::Branch { children, .. } = &mut self.entries[parent.index()].payload {
            children.splice(index..index, nodes);
        }
        Ok(())
    }

    /// Replace the contiguous siblings `old` with the detached `new` nodes.
    ///
    /// The prefix of the first removed node moves to the first inserted node,
    /// so blank lines and comments in front of the region survive. When `new`
    /// is empty, the line-level part of that prefix (everything up to its last
    /// line break) is carried over to the following sibling instead.
    pub fn splice(&mut self, old: &[NodeId], new: Vec<NodeId>) -> Result<(), TreeError> {
        let first = *old.first().ok_or(TreeError::Empty)?;
        let parent = self.parent(first).ok_or(TreeError::Detached(first))?;
        let start = self
            .index_in_parent(first)
            .ok_or(TreeError::Detached(first))?;
        {
            let siblings = self.children(parent);
            let contiguous = old.iter().enumerate().all(|(offset, &node)| {
                siblings.get(start + offset) == Some(&node)
            });
            if !contiguous {
                return Err(TreeError::NotContiguous);
            }
        }

        let prefix = self.prefix(first).to_string();
        let end = start + old.len();
        let following = self.children(parent).get(end).copied();

        match new.first() {
            Some(&head) => self.set_prefix(head, prefix),
            None => {
                if let Some(next) = following {
                    let carried = match memchr::memrchr2(b'\n', b'\r', prefix.as_bytes()) {
                        Some(pos) => &prefix[..=pos],
                        None => "",
                    };
                    if !carried.is_empty() {
                        let merged = format!("{}{}", carried, self.prefix(next));
                        self.set_prefix(next, merged);
                    }
                }
            }
        }

        for &node in &new {
            self.entries[node.index()].parent = Some(parent);
        }
        let removed: Vec<NodeId> =
            if let Payload::Branch { children, .. } = &mut self.entries[parent.index()].payload {
                children.splice(start..end, new).collect()
            } else {
                Vec::new()
            };
        for node in removed {
            self.entries[node.index()].parent = None;
        }
        Ok(())
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(tree: &mut Tree, kind: TokType, value: &str, prefix: &str) -> NodeId {
        tree.new_leaf(Leaf::new(kind, value, prefix))
    }

    /// Builds `a\n` `b\n` `c\n` as three statement lines under one root.
    fn three_lines() -> (Tree, Vec<NodeId>) {
        let mut tree = Tree::new(SyntaxKind::Module);
        let mut lines = Vec::new();
        for (name, prefix) in [("a", "# head\n"), ("b", ""), ("c", "\n")] {
            let n = leaf(&mut tree, TokType::Name, name, prefix);
            let nl = leaf(&mut tree, TokType::Newline, "\n", "");
            lines.push(tree.new_branch(SyntaxKind::SimpleStatement, vec![n, nl]));
        }
        let root = tree.new_branch(SyntaxKind::Module, lines.clone());
        tree.set_root(root);
        (tree, lines)
    }

    #[test]
    fn test_render_and_navigation() {
        let (tree, lines) = three_lines();
        assert_eq!(tree.render(), "# head\na\nb\n\nc\n");
        assert_eq!(tree.parent(lines[1]), Some(tree.root()));
        assert_eq!(tree.next_sibling(lines[0]), Some(lines[1]));
        assert_eq!(tree.prev_sibling(lines[0]), None);
        assert_eq!(tree.prefix(lines[0]), "# head\n");
        assert_eq!(tree.code(lines[2]), "c\n");
    }

    #[test]
    fn test_splice_keeps_first_prefix() {
        let (mut tree, lines) = three_lines();
        let x = leaf(&mut tree, TokType::Name, "x", "");
        let nl = leaf(&mut tree, TokType::Newline, "\n", "");
        let stmt = tree.new_branch(SyntaxKind::SimpleStatement, vec![x, nl]);
        tree.splice(&lines[0..2], vec![stmt]).unwrap();
        assert_eq!(tree.render(), "# head\nx\n\nc\n");
        assert_eq!(tree.parent(stmt), Some(tree.root()));
        assert_eq!(tree.parent(lines[0]), None);
    }

    #[test]
    fn test_splice_rejects_gaps() {
        let (mut tree, lines) = three_lines();
        let err = tree.splice(&[lines[0], lines[2]], Vec::new()).unwrap_err();
        assert_eq!(err, TreeError::NotContiguous);
    }

    #[test]
    fn test_splice_empty_carries_comment_lines() {
        let (mut tree, lines) = three_lines();
        tree.splice(&lines[0..1], Vec::new()).unwrap();
        assert_eq!(tree.render(), "# head\nb\n\nc\n");
    }

    #[test]
    fn test_insert_before_and_graft() {
        let (mut tree, lines) = three_lines();
        let (other, other_lines) = three_lines();
        let copy = tree.graft(&other, other_lines[2]);
        tree.insert_before(lines[0], vec![copy]).unwrap();
        assert_eq!(tree.render(), "\nc\n# head\na\nb\n\nc\n");
    }

    #[test]
    fn test_indent() {
        let mut tree = Tree::new(SyntaxKind::Module);
        let n = leaf(&mut tree, TokType::Name, "x", "# c\n    ");
        assert_eq!(tree.indent(n), "    ");
        let m = leaf(&mut tree, TokType::Name, "y", "  ");
        assert_eq!(tree.indent(m), "  ");
    }
}
