// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Concrete syntax tree node types.

mod kind;
mod tree;

pub use kind::SyntaxKind;
pub use tree::{Leaf, NodeId, Tree, TreeError};
