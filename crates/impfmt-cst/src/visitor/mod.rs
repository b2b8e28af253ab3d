// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Visitor infrastructure for tree traversal.
//!
//! The [`Visitor`] trait has a macro-generated `visit_*` / `leave_*` pair for
//! every [`SyntaxKind`](crate::SyntaxKind); [`walk`] dispatches over the kinds
//! exhaustively, so adding a kind without a visitor hook fails to compile.
//!
//! # Traversal Order
//!
//! - **Depth-first, pre-order** for `visit_*` methods
//! - **Post-order** for `leave_*` methods
//! - Children are visited in source order

mod dispatch;
mod traits;

pub use dispatch::{walk, walk_children};
pub use traits::{VisitResult, Visitor};
