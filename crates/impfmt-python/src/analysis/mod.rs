//! Tree analysis: pattern matching, scopes and import collection.

pub mod collector;
pub mod pattern;
pub mod scope;

pub use collector::{collect_imports, ImportCollector, ListedSymbol, ModuleImports, TraversalContext};
pub use pattern::{match_pattern, Pattern};
pub use scope::{Definition, Scope, ScopeId, ScopeKind, ScopeTable};
