//! Import model: symbols, groups and blocks populated by the collector.

mod block;
mod group;
mod rename;
mod symbol;

pub use block::{BlockEntry, ImportBlock};
pub use group::{compare_groups, compare_symbols, group_priority, ImportGroup};
pub use rename::RenameMap;
pub use symbol::{join_source, split_source, ImportKind, ImportSymbol, LAST_IMPORT_MARKER};
