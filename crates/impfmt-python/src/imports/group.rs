// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Symbols sharing one `from <module> import` origin.

use std::cmp::Ordering;

use super::symbol::ImportSymbol;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportGroup {
    pub module: String,
    pub symbols: Vec<ImportSymbol>,
}

impl ImportGroup {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            symbols: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn find(&self, source_name: &str) -> Option<&ImportSymbol> {
        self.symbols.iter().find(|s| s.source_name == source_name)
    }

    /// Removes and returns the symbol with `source_name`.
    pub fn remove(&mut self, source_name: &str) -> Option<ImportSymbol> {
        let index = self
            .symbols
            .iter()
            .position(|s| s.source_name == source_name)?;
        Some(self.symbols.remove(index))
    }

    /// Underscore-prefixed modules rank first.
    pub fn priority(&self) -> u8 {
        group_priority(&self.module)
    }
}

/// Rank of a from-import module: `_private` and `__future__` before the rest.
pub fn group_priority(module: &str) -> u8 {
    if module.starts_with('_') {
        0
    } else {
        1
    }
}

/// Order of two groups: priority, then module name.
pub fn compare_groups(a: &ImportGroup, b: &ImportGroup) -> Ordering {
    a.priority()
        .cmp(&b.priority())
        .then_with(|| a.module.cmp(&b.module))
}

/// Order of two symbols: priority, then source name.
pub fn compare_symbols(a: &ImportSymbol, b: &ImportSymbol) -> Ordering {
    a.priority()
        .cmp(&b.priority())
        .then_with(|| a.source_name.cmp(&b.source_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imports::ImportKind;

    #[test]
    fn group_ordering() {
        let mut groups = vec![
            ImportGroup::new("zulu"),
            ImportGroup::new("alpha"),
            ImportGroup::new("__future__"),
            ImportGroup::new("_private"),
        ];
        groups.sort_by(compare_groups);
        let modules: Vec<_> = groups.iter().map(|g| g.module.as_str()).collect();
        assert_eq!(modules, vec!["__future__", "_private", "alpha", "zulu"]);
    }

    #[test]
    fn symbol_ordering() {
        let sym = |name: &str, comment: Option<&str>| {
            ImportSymbol::new(name, None, comment.map(String::from), ImportKind::From, 1)
        };
        let mut symbols = vec![
            sym("m.b", None),
            sym("m.z", Some("# @last-import")),
            sym("m._a", None),
            sym("m.a", None),
        ];
        symbols.sort_by(compare_symbols);
        let names: Vec<_> = symbols.iter().map(|s| s.token()).collect();
        assert_eq!(names, vec!["_a", "a", "b", "z"]);
    }

    #[test]
    fn remove_from_group() {
        let mut group = ImportGroup::new("m");
        group
            .symbols
            .push(ImportSymbol::new("m.a", None, None, ImportKind::From, 1));
        assert!(group.find("m.a").is_some());
        assert!(group.remove("m.b").is_none());
        assert!(group.remove("m.a").is_some());
        assert!(group.is_empty());
    }
}
