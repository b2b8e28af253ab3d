// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Contiguous import regions.
//!
//! An [`ImportBlock`] owns the symbols found in one run of import statements
//! and the tree nodes that run occupies. Regeneration replaces all of those
//! nodes with freshly rendered statements.

use impfmt_cst::NodeId;
use tracing::trace;

use super::group::ImportGroup;
use super::rename::RenameMap;
use super::symbol::{split_source, ImportKind, ImportSymbol};

/// A child of a block: an ungrouped plain import or a from-import group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockEntry {
    Symbol(ImportSymbol),
    Group(ImportGroup),
}

#[derive(Debug, Clone)]
pub struct ImportBlock {
    /// Sequential id; block 0 is the module-top insertion point.
    pub id: usize,
    pub line: u32,
    pub column: u32,
    /// Indentation of the statements in the block.
    pub indent: String,
    /// Statement list the block lives in (module root or a suite).
    pub container: NodeId,
    /// Statements the block replaces, in order.
    pub nodes: Vec<NodeId>,
    /// Where new statements go when the block has no nodes of its own.
    pub anchor: Option<NodeId>,
    /// Whether a module docstring directly precedes the anchor.
    pub after_docstring: bool,
    pub entries: Vec<BlockEntry>,
}

impl ImportBlock {
    pub fn new(id: usize, container: NodeId, indent: impl Into<String>) -> Self {
        Self {
            id,
            line: 0,
            column: 0,
            indent: indent.into(),
            container,
            nodes: Vec::new(),
            anchor: None,
            after_docstring: false,
            entries: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All symbols in entry order.
    pub fn symbols(&self) -> impl Iterator<Item = &ImportSymbol> {
        self.entries.iter().flat_map(|entry| match entry {
            BlockEntry::Symbol(symbol) => std::slice::from_ref(symbol).iter(),
            BlockEntry::Group(group) => group.symbols.iter(),
        })
    }

    pub fn find(&self, source_name: &str) -> Option<&ImportSymbol> {
        self.symbols().find(|s| s.source_name == source_name)
    }

    pub fn contains(&self, source_name: &str) -> bool {
        self.find(source_name).is_some()
    }

    /// Dedup-aware insert.
    ///
    /// Returns the existing symbol when `source_name` is already present, so
    /// the alias and comment of the first addition win. Otherwise the symbol
    /// is created and attached to its group (from imports) or to the block
    /// (plain imports).
    pub fn obtain_symbol(
        &mut self,
        source_name: &str,
        alias: Option<String>,
        comment: Option<String>,
        kind: ImportKind,
        line: u32,
    ) -> &ImportSymbol {
        if let Some(index) = self.position_of(source_name) {
            trace!(block = self.id, source_name, "duplicate import reused");
            return self.symbol_at(index);
        }
        let symbol = ImportSymbol::new(source_name, alias, comment, kind, line);
        match kind {
            ImportKind::Import => {
                self.entries.push(BlockEntry::Symbol(symbol));
                self.symbol_at((self.entries.len() - 1, None))
            }
            ImportKind::From => {
                let module = split_source(source_name).0;
                let group_index = match self.entries.iter().position(
                    |entry| matches!(entry, BlockEntry::Group(group) if group.module == module),
                ) {
                    Some(index) => index,
                    None => {
                        self.entries.push(BlockEntry::Group(ImportGroup::new(module)));
                        self.entries.len() - 1
                    }
                };
                let symbol_index = match &mut self.entries[group_index] {
                    BlockEntry::Group(group) => {
                        group.symbols.push(symbol);
                        group.symbols.len() - 1
                    }
                    BlockEntry::Symbol(_) => 0,
                };
                self.symbol_at((group_index, Some(symbol_index)))
            }
        }
    }

    /// Removes the symbol with `source_name`, dropping its group if emptied.
    pub fn detach(&mut self, source_name: &str) -> Option<ImportSymbol> {
        let (entry_index, symbol_index) = self.position_of(source_name)?;
        match symbol_index {
            None => match self.entries.remove(entry_index) {
                BlockEntry::Symbol(symbol) => Some(symbol),
                BlockEntry::Group(_) => None,
            },
            Some(_) => {
                let BlockEntry::Group(group) = &mut self.entries[entry_index] else {
                    return None;
                };
                let removed = group.remove(source_name);
                if group.is_empty() {
                    trace!(block = self.id, module = %group.module, "removed empty group");
                    self.entries.remove(entry_index);
                }
                removed
            }
        }
    }

    /// Applies `map` to every symbol.
    ///
    /// A renamed symbol keeps its alias, comment and line. A from import whose
    /// new name has no module part becomes a plain import. Returns the number
    /// of symbols renamed.
    pub fn refactor(&mut self, map: &RenameMap) -> usize {
        let originals: Vec<ImportSymbol> = self.symbols().cloned().collect();
        let mut renamed = 0;
        for symbol in originals {
            let Some(new_name) = map.rename(&symbol.source_name) else {
                continue;
            };
            if new_name == symbol.source_name {
                continue;
            }
            let kind = match symbol.kind {
                ImportKind::From if new_name.contains('.') => ImportKind::From,
                _ => ImportKind::Import,
            };
            self.obtain_symbol(
                &new_name,
                symbol.alias.clone(),
                symbol.comment.clone(),
                kind,
                symbol.line,
            );
            self.detach(&symbol.source_name);
            renamed += 1;
        }
        renamed
    }

    fn position_of(&self, source_name: &str) -> Option<(usize, Option<usize>)> {
        self.entries
            .iter()
            .enumerate()
            .find_map(|(index, entry)| match entry {
                BlockEntry::Symbol(symbol) if symbol.source_name == source_name => {
                    Some((index, None))
                }
                BlockEntry::Symbol(_) => None,
                BlockEntry::Group(group) => group
                    .symbols
                    .iter()
                    .position(|s| s.source_name == source_name)
                    .map(|i| (index, Some(i))),
            })
    }

    fn symbol_at(&self, (entry_index, symbol_index): (usize, Option<usize>)) -> &ImportSymbol {
        match (&self.entries[entry_index], symbol_index) {
            (BlockEntry::Group(group), Some(i)) => &group.symbols[i],
            (BlockEntry::Symbol(symbol), _) => symbol,
            (BlockEntry::Group(group), None) => &group.symbols[0],
        }
    }
}
