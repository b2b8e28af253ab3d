// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Local-import resolution.
//!
//! A module inside a package that imports a name from its own package
//! (`from pkg import Foo` or `from . import Foo`) goes through the package
//! `__init__.py`, which may itself import the module back. When `__init__.py`
//! re-exports `Foo` from a submodule, the import is rewritten to read from
//! that submodule directly, the way the aggregator does.
//!
//! The aggregator is only read. Its export table is computed once per
//! [`ResolverCache`] and reused for every file of the package.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use impfmt_cst::parse_module;
use serde::Serialize;
use tracing::{debug, warn};

use crate::analysis::collect_imports;
use crate::imports::{split_source, ImportBlock, ImportKind, ImportSymbol};

/// File name of a package aggregator.
pub const AGGREGATOR_FILE: &str = "__init__.py";

/// Why a symbol was left as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The import carries an alias.
    Aliased,
    /// The importing file is the aggregator itself.
    IsAggregator,
    /// `import x` rather than `from x import y`.
    PlainImport,
    /// `from x import *`.
    Wildcard,
    /// The file has no sibling `__init__.py`.
    NoAggregator,
    /// The symbol's module is not the file's own package.
    ForeignModule,
    /// The aggregator does not import the token from a submodule.
    NotReExported,
    /// The aggregator could not be read or parsed.
    AggregatorUnreadable,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::Aliased => "aliased",
            SkipReason::IsAggregator => "is_aggregator",
            SkipReason::PlainImport => "plain_import",
            SkipReason::Wildcard => "wildcard",
            SkipReason::NoAggregator => "no_aggregator",
            SkipReason::ForeignModule => "foreign_module",
            SkipReason::NotReExported => "not_re_exported",
            SkipReason::AggregatorUnreadable => "aggregator_unreadable",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A symbol the resolver declined to rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedResolution {
    pub name: String,
    pub line: u32,
    pub reason: SkipReason,
}

/// What a package aggregator re-exports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageExports {
    /// Dotted module path of the package (`app.models`).
    pub identity: String,
    /// Imported token to the aggregator's source name for it
    /// (`Foo` -> `.submodule.Foo`).
    pub exports: BTreeMap<String, String>,
}

impl PackageExports {
    /// Build the export table of an aggregator from its source.
    ///
    /// Only module-level, un-aliased, non-star from-imports of a submodule
    /// count: `.sub` or `<identity>.sub`.
    pub fn from_source(identity: &str, source: &str) -> Option<Self> {
        let tree = parse_module(source).ok()?;
        let imports = collect_imports(&tree).ok()?;
        let module_scope = imports.scopes.get(imports.scopes.module());
        let own_prefix = format!("{}.", identity);
        let mut exports = BTreeMap::new();
        for (source_name, alias, kind) in module_scope.imports() {
            if kind != ImportKind::From || alias.is_some() {
                continue;
            }
            let (module, token) = split_source(source_name);
            let submodule = (module.starts_with('.') && !module.starts_with("..") && module.len() > 1)
                || module.starts_with(&own_prefix);
            if token != "*" && submodule {
                exports
                    .entry(token.to_string())
                    .or_insert_with(|| source_name.to_string());
            }
        }
        Some(Self {
            identity: identity.to_string(),
            exports,
        })
    }
}

/// Export tables keyed by canonical aggregator path.
///
/// `None` entries remember aggregators that could not be read, so they are
/// not retried.
#[derive(Debug, Default)]
pub struct ResolverCache {
    entries: HashMap<PathBuf, Option<PackageExports>>,
}

impl ResolverCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, aggregator: &Path) -> bool {
        self.entries.contains_key(&canonical(aggregator))
    }

    /// Export table of `aggregator`, reading it on first use.
    pub fn load(&mut self, aggregator: &Path) -> Option<&PackageExports> {
        let key = canonical(aggregator);
        self.entries
            .entry(key)
            .or_insert_with_key(|path| read_exports(path))
            .as_ref()
    }
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn read_exports(aggregator: &Path) -> Option<PackageExports> {
    let source = match fs::read_to_string(aggregator) {
        Ok(source) => source,
        Err(err) => {
            warn!(path = %aggregator.display(), error = %err, "cannot read package aggregator");
            return None;
        }
    };
    let Some(identity) = aggregator.parent().and_then(package_identity) else {
        warn!(path = %aggregator.display(), "aggregator has no package identity");
        return None;
    };
    let exports = PackageExports::from_source(&identity, &source);
    match &exports {
        Some(table) => debug!(
            path = %aggregator.display(),
            identity = %table.identity,
            exports = table.exports.len(),
            "loaded package aggregator"
        ),
        None => warn!(path = %aggregator.display(), "cannot parse package aggregator"),
    }
    exports
}

/// Dotted name of the package rooted at `dir`: the chain of enclosing
/// directories that each hold an `__init__.py`.
pub fn package_identity(dir: &Path) -> Option<String> {
    let mut parts = Vec::new();
    let mut current = Some(dir);
    while let Some(path) = current {
        if !path.join(AGGREGATOR_FILE).is_file() {
            break;
        }
        parts.push(path.file_name()?.to_str()?.to_string());
        current = path.parent();
    }
    if parts.is_empty() {
        return None;
    }
    parts.reverse();
    Some(parts.join("."))
}

/// Resolves the imports of one file against its package aggregator.
pub struct LocalImportResolver<'a> {
    file: &'a Path,
    cache: &'a mut ResolverCache,
}

impl<'a> LocalImportResolver<'a> {
    pub fn new(file: &'a Path, cache: &'a mut ResolverCache) -> Self {
        Self { file, cache }
    }

    /// Rewrite what can be rewritten in `block`; report everything else.
    pub fn resolve_block(&mut self, block: &mut ImportBlock) -> Vec<SkippedResolution> {
        let symbols: Vec<ImportSymbol> = block.symbols().cloned().collect();
        let mut skipped = Vec::new();
        for symbol in symbols {
            match self.resolve_symbol(&symbol) {
                Ok(direct) => {
                    debug!(
                        block = block.id,
                        from = %symbol.source_name,
                        to = %direct,
                        "rewrote local import"
                    );
                    block.detach(&symbol.source_name);
                    block.obtain_symbol(
                        &direct,
                        None,
                        symbol.comment.clone(),
                        ImportKind::From,
                        symbol.line,
                    );
                }
                Err(reason) => {
                    debug!(
                        block = block.id,
                        name = %symbol.source_name,
                        %reason,
                        "local import left as written"
                    );
                    skipped.push(SkippedResolution {
                        name: symbol.source_name.clone(),
                        line: symbol.line,
                        reason,
                    });
                }
            }
        }
        skipped
    }

    fn resolve_symbol(&mut self, symbol: &ImportSymbol) -> Result<String, SkipReason> {
        if symbol.kind == ImportKind::Import {
            return Err(SkipReason::PlainImport);
        }
        if symbol.alias.is_some() {
            return Err(SkipReason::Aliased);
        }
        if symbol.is_star() {
            return Err(SkipReason::Wildcard);
        }
        if self.file.file_name().and_then(|name| name.to_str()) == Some(AGGREGATOR_FILE) {
            return Err(SkipReason::IsAggregator);
        }
        let aggregator = self
            .file
            .parent()
            .map(|dir| dir.join(AGGREGATOR_FILE))
            .filter(|path| path.is_file())
            .ok_or(SkipReason::NoAggregator)?;
        let package = self
            .cache
            .load(&aggregator)
            .ok_or(SkipReason::AggregatorUnreadable)?;
        let module = symbol.module().unwrap_or_default();
        if module != package.identity && module != "." {
            return Err(SkipReason::ForeignModule);
        }
        package
            .exports
            .get(symbol.token())
            .cloned()
            .ok_or(SkipReason::NotReExported)
    }
}
