// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Scope table built during the import pass.
//!
//! Scopes form a tree: the module scope at the root, a class or function
//! scope for every definition body. A scope is entered when its body starts
//! and left when it ends; its definitions and uses stay in the table for the
//! rest of the pass.

use std::fmt;

use crate::imports::ImportKind;

/// The kind of scope in Python.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// Module-level scope (top-level of a file).
    Module,
    /// Class body scope.
    Class,
    /// Function or method body scope.
    Function,
}

impl ScopeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeKind::Module => "module",
            ScopeKind::Class => "class",
            ScopeKind::Function => "function",
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Index of a scope in its [`ScopeTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

impl ScopeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A name bound in a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Definition {
    Import {
        source_name: String,
        alias: Option<String>,
        kind: ImportKind,
    },
    Class {
        name: String,
        bases: Vec<String>,
    },
    Function {
        name: String,
    },
    Param {
        name: String,
    },
    Assign {
        name: String,
    },
}

impl Definition {
    /// The name the definition binds.
    pub fn name(&self) -> &str {
        match self {
            Definition::Import {
                source_name,
                alias,
                kind,
            } => match (alias, kind) {
                (Some(alias), _) => alias,
                (None, ImportKind::From) => crate::imports::split_source(source_name).1,
                (None, ImportKind::Import) => {
                    source_name.split('.').next().unwrap_or(source_name)
                }
            },
            Definition::Class { name, .. }
            | Definition::Function { name }
            | Definition::Param { name }
            | Definition::Assign { name } => name,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    /// Class or function name; `None` for the module.
    pub name: Option<String>,
    pub parent: Option<ScopeId>,
    /// Bindings with the line they appear on.
    pub definitions: Vec<(Definition, u32)>,
    /// Dotted attribute chains read in this scope.
    pub uses: Vec<String>,
}

impl Scope {
    /// Import definitions in source order.
    pub fn imports(&self) -> impl Iterator<Item = (&str, Option<&str>, ImportKind)> {
        self.definitions.iter().filter_map(|(def, _)| match def {
            Definition::Import {
                source_name,
                alias,
                kind,
            } => Some((source_name.as_str(), alias.as_deref(), *kind)),
            _ => None,
        })
    }

    /// Whether `name` is bound in this scope.
    pub fn defines(&self, name: &str) -> bool {
        self.definitions.iter().any(|(def, _)| def.name() == name)
    }
}

/// Arena of scopes; index 0 is always the module scope.
#[derive(Debug, Clone)]
pub struct ScopeTable {
    scopes: Vec<Scope>,
}

impl Default for ScopeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope {
                kind: ScopeKind::Module,
                name: None,
                parent: None,
                definitions: Vec::new(),
                uses: Vec::new(),
            }],
        }
    }

    pub fn module(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn push(&mut self, kind: ScopeKind, name: impl Into<String>, parent: ScopeId) -> ScopeId {
        self.scopes.push(Scope {
            kind,
            name: Some(name.into()),
            parent: Some(parent),
            definitions: Vec::new(),
            uses: Vec::new(),
        });
        ScopeId(self.scopes.len() - 1)
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    pub fn define(&mut self, id: ScopeId, definition: Definition, line: u32) {
        self.scopes[id.0].definitions.push((definition, line));
    }

    pub fn record_use(&mut self, id: ScopeId, dotted: impl Into<String>) {
        self.scopes[id.0].uses.push(dotted.into());
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ScopeId, &Scope)> {
        self.scopes
            .iter()
            .enumerate()
            .map(|(index, scope)| (ScopeId(index), scope))
    }

    /// Dotted path of names from the module down to `id` (`Outer.method`).
    pub fn qualified_name(&self, id: ScopeId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(scope_id) = current {
            let scope = self.get(scope_id);
            if let Some(name) = &scope.name {
                parts.push(name.as_str());
            }
            current = scope.parent;
        }
        parts.reverse();
        parts.join(".")
    }
}
