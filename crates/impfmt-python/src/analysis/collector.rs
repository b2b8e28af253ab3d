//! Single-pass import collection.
//!
//! [`ImportCollector`] walks a parsed module once and produces the import
//! blocks, the scope table and the flat list of imported names. State that
//! changes during the walk (the scope stack and the block currently accepting
//! statements) lives in an explicit [`TraversalContext`].
//!
//! Only *import lines* take part in blocks: a simple statement holding a
//! single import, sitting directly in the module or in an indented suite.
//! Imports that share their line with other statements, or that live in an
//! inline suite (`if x: import a`), are recorded in the scope table and the
//! listing but never rewritten.

use impfmt_cst::visitor::{walk, VisitResult, Visitor};
use impfmt_cst::{NodeId, SyntaxKind, TokType, Tree};

use super::pattern::{match_pattern, Pattern};
use super::scope::{Definition, ScopeId, ScopeKind, ScopeTable};
use crate::error::{EngineError, EngineResult};
use crate::imports::{ImportBlock, ImportSymbol};

/// An imported name as reported by listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedSymbol {
    pub name: String,
    pub line: u32,
}

/// Everything one collection pass learned about a module.
#[derive(Debug, Clone)]
pub struct ModuleImports {
    /// Blocks in source order; block 0 is always present.
    pub blocks: Vec<ImportBlock>,
    pub scopes: ScopeTable,
    pub listed: Vec<ListedSymbol>,
}

impl ModuleImports {
    /// Blocks living directly in `container`.
    pub fn blocks_in(&self, container: NodeId) -> impl Iterator<Item = &ImportBlock> {
        self.blocks
            .iter()
            .filter(move |block| block.container == container)
    }
}

/// Collect imports, blocks and scopes of a parsed module.
pub fn collect_imports(tree: &Tree) -> EngineResult<ModuleImports> {
    let mut collector = ImportCollector::new();
    walk(&mut collector, tree, tree.root());
    collector.finish()
}

/// Mutable traversal state threaded through the collector.
#[derive(Debug, Clone)]
pub struct TraversalContext {
    scope_stack: Vec<ScopeId>,
    open_block: Option<usize>,
}

impl TraversalContext {
    fn new(module: ScopeId) -> Self {
        Self {
            scope_stack: vec![module],
            open_block: None,
        }
    }

    pub fn current_scope(&self) -> Option<ScopeId> {
        self.scope_stack.last().copied()
    }

    pub fn open_block(&self) -> Option<usize> {
        self.open_block
    }

    pub fn depth(&self) -> usize {
        self.scope_stack.len()
    }
}

pub struct ImportCollector {
    context: TraversalContext,
    scopes: ScopeTable,
    blocks: Vec<ImportBlock>,
    listed: Vec<ListedSymbol>,
    error: Option<EngineError>,
}

impl Default for ImportCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportCollector {
    pub fn new() -> Self {
        let scopes = ScopeTable::new();
        Self {
            context: TraversalContext::new(scopes.module()),
            scopes,
            blocks: Vec::new(),
            listed: Vec::new(),
            error: None,
        }
    }

    pub fn context(&self) -> &TraversalContext {
        &self.context
    }

    pub fn finish(self) -> EngineResult<ModuleImports> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Ok(ModuleImports {
            blocks: self.blocks,
            scopes: self.scopes,
            listed: self.listed,
        })
    }

    fn fail(&mut self, err: EngineError) -> VisitResult {
        if self.error.is_none() {
            self.error = Some(err);
        }
        VisitResult::Stop
    }

    fn close_block(&mut self) {
        self.context.open_block = None;
    }

    fn scope(&self) -> ScopeId {
        self.context
            .current_scope()
            .unwrap_or_else(|| self.scopes.module())
    }

    fn enter_scope(&mut self, kind: ScopeKind, name: &str) -> ScopeId {
        let id = self.scopes.push(kind, name, self.scope());
        self.context.scope_stack.push(id);
        id
    }

    fn leave_scope(&mut self) {
        if self.context.scope_stack.len() > 1 {
            self.context.scope_stack.pop();
        }
    }

    fn record_symbols(&mut self, symbols: &[ImportSymbol]) {
        let scope = self.scope();
        for symbol in symbols {
            self.scopes.define(
                scope,
                Definition::Import {
                    source_name: symbol.source_name.clone(),
                    alias: symbol.alias.clone(),
                    kind: symbol.kind,
                },
                symbol.line,
            );
            self.listed.push(ListedSymbol {
                name: symbol.source_name.clone(),
                line: symbol.line,
            });
        }
    }

    /// Block that `statement` belongs to, opening a new one when it does not
    /// continue the open block.
    fn block_for(&mut self, tree: &Tree, statement: NodeId, container: NodeId) -> usize {
        if let Some(first) = self.blocks.first() {
            if first.nodes.is_empty() && first.anchor == Some(statement) {
                self.context.open_block = Some(0);
                return 0;
            }
        }
        let indent = tree.indent(statement);
        if let Some(open) = self.context.open_block {
            let block = &self.blocks[open];
            let continues = block.container == container
                && block.indent == indent
                && !tree.prefix(statement).contains('#')
                && block.nodes.last().copied() == tree.prev_sibling(statement);
            if continues {
                return open;
            }
        }
        let id = self.blocks.len();
        let mut block = ImportBlock::new(id, container, indent);
        block.line = tree.line(statement);
        block.column = tree.column(statement);
        self.blocks.push(block);
        self.context.open_block = Some(id);
        id
    }
}

fn import_symbols(tree: &Tree, node: NodeId) -> EngineResult<Vec<ImportSymbol>> {
    match match_pattern(tree, node)? {
        Pattern::ImportName { symbols } | Pattern::ImportFrom { symbols } => Ok(symbols),
        other => Err(EngineError::shape(
            format!("expected an import, matched {:?}", other),
            tree.line(node),
        )),
    }
}

/// The import of a statement line that holds nothing else, with the statement
/// list it sits in.
fn import_line(tree: &Tree, statement: NodeId) -> Option<(NodeId, NodeId)> {
    let [import, _newline] = tree.children(statement) else {
        return None;
    };
    if !matches!(
        tree.syntax_kind(*import),
        Some(SyntaxKind::ImportName | SyntaxKind::ImportFrom)
    ) {
        return None;
    }
    let container = tree.parent(statement)?;
    match tree.syntax_kind(container) {
        Some(SyntaxKind::Module | SyntaxKind::Suite) => Some((*import, container)),
        _ => None,
    }
}

fn is_docstring(tree: &Tree, statement: NodeId) -> bool {
    if tree.syntax_kind(statement) != Some(SyntaxKind::SimpleStatement) {
        return false;
    }
    let [expression, _newline] = tree.children(statement) else {
        return false;
    };
    tree.syntax_kind(*expression) == Some(SyntaxKind::SmallStatement)
        && tree
            .children(*expression)
            .iter()
            .all(|&part| tree.tok_type(part) == Some(TokType::String))
}

impl Visitor for ImportCollector {
    fn visit_module(&mut self, tree: &Tree, node: NodeId) -> VisitResult {
        let children = tree.children(node);
        let docstring = children
            .first()
            .is_some_and(|&first| is_docstring(tree, first));
        let anchor = children.get(usize::from(docstring)).copied();
        let mut block = ImportBlock::new(0, node, "");
        block.anchor = anchor;
        block.after_docstring = docstring;
        if let Some(anchor) = anchor {
            block.line = tree.line(anchor);
            block.column = tree.column(anchor);
        }
        self.blocks.push(block);
        VisitResult::Continue
    }

    fn visit_simple_statement(&mut self, tree: &Tree, node: NodeId) -> VisitResult {
        let Some((import, container)) = import_line(tree, node) else {
            self.close_block();
            return VisitResult::Continue;
        };
        let symbols = match import_symbols(tree, import) {
            Ok(symbols) => symbols,
            Err(err) => return self.fail(err),
        };
        self.record_symbols(&symbols);
        let id = self.block_for(tree, node, container);
        let block = &mut self.blocks[id];
        block.nodes.push(node);
        for symbol in symbols {
            block.obtain_symbol(
                &symbol.source_name,
                symbol.alias,
                symbol.comment,
                symbol.kind,
                symbol.line,
            );
        }
        VisitResult::SkipChildren
    }

    fn visit_import_name(&mut self, tree: &Tree, node: NodeId) -> VisitResult {
        match import_symbols(tree, node) {
            Ok(symbols) => {
                self.record_symbols(&symbols);
                VisitResult::SkipChildren
            }
            Err(err) => self.fail(err),
        }
    }

    fn visit_import_from(&mut self, tree: &Tree, node: NodeId) -> VisitResult {
        self.visit_import_name(tree, node)
    }

    fn visit_assignment(&mut self, tree: &Tree, node: NodeId) -> VisitResult {
        match match_pattern(tree, node) {
            Ok(Pattern::Assignment { targets }) => {
                let scope = self.scope();
                let line = tree.line(node);
                for name in targets {
                    self.scopes.define(scope, Definition::Assign { name }, line);
                }
                VisitResult::Continue
            }
            Ok(_) => VisitResult::Continue,
            Err(err) => self.fail(err),
        }
    }

    fn visit_attribute(&mut self, tree: &Tree, node: NodeId) -> VisitResult {
        if let Ok(Pattern::Attribute { dotted }) = match_pattern(tree, node) {
            let scope = self.scope();
            self.scopes.record_use(scope, dotted);
        }
        VisitResult::SkipChildren
    }

    fn visit_class_def(&mut self, tree: &Tree, node: NodeId) -> VisitResult {
        self.close_block();
        match match_pattern(tree, node) {
            Ok(Pattern::ClassDef { name, bases }) => {
                let line = tree.line(node);
                let scope = self.scope();
                self.scopes.define(
                    scope,
                    Definition::Class {
                        name: name.clone(),
                        bases,
                    },
                    line,
                );
                self.enter_scope(ScopeKind::Class, &name);
                VisitResult::Continue
            }
            Ok(other) => self.fail(EngineError::shape(
                format!("class definition matched {:?}", other),
                tree.line(node),
            )),
            Err(err) => self.fail(err),
        }
    }

    fn leave_class_def(&mut self, _tree: &Tree, _node: NodeId) {
        self.leave_scope();
        self.close_block();
    }

    fn visit_func_def(&mut self, tree: &Tree, node: NodeId) -> VisitResult {
        self.close_block();
        match match_pattern(tree, node) {
            Ok(Pattern::FuncDef { name, params }) => {
                let line = tree.line(node);
                let scope = self.scope();
                self.scopes.define(
                    scope,
                    Definition::Function { name: name.clone() },
                    line,
                );
                let inner = self.enter_scope(ScopeKind::Function, &name);
                for param in params {
                    self.scopes.define(inner, Definition::Param { name: param }, line);
                }
                VisitResult::Continue
            }
            Ok(other) => self.fail(EngineError::shape(
                format!("function definition matched {:?}", other),
                tree.line(node),
            )),
            Err(err) => self.fail(err),
        }
    }

    fn leave_func_def(&mut self, _tree: &Tree, _node: NodeId) {
        self.leave_scope();
        self.close_block();
    }

    fn visit_decorated(&mut self, _tree: &Tree, _node: NodeId) -> VisitResult {
        self.close_block();
        VisitResult::Continue
    }

    fn leave_decorated(&mut self, _tree: &Tree, _node: NodeId) {
        self.close_block();
    }

    fn visit_async_statement(&mut self, _tree: &Tree, _node: NodeId) -> VisitResult {
        self.close_block();
        VisitResult::Continue
    }

    fn leave_async_statement(&mut self, _tree: &Tree, _node: NodeId) {
        self.close_block();
    }

    fn visit_block_statement(&mut self, _tree: &Tree, _node: NodeId) -> VisitResult {
        self.close_block();
        VisitResult::Continue
    }

    fn leave_block_statement(&mut self, _tree: &Tree, _node: NodeId) {
        self.close_block();
    }
}
