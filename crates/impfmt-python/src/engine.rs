//! Per-file entry points.
//!
//! [`Engine`] owns the options and the resolver cache for one run. The free
//! functions are conveniences for callers that transform a single source
//! string with no file behind it.

use std::fs;
use std::path::Path;

use impfmt_core::text::detect_newline;
use impfmt_cst::{parse_module, parse_module_with_options, ParseOptions, Tree, DEFAULT_MAX_FILE_SIZE};
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span};

use crate::analysis::{collect_imports, ListedSymbol};
use crate::error::{EngineError, EngineResult};
use crate::imports::{ImportKind, RenameMap};
use crate::ops::{
    regenerate_block, reorganize, LocalImportResolver, ReorganizeOptions, ResolverCache,
    SkippedResolution,
};

/// Default page width for regenerated statements.
pub const DEFAULT_PAGE_WIDTH: usize = 100;

/// Options for one transformation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    /// Old dotted name to new dotted name.
    pub rename_map: RenameMap,
    /// Apply `rename_map` from values to keys.
    pub invert_rename_map: bool,
    /// `None` resolves local imports whenever the file path is known.
    pub resolve_local_imports: Option<bool>,
    pub page_width: usize,
    /// Inputs above this many bytes are refused before parsing.
    pub max_file_size: usize,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            rename_map: RenameMap::new(),
            invert_rename_map: false,
            resolve_local_imports: None,
            page_width: DEFAULT_PAGE_WIDTH,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl TransformOptions {
    /// The rename map in the direction it should be applied.
    pub fn effective_rename_map(&self) -> RenameMap {
        if self.invert_rename_map {
            self.rename_map.inverted()
        } else {
            self.rename_map.clone()
        }
    }

    fn parse(&self, source: &str) -> EngineResult<Tree> {
        let options = ParseOptions::default().with_max_file_size(Some(self.max_file_size));
        Ok(parse_module_with_options(source, options)?)
    }
}

/// Result of a transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutcome {
    /// Whether `output` differs from the input.
    pub changed: bool,
    pub output: String,
    /// Local-import rewrites that were declined.
    pub skipped: Vec<SkippedResolution>,
}

impl TransformOutcome {
    fn unchanged(source: &str) -> Self {
        Self {
            changed: false,
            output: source.to_string(),
            skipped: Vec::new(),
        }
    }

    fn from_output(source: &str, output: String, skipped: Vec<SkippedResolution>) -> Self {
        Self {
            changed: output != source,
            output,
            skipped,
        }
    }
}

/// Import reorganizer for a run over one or more files.
///
/// Aggregator files read during local-import resolution are cached for the
/// lifetime of the engine. Create a new engine per run so edits made between
/// runs are seen.
#[derive(Debug, Default)]
pub struct Engine {
    options: TransformOptions,
    cache: ResolverCache,
}

impl Engine {
    pub fn new(options: TransformOptions) -> Self {
        Self {
            options,
            cache: ResolverCache::new(),
        }
    }

    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    pub fn cache(&self) -> &ResolverCache {
        &self.cache
    }

    /// Reorganize the imports of `source`.
    ///
    /// `path` is the file the source came from; local-import resolution needs
    /// it to find the package aggregator.
    pub fn transform_source(
        &mut self,
        source: &str,
        path: Option<&Path>,
    ) -> EngineResult<TransformOutcome> {
        let _span = info_span!("transform", path = ?path.map(Path::display)).entered();
        let mut tree = self.options.parse(source)?;
        let mut imports = collect_imports(&tree)?;
        debug!(blocks = imports.blocks.len(), "collected imports");

        let rename_map = self.options.effective_rename_map();
        let settings = ReorganizeOptions {
            rename_map: Some(&rename_map),
            page_width: self.options.page_width,
            newline: detect_newline(source),
        };
        let resolve = self.options.resolve_local_imports.unwrap_or(path.is_some());
        let skipped = match path.filter(|_| resolve) {
            Some(path) => {
                let mut resolver = LocalImportResolver::new(path, &mut self.cache);
                reorganize(&mut tree, &mut imports.blocks, &settings, Some(&mut resolver))?
            }
            None => reorganize(&mut tree, &mut imports.blocks, &settings, None)?,
        };
        Ok(TransformOutcome::from_output(source, tree.render(), skipped))
    }

    /// Read `path` and reorganize its imports. The file is not written.
    pub fn transform_file(&mut self, path: &Path) -> EngineResult<TransformOutcome> {
        let source = fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.transform_source(&source, Some(path))
    }
}

/// Reorganize the imports of a source string with no file behind it.
pub fn transform(source: &str, options: &TransformOptions) -> EngineResult<TransformOutcome> {
    Engine::new(options.clone()).transform_source(source, None)
}

/// Every imported name in source order, including imports the reorganizer
/// leaves alone.
pub fn list_imported_symbols(source: &str) -> EngineResult<Vec<ListedSymbol>> {
    let tree = parse_module(source)?;
    Ok(collect_imports(&tree)?.listed)
}

/// Add an import of `dotted_name` at the top of the module.
///
/// `a.b.c` is added as `from a.b import c`, a name without dots as
/// `import name`. Nothing changes when a module-level block already has the
/// name. Only the top block is regenerated.
pub fn add_import_symbol(
    source: &str,
    dotted_name: &str,
    options: &TransformOptions,
) -> EngineResult<TransformOutcome> {
    if !is_dotted_name(dotted_name) {
        return Err(EngineError::InvalidName(dotted_name.to_string()));
    }
    let mut tree = options.parse(source)?;
    let mut imports = collect_imports(&tree)?;
    if imports
        .blocks_in(tree.root())
        .any(|block| block.contains(dotted_name))
    {
        debug!(name = dotted_name, "import already present");
        return Ok(TransformOutcome::unchanged(source));
    }
    let kind = if dotted_name.contains('.') {
        ImportKind::From
    } else {
        ImportKind::Import
    };
    let block = imports
        .blocks
        .first_mut()
        .ok_or_else(|| EngineError::shape("module has no top import block", 0))?;
    block.obtain_symbol(dotted_name, None, None, kind, 0);
    regenerate_block(&mut tree, block, options.page_width, detect_newline(source))?;
    Ok(TransformOutcome::from_output(source, tree.render(), Vec::new()))
}

fn is_dotted_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|part| {
            let mut chars = part.chars();
            chars
                .next()
                .is_some_and(|c| c == '_' || c.is_alphabetic())
                && chars.all(|c| c == '_' || c.is_alphanumeric())
        })
}
