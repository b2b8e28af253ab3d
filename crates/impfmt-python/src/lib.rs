//! Python import reorganization engine for impfmt.
//!
//! The engine parses one Python file into a lossless syntax tree, collects
//! its import statements into blocks, and regenerates every block as sorted,
//! deduplicated, canonically formatted statements. Everything outside the
//! import blocks is left byte for byte as it was.
//!
//! - [`analysis`]: grammar patterns, scope table and the import collector
//! - [`imports`]: the import model (symbols, groups, blocks, rename maps)
//! - [`ops`]: rendering, block regeneration and local-import resolution
//! - [`engine`]: the per-file entry points

pub mod analysis;
pub mod engine;
pub mod error;
pub mod imports;
pub mod ops;

pub use analysis::ListedSymbol;
pub use engine::{
    add_import_symbol, list_imported_symbols, transform, Engine, TransformOptions,
    TransformOutcome, DEFAULT_PAGE_WIDTH,
};
pub use error::{EngineError, EngineResult};
pub use imports::RenameMap;
pub use ops::{ResolverCache, SkipReason, SkippedResolution};
