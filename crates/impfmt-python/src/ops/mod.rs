//! Operations that rewrite a module's imports.

pub mod render;
pub mod reorganize;
pub mod resolve;

pub use render::{compare_statements, partition, render_statement, Statement};
pub use reorganize::{regenerate_block, reorganize, ReorganizeOptions};
pub use resolve::{
    package_identity, LocalImportResolver, PackageExports, ResolverCache, SkipReason,
    SkippedResolution, AGGREGATOR_FILE,
};
