//! Regenerating import blocks in place.
//!
//! Each non-empty block goes through rename, local-import resolution,
//! partition and rendering. The rendered statements are parsed on their own,
//! grafted into the tree and spliced over the block's original statements.
//! Nothing outside the block's statements is touched, with one exception: a
//! block that had no statements of its own (block 0 receiving a new import)
//! splits the prefix of the statement it is inserted in front of, so a
//! leading shebang, encoding line or comment header stays on top.

use impfmt_core::text::Newline;
use impfmt_cst::{parse_module, NodeId, TokType, Tree, TreeError};
use tracing::debug;

use super::render::{partition, render_statement};
use super::resolve::{LocalImportResolver, SkippedResolution};
use crate::error::{EngineError, EngineResult};
use crate::imports::{ImportBlock, RenameMap};

/// Settings for one reorganization pass.
#[derive(Debug, Clone, Copy)]
pub struct ReorganizeOptions<'a> {
    pub rename_map: Option<&'a RenameMap>,
    pub page_width: usize,
    pub newline: Newline,
}

/// Rewrite every non-empty block of a module.
///
/// Returns the symbols local-import resolution declined to rewrite.
pub fn reorganize(
    tree: &mut Tree,
    blocks: &mut [ImportBlock],
    options: &ReorganizeOptions<'_>,
    mut resolver: Option<&mut LocalImportResolver<'_>>,
) -> EngineResult<Vec<SkippedResolution>> {
    let mut skipped = Vec::new();
    for block in blocks.iter_mut() {
        if block.is_empty() {
            continue;
        }
        let renamed = match options.rename_map {
            Some(map) if !map.is_empty() => block.refactor(map),
            _ => 0,
        };
        if let Some(resolver) = resolver.as_deref_mut() {
            skipped.extend(resolver.resolve_block(block));
        }
        let statements = regenerate_block(tree, block, options.page_width, options.newline)?;
        debug!(
            block = block.id,
            line = block.line,
            renamed,
            statements,
            "regenerated import block"
        );
    }
    Ok(skipped)
}

/// Replace the statements of `block` with its canonical rendering.
///
/// Returns the number of statements written.
pub fn regenerate_block(
    tree: &mut Tree,
    block: &ImportBlock,
    page_width: usize,
    newline: Newline,
) -> EngineResult<usize> {
    let statements = partition(block);
    if statements.is_empty() {
        if !block.nodes.is_empty() {
            tree.splice(&block.nodes, Vec::new())
                .map_err(|err| tree_error(err, block))?;
        }
        return Ok(0);
    }

    let mut fragment = String::new();
    for statement in &statements {
        fragment.push_str(&render_statement(statement, &block.indent, page_width, newline));
        fragment.push_str(newline.as_str());
    }
    if ends_at_eof(tree, block) {
        fragment.truncate(fragment.len() - newline.as_str().len());
    }

    let rendered = parse_module(&fragment).map_err(|err| {
        EngineError::shape(
            format!("regenerated imports do not parse: {}", err),
            block.line,
        )
    })?;
    let new_nodes: Vec<NodeId> = rendered
        .children(rendered.root())
        .iter()
        .filter(|&&child| rendered.syntax_kind(child).is_some())
        .map(|&child| tree.graft(&rendered, child))
        .collect();
    for &node in new_nodes.iter().skip(1) {
        tree.set_prefix(node, block.indent.clone());
    }
    let count = new_nodes.len();

    if block.nodes.is_empty() {
        insert_at_anchor(tree, block, new_nodes, newline)?;
    } else {
        tree.splice(&block.nodes, new_nodes)
            .map_err(|err| tree_error(err, block))?;
    }
    Ok(count)
}

fn tree_error(err: TreeError, block: &ImportBlock) -> EngineError {
    EngineError::shape(format!("cannot splice import block: {}", err), block.line)
}

/// Whether the block's last statement ends without a line break at EOF.
fn ends_at_eof(tree: &Tree, block: &ImportBlock) -> bool {
    block
        .nodes
        .last()
        .and_then(|&node| tree.last_leaf(node))
        .is_some_and(|leaf| tree.tok_type(leaf) == Some(TokType::Newline) && tree.value(leaf).is_empty())
}

fn insert_at_anchor(
    tree: &mut Tree,
    block: &ImportBlock,
    new_nodes: Vec<NodeId>,
    newline: Newline,
) -> EngineResult<()> {
    let anchor = block.anchor.ok_or_else(|| {
        EngineError::shape(
            format!("import block {} has neither statements nor anchor", block.id),
            block.line,
        )
    })?;
    let Some(&first) = new_nodes.first() else {
        return Ok(());
    };
    let at_end = tree.tok_type(anchor) == Some(TokType::EndMarker);
    let (mut header, rest) = split_header(tree.prefix(anchor), at_end, newline);
    if block.after_docstring && !has_blank_line(&header) {
        header.insert_str(0, newline.as_str());
    }
    let anchor_prefix = if at_end {
        rest
    } else {
        format!("{}{}", newline.as_str(), rest)
    };
    tree.set_prefix(first, header);
    tree.set_prefix(anchor, anchor_prefix);
    tree.insert_before(anchor, new_nodes)
        .map_err(|err| tree_error(err, block))
}

/// Split the prefix of the anchor statement into the file header that stays
/// above new imports and the part that stays with the anchor.
///
/// The header ends at the last blank line. Without a blank line, every
/// complete comment line is header. At end of file everything is header.
fn split_header(prefix: &str, at_end: bool, newline: Newline) -> (String, String) {
    if at_end {
        let mut header = prefix.to_string();
        if !header.is_empty() && !header.ends_with(['\n', '\r']) {
            header.push_str(newline.as_str());
        }
        return (header, String::new());
    }
    let lines: Vec<&str> = prefix.split_inclusive('\n').collect();
    if let Some(index) = lines
        .iter()
        .rposition(|line| line.ends_with('\n') && line.trim().is_empty())
    {
        return (lines[..=index].concat(), lines[index + 1..].concat());
    }
    match prefix.rfind(['\n', '\r']) {
        Some(pos) => (prefix[..=pos].to_string(), prefix[pos + 1..].to_string()),
        None => (String::new(), prefix.to_string()),
    }
}

fn has_blank_line(text: &str) -> bool {
    text.split_inclusive('\n')
        .any(|line| line.ends_with('\n') && line.trim().is_empty())
}
