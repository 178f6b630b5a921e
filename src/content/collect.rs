//! Block collection: ordered paragraph-equivalent elements
//!
//! The line extractor and spacing normalizer operate on "paragraph-equivalent"
//! leaf blocks, not on wrapper elements. This walk descends transparent
//! containers (lists, table structure, generic wrappers) and records leaves in
//! document order.

use crate::content::{ContentNode, NodeId};

/// A collected block together with its parent container id.
///
/// The parent id lets the spacing normalizer test true siblinghood: two blocks
/// adjacent in the collected list may come from different containers.
#[derive(Debug, Clone, Copy)]
pub struct BlockRef<'a> {
    pub node: &'a ContentNode,
    pub parent: NodeId,
}

/// Collect the ordered list of paragraph-equivalent blocks under `root`.
///
/// Pre-order, left-to-right, top-to-bottom. Containers themselves are never
/// recorded; no block is recorded twice.
pub fn collect_blocks(root: &ContentNode) -> Vec<BlockRef<'_>> {
    let mut blocks = Vec::new();
    visit(root, &mut blocks);

    #[cfg(debug_assertions)]
    {
        let mut seen = rustc_hash::FxHashSet::default();
        debug_assert!(
            blocks.iter().all(|b| seen.insert(b.node.id)),
            "block collected twice"
        );
    }

    blocks
}

fn visit<'a>(parent: &'a ContentNode, blocks: &mut Vec<BlockRef<'a>>) {
    for child in &parent.children {
        if child.kind.is_block() {
            blocks.push(BlockRef {
                node: child,
                parent: parent.id,
            });
        } else if child.kind.is_container() {
            visit(child, blocks);
        }
    }
}
