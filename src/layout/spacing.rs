//! Contextual spacing normalization
//!
//! Word-processor semantics: adjacent paragraphs of the same style with
//! "contextual spacing" enabled suppress the spacing between them. This pass
//! runs on the collected block list (not the page descriptors) on the same
//! recomputation trigger as page breaking, and emits margin assignments for
//! the host to apply. Assignments are derived from authored style alone, so
//! running the pass twice yields identical output.

use crate::content::{BlockRef, NodeId};
use crate::geometry::units::twips_to_pt;
use rustc_hash::FxHashMap;

/// Margin assignment for one block, in points.
///
/// Emitted for every contextual-spacing-enabled block: either the authored
/// values (restoring margins a previous pass zeroed before an edit changed
/// the adjacency) or zeroed adjoining edges.
#[derive(Debug, Clone, PartialEq)]
pub struct SpacingAdjustment {
    pub node: NodeId,
    pub margin_top_pt: f32,
    pub margin_bottom_pt: f32,
}

/// Compute margin assignments for contextual-spacing blocks.
///
/// For each flagged block with a style identifier whose immediate next
/// sibling shares the parent, the style identifier and the flag, the
/// adjoining margins (bottom of the first, top of the second) are zeroed to
/// visually merge the pair. All other flagged blocks get their authored
/// spacing back.
pub fn normalize_contextual_spacing(blocks: &[BlockRef<'_>]) -> Vec<SpacingAdjustment> {
    let mut adjustments: Vec<SpacingAdjustment> = Vec::new();
    let mut index: FxHashMap<NodeId, usize> = FxHashMap::default();

    // Restoration baseline: every flagged block starts from authored spacing
    for block in blocks {
        if !block.node.style.contextual_spacing {
            continue;
        }
        index.insert(block.node.id, adjustments.len());
        adjustments.push(SpacingAdjustment {
            node: block.node.id,
            margin_top_pt: twips_to_pt(block.node.style.spacing_before),
            margin_bottom_pt: twips_to_pt(block.node.style.spacing_after),
        });
    }

    // Zero adjoining edges of same-style sibling pairs
    for pair in blocks.windows(2) {
        let (current, next) = (&pair[0], &pair[1]);
        if current.parent != next.parent {
            continue;
        }
        let (cur_style, next_style) = (&current.node.style, &next.node.style);
        if !cur_style.contextual_spacing || !next_style.contextual_spacing {
            continue;
        }
        match (&cur_style.style_id, &next_style.style_id) {
            (Some(a), Some(b)) if a == b => {
                if let Some(&i) = index.get(&current.node.id) {
                    adjustments[i].margin_bottom_pt = 0.0;
                }
                if let Some(&i) = index.get(&next.node.id) {
                    adjustments[i].margin_top_pt = 0.0;
                }
            }
            _ => {}
        }
    }

    adjustments
}
