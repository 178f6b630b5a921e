//! Visual line geometry extraction
//!
//! Page breaking needs the rendered positions of visual lines, which only the
//! host's text renderer knows: a wrapped line is a rendering-time fact that
//! cannot be derived from the content model. The extractor therefore works
//! backwards from measured fragment rectangles, merging fragments that share a
//! visual line.

use crate::content::ContentNode;

/// Tolerance in pixels when deciding whether a fragment continues the current
/// visual line. Absorbs sub-pixel rounding and mixed baselines.
pub const LINE_MERGE_TOLERANCE: f32 = 3.0;

/// One visual line's vertical extent, relative to the content container's top
/// edge. Ephemeral: recomputed on every layout pass, never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineRect {
    pub top: f32,
    pub bottom: f32,
}

impl LineRect {
    pub fn new(top: f32, bottom: f32) -> Self {
        Self { top, bottom }
    }

    /// A line whose geometry cannot be resolved to a content offset is
    /// dropped from the break calculation rather than failing the pass.
    pub fn is_resolvable(&self) -> bool {
        self.top.is_finite() && self.bottom.is_finite() && self.bottom >= self.top
    }
}

/// Capability for obtaining a block's visual lines.
///
/// The default implementation reads measured fragment rectangles; a
/// non-browser embedding can inject whatever its text-shaping engine provides.
pub trait LineMeasurer {
    /// Ordered visual lines of `block`, relative to `container_top`.
    fn measure_lines(&self, block: &ContentNode, container_top: f32) -> Vec<LineRect>;
}

/// Line extraction from rendered fragment rectangles
#[derive(Debug, Clone, Copy, Default)]
pub struct FragmentMeasurer;

impl LineMeasurer for FragmentMeasurer {
    fn measure_lines(&self, block: &ContentNode, container_top: f32) -> Vec<LineRect> {
        lines_in(block, container_top)
    }
}

/// Extract the ordered visual lines inside `block`.
///
/// Iterates non-empty runs in document order; each fragment either extends the
/// accumulated line or starts a new one. A fragment whose top clears the
/// current line's bottom (minus [`LINE_MERGE_TOLERANCE`]) starts a new line.
/// Blocks without text runs fall back to a single line spanning the block's
/// own bounds.
pub fn lines_in(block: &ContentNode, container_top: f32) -> Vec<LineRect> {
    let mut lines: Vec<LineRect> = Vec::new();

    for run in &block.runs {
        if run.text.is_empty() {
            continue;
        }
        for frag in &run.fragments {
            let top = frag.y - container_top;
            let bottom = top + frag.height;
            let candidate = LineRect::new(top, bottom);
            if !candidate.is_resolvable() {
                log::debug!("dropping unresolvable fragment in block {:?}", block.id);
                continue;
            }

            match lines.last_mut() {
                Some(last) if top < last.bottom - LINE_MERGE_TOLERANCE => {
                    // Same visual line: another run's slice, or a sub-pixel
                    // offset fragment. Extend the accumulated extent.
                    last.top = last.top.min(top);
                    last.bottom = last.bottom.max(bottom);
                }
                _ => lines.push(candidate),
            }
        }
    }

    if lines.is_empty() {
        // Image-only or otherwise run-less block: its own bounds are the line
        let fallback = LineRect::new(
            block.bounds.y - container_top,
            block.bounds.y - container_top + block.bounds.height,
        );
        if fallback.is_resolvable() {
            lines.push(fallback);
        } else {
            log::debug!("block {:?} has no measurable geometry", block.id);
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentNode, NodeId, NodeKind, TextRun};
    use crate::Rect;

    fn block_with_fragments(frags: &[(f32, f32)]) -> ContentNode {
        let mut run = TextRun::new("text");
        for &(y, h) in frags {
            run.fragments.push(Rect::new(0.0, y, 100.0, h));
        }
        ContentNode::new(NodeId(1), NodeKind::Paragraph).with_run(run)
    }

    #[test]
    fn test_one_fragment_per_line() {
        let block = block_with_fragments(&[(0.0, 16.0), (16.0, 16.0), (32.0, 16.0)]);
        let lines = lines_in(&block, 0.0);

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], LineRect::new(0.0, 16.0));
        assert_eq!(lines[2], LineRect::new(32.0, 48.0));
    }

    #[test]
    fn test_fragments_on_same_line_merge() {
        // Two runs sharing a visual line: second fragment starts above the
        // first's bottom, well within tolerance.
        let mut block = block_with_fragments(&[(100.0, 16.0)]);
        let mut second = TextRun::new("bold");
        second.fragments.push(Rect::new(50.0, 101.0, 40.0, 18.0));
        block.runs.push(second);

        let lines = lines_in(&block, 0.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].top, 100.0);
        assert_eq!(lines[0].bottom, 119.0);
    }

    #[test]
    fn test_tolerance_absorbs_subpixel_overlap() {
        // Next line's top 2px above previous bottom still starts a new line
        let block = block_with_fragments(&[(0.0, 16.0), (14.0, 16.0)]);
        let lines = lines_in(&block, 0.0);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_container_top_offset() {
        let block = block_with_fragments(&[(250.0, 20.0)]);
        let lines = lines_in(&block, 200.0);
        assert_eq!(lines[0], LineRect::new(50.0, 70.0));
    }

    #[test]
    fn test_runless_block_falls_back_to_bounds() {
        let mut block = ContentNode::new(NodeId(2), NodeKind::Image);
        block.bounds = Rect::new(0.0, 300.0, 200.0, 150.0);

        let lines = lines_in(&block, 0.0);
        assert_eq!(lines, vec![LineRect::new(300.0, 450.0)]);
    }

    #[test]
    fn test_empty_runs_skipped() {
        let mut block = ContentNode::new(NodeId(3), NodeKind::Paragraph);
        let mut empty = TextRun::new("");
        empty.fragments.push(Rect::new(0.0, 0.0, 0.0, 16.0));
        block.runs.push(empty);
        block.bounds = Rect::new(0.0, 10.0, 100.0, 16.0);

        // Empty run contributes nothing; bounds fallback applies
        let lines = lines_in(&block, 0.0);
        assert_eq!(lines, vec![LineRect::new(10.0, 26.0)]);
    }

    #[test]
    fn test_non_finite_fragment_dropped() {
        let block = block_with_fragments(&[(0.0, 16.0), (f32::NAN, 16.0), (16.0, 16.0)]);
        let lines = lines_in(&block, 0.0);
        assert_eq!(lines.len(), 2);
    }
}
