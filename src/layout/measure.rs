//! Headless tree measurement
//!
//! Non-browser embeddings (and this crate's own tests and benches) have no
//! host renderer to measure fragment rectangles. This pass simulates text
//! layout from font metrics: grapheme-cluster widths, Unicode line-break
//! opportunities, greedy wrapping with an emergency mid-word break. It fills
//! each run's fragment rects and each block's bounds exactly the way a real
//! renderer would, so the rest of the pipeline cannot tell the difference.

use crate::content::{ContentNode, NodeKind};
use crate::geometry::units::pt_to_px;
use crate::geometry::{PageGeometry, Typography};
use crate::layout::font::FontMetrics;
use crate::Rect;
use unicode_linebreak::{linebreaks, BreakOpportunity};
use unicode_segmentation::UnicodeSegmentation;

/// Measure every block under `root`, filling run fragments and node bounds.
///
/// Content flows top-down from y = 0 at the container top, wrapped to the
/// page geometry's content width. Image blocks keep their host-assigned
/// height; containers take the union of their children.
pub fn measure_tree(
    root: &mut ContentNode,
    metrics: &FontMetrics,
    geometry: &PageGeometry,
    typography: &Typography,
) {
    let content_width = geometry.content_width();
    let spacing_px = pt_to_px(typography.paragraph_spacing_pt);
    let mut y = 0.0_f32;

    measure_children(root, metrics, content_width, spacing_px, &mut y);
    root.bounds = Rect::new(0.0, 0.0, content_width, y);
}

fn measure_children(
    parent: &mut ContentNode,
    metrics: &FontMetrics,
    content_width: f32,
    spacing_px: f32,
    y: &mut f32,
) {
    for child in &mut parent.children {
        if child.kind.is_block() {
            measure_block(child, metrics, content_width, spacing_px, y);
        } else if child.kind.is_container() {
            let top = *y;
            measure_children(child, metrics, content_width, spacing_px, y);
            child.bounds = Rect::new(0.0, top, content_width, *y - top);
        }
    }
}

fn measure_block(
    block: &mut ContentNode,
    metrics: &FontMetrics,
    content_width: f32,
    spacing_px: f32,
    y: &mut f32,
) {
    if block.kind == NodeKind::Image {
        // Height is host-supplied; only the position flows
        block.bounds = Rect::new(0.0, *y, block.bounds.width, block.bounds.height);
        *y += block.bounds.height + spacing_px;
        return;
    }

    let text: String = block.runs.iter().map(|r| r.text.as_str()).collect();
    let line_height = metrics.line_height;

    if text.is_empty() {
        // Empty paragraph still occupies one line
        block.bounds = Rect::new(0.0, *y, content_width, line_height);
        for run in &mut block.runs {
            run.fragments.clear();
        }
        *y += line_height + spacing_px;
        return;
    }

    let wrap = wrap_text(&text, metrics, content_width);

    // Distribute line slices back onto the runs as fragment rects
    let mut run_start = 0usize;
    for run in &mut block.runs {
        let run_end = run_start + run.text.len();
        run.fragments.clear();

        for (line_idx, &(line_start, line_end)) in wrap.lines.iter().enumerate() {
            let start = run_start.max(line_start);
            let end = run_end.min(line_end);
            if start >= end {
                continue;
            }
            let x = wrap.x_at(start) - wrap.x_at(line_start);
            let width = wrap.x_at(end) - wrap.x_at(start);
            run.fragments.push(Rect::new(
                x,
                *y + line_idx as f32 * line_height,
                width,
                line_height,
            ));
        }
        run_start = run_end;
    }

    let height = wrap.lines.len().max(1) as f32 * line_height;
    block.bounds = Rect::new(0.0, *y, content_width, height);
    *y += height + spacing_px;
}

/// Wrapped line ranges plus cumulative x positions per byte offset
struct WrappedText {
    /// Byte ranges of each visual line (newlines excluded)
    lines: Vec<(usize, usize)>,
    /// Grapheme boundaries: (byte offset, cumulative width before it)
    advances: Vec<(usize, f32)>,
    total_width: f32,
}

impl WrappedText {
    /// Cumulative width from the start of the text up to `byte`
    fn x_at(&self, byte: usize) -> f32 {
        match self.advances.binary_search_by(|probe| probe.0.cmp(&byte)) {
            Ok(idx) => self.advances[idx].1,
            // Mid-cluster offsets snap to the preceding boundary
            Err(0) => 0.0,
            Err(idx) if idx >= self.advances.len() => self.total_width,
            Err(idx) => self.advances[idx - 1].1,
        }
    }
}

fn wrap_text(text: &str, metrics: &FontMetrics, max_width: f32) -> WrappedText {
    // Break opportunities from the Unicode algorithm; mandatory breaks are
    // handled below via the newline grapheme itself.
    let break_points: Vec<usize> = linebreaks(text)
        .filter(|&(_, op)| op == BreakOpportunity::Allowed)
        .map(|(idx, _)| idx)
        .collect();

    let mut advances: Vec<(usize, f32)> = Vec::new();
    let mut lines: Vec<(usize, usize)> = Vec::new();
    let mut cumulative = 0.0_f32;
    let mut line_start = 0usize;
    let mut line_start_x = 0.0_f32;
    let mut last_break: Option<usize> = None;
    let mut break_cursor = 0usize;

    for (byte_idx, grapheme) in text.grapheme_indices(true) {
        advances.push((byte_idx, cumulative));

        while break_cursor < break_points.len() && break_points[break_cursor] <= byte_idx {
            if break_points[break_cursor] > line_start {
                last_break = Some(break_points[break_cursor]);
            }
            break_cursor += 1;
        }

        if grapheme == "\n" || grapheme == "\r\n" {
            lines.push((line_start, byte_idx));
            line_start = byte_idx + grapheme.len();
            line_start_x = cumulative;
            last_break = None;
            continue;
        }

        let is_whitespace = grapheme.chars().all(|c| c.is_whitespace());
        let width = if grapheme == "\t" {
            metrics.default_width * 4.0
        } else if grapheme.chars().all(|c| c.is_control()) {
            0.0
        } else {
            grapheme.chars().map(|c| metrics.width(c)).sum()
        };

        // Trailing whitespace may overflow the column; it never forces a wrap
        if !is_whitespace && cumulative + width - line_start_x > max_width && byte_idx > line_start {
            // Soft wrap: prefer the last break opportunity, else break
            // mid-word before this cluster
            let break_at = last_break.unwrap_or(byte_idx);
            lines.push((line_start, break_at));
            line_start = break_at;
            line_start_x = x_of(&advances, break_at, cumulative);
            last_break = None;
        }

        cumulative += width;
    }

    if line_start <= text.len() {
        lines.push((line_start, text.len()));
    }

    WrappedText {
        lines,
        advances,
        total_width: cumulative,
    }
}

fn x_of(advances: &[(usize, f32)], byte: usize, fallback: f32) -> f32 {
    advances
        .iter()
        .rev()
        .find(|&&(b, _)| b <= byte)
        .map(|&(b, x)| if b == byte { x } else { fallback })
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{NodeId, TextRun};
    use crate::layout::lines_in;

    fn fixed_metrics() -> FontMetrics {
        // 8px per char, 16px lines: easy arithmetic
        FontMetrics::new(16.0, vec![8.0; 128], 8.0)
    }

    fn geometry_with_content_width(width: f32) -> PageGeometry {
        let mut geom = PageGeometry::default();
        geom.page_width = width;
        geom.margin_left = 0.0;
        geom.margin_right = 0.0;
        geom
    }

    fn measured_para(text: &str, width: f32) -> ContentNode {
        let mut root = ContentNode::root()
            .with_child(ContentNode::new(NodeId(1), NodeKind::Paragraph).with_run(TextRun::new(text)));
        measure_tree(
            &mut root,
            &fixed_metrics(),
            &geometry_with_content_width(width),
            &Typography::default(),
        );
        root.children.remove(0)
    }

    #[test]
    fn test_short_text_single_fragment() {
        let para = measured_para("Hello", 100.0);
        assert_eq!(para.runs[0].fragments.len(), 1);
        let frag = para.runs[0].fragments[0];
        assert_eq!(frag.y, 0.0);
        assert_eq!(frag.width, 40.0);
        assert_eq!(frag.height, 16.0);
    }

    #[test]
    fn test_wrap_at_break_opportunity() {
        // 40px = 5 chars per line; "Hello World" wraps after the space
        let para = measured_para("Hello World", 40.0);
        assert_eq!(para.runs[0].fragments.len(), 2);
        assert_eq!(para.runs[0].fragments[1].y, 16.0);
        assert_eq!(para.bounds.height, 32.0);
    }

    #[test]
    fn test_emergency_break_without_opportunity() {
        let para = measured_para("abcdefghij", 40.0);
        // 10 chars at 8px in a 40px column: two lines of five
        assert_eq!(para.runs[0].fragments.len(), 2);
    }

    #[test]
    fn test_explicit_newline_breaks() {
        let para = measured_para("ab\ncd", 400.0);
        assert_eq!(para.runs[0].fragments.len(), 2);
        assert_eq!(para.runs[0].fragments[0].width, 16.0);
    }

    #[test]
    fn test_fragments_feed_line_extractor() {
        let para = measured_para("Hello World again", 48.0);
        let lines = lines_in(&para, 0.0);
        assert_eq!(lines.len(), para.runs[0].fragments.len());
        assert!(lines.windows(2).all(|w| w[1].top >= w[0].bottom - 3.0));
    }

    #[test]
    fn test_two_runs_share_a_line() {
        let mut root = ContentNode::root().with_child(
            ContentNode::new(NodeId(1), NodeKind::Paragraph)
                .with_run(TextRun::new("ab"))
                .with_run(TextRun::new("cd")),
        );
        measure_tree(
            &mut root,
            &fixed_metrics(),
            &geometry_with_content_width(400.0),
            &Typography::default(),
        );
        let para = &root.children[0];

        assert_eq!(para.runs[0].fragments.len(), 1);
        assert_eq!(para.runs[1].fragments.len(), 1);
        // Second run continues on the same line after the first
        assert_eq!(para.runs[1].fragments[0].x, 16.0);
        assert_eq!(para.runs[1].fragments[0].y, 0.0);

        // And the extractor merges them into one visual line
        assert_eq!(lines_in(para, 0.0).len(), 1);
    }

    #[test]
    fn test_empty_paragraph_occupies_one_line() {
        let para = measured_para("", 100.0);
        assert!(para.runs[0].fragments.is_empty());
        assert_eq!(para.bounds.height, 16.0);
        assert_eq!(lines_in(&para, 0.0).len(), 1);
    }

    #[test]
    fn test_blocks_stack_with_paragraph_spacing() {
        let mut root = ContentNode::root()
            .with_child(ContentNode::new(NodeId(1), NodeKind::Paragraph).with_run(TextRun::new("a")))
            .with_child(ContentNode::new(NodeId(2), NodeKind::Paragraph).with_run(TextRun::new("b")));
        let typo = Typography::default(); // 3pt spacing = 4px
        measure_tree(
            &mut root,
            &fixed_metrics(),
            &geometry_with_content_width(100.0),
            &typo,
        );

        assert_eq!(root.children[0].bounds.y, 0.0);
        assert_eq!(root.children[1].bounds.y, 20.0); // 16px line + 4px spacing
        assert_eq!(root.bounds.height, 40.0);
    }

    #[test]
    fn test_image_block_keeps_host_height() {
        let mut image = ContentNode::new(NodeId(1), NodeKind::Image);
        image.bounds = Rect::new(0.0, 0.0, 200.0, 150.0);
        let mut root = ContentNode::root().with_child(image);
        measure_tree(
            &mut root,
            &fixed_metrics(),
            &geometry_with_content_width(400.0),
            &Typography::default(),
        );

        assert_eq!(root.children[0].bounds.height, 150.0);
    }
}
