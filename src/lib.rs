//! Page-Flow: paginated presentation for a continuously-editable document
//!
//! This crate is the pagination engine behind a word-processor style editing
//! surface: one continuous editable content stream, presented as discrete
//! fixed-size pages that match an exported document format's page size,
//! margins and line metrics. It decides, from measured line geometry alone,
//! where every page boundary falls:
//! - Page geometry derived from twips-based document attributes
//! - Line-accurate greedy page breaking over measured visual lines
//! - Contextual spacing normalization between same-style paragraphs
//! - A page surface of one live frame plus inert snapshot duplicates
//! - Debounced, retry-aware recalculation scheduling

pub mod content;
pub mod geometry;
pub mod layout;
pub mod render;
pub mod schedule;
pub mod wasm;

// Re-export WASM types for direct use
pub use wasm::WasmPaginator;

// Re-export primary types
pub use content::{collect_blocks, BlockRef, BlockStyle, ContentNode, NodeId, NodeKind, TextRun};
pub use geometry::{resolve_typography, DocumentAttributes, PageGeometry, Typography};
pub use layout::{
    break_pages, measure_tree, normalize_contextual_spacing, FontMetrics, FragmentMeasurer,
    LayoutError, LayoutStats, LineMeasurer, LineRect, PageDescriptor, SpacingAdjustment,
};
pub use render::{ContentSnapshot, PageFrame, PageSurface};
pub use schedule::{RecalcScheduler, Trigger};

/// Surface coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Surface rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }
}

/// Callback receiving layout statistics after each successful pass
pub type StatsCallback = Box<dyn FnMut(LayoutStats)>;

/// Engine configuration supplied by the embedder
#[derive(Debug, Clone, Copy)]
pub struct PaginatorOptions {
    /// When false the surface renders as one continuous unclipped frame and
    /// the page breaker is bypassed entirely
    pub paginated: bool,
    /// Measured surface heights below this are treated as "not yet rendered"
    pub min_rendered_height: f32,
}

impl Default for PaginatorOptions {
    fn default() -> Self {
        Self {
            paginated: true,
            min_rendered_height: 16.0,
        }
    }
}

/// The pagination engine: a read-only observer over the host's content tree.
///
/// Owns the derived page geometry, the page-descriptor list, the spacing
/// adjustments and the rendered surface description; never mutates the
/// content or its attributes. All outputs are replaced wholesale on each
/// successful pass.
pub struct Paginator {
    attrs: DocumentAttributes,
    geometry: PageGeometry,
    typography: Typography,
    options: PaginatorOptions,
    scheduler: RecalcScheduler,
    measurer: Box<dyn LineMeasurer>,
    pages: Vec<PageDescriptor>,
    surface: PageSurface,
    spacing: Vec<SpacingAdjustment>,
    stats: LayoutStats,
    /// Successful passes so far; stamps the bridge protocol
    pass: u64,
    on_stats: Option<StatsCallback>,
}

impl Paginator {
    /// Create an engine for the given document attributes
    pub fn new(attrs: DocumentAttributes, options: PaginatorOptions) -> Self {
        let geometry = PageGeometry::from_attributes(&attrs);
        let surface = if options.paginated {
            PageSurface::default()
        } else {
            PageSurface::continuous(&geometry)
        };
        Self {
            attrs,
            geometry,
            typography: resolve_typography(&attrs),
            options,
            scheduler: RecalcScheduler::new(),
            measurer: Box::new(FragmentMeasurer),
            pages: Vec::new(),
            surface,
            spacing: Vec::new(),
            stats: LayoutStats::default(),
            pass: 0,
            on_stats: None,
        }
    }

    /// Replace the line-measurement capability (non-browser embeddings
    /// inject their platform's text-shaping engine here)
    pub fn with_measurer(mut self, measurer: Box<dyn LineMeasurer>) -> Self {
        self.measurer = measurer;
        self
    }

    /// Install the statistics callback invoked once per successful pass
    pub fn set_stats_callback(&mut self, callback: StatsCallback) {
        self.on_stats = Some(callback);
    }

    /// The document-attributes owner changed the record
    pub fn set_attributes(&mut self, attrs: DocumentAttributes, now_ms: f64) {
        self.attrs = attrs;
        self.geometry = PageGeometry::from_attributes(&attrs);
        self.typography = resolve_typography(&attrs);
        self.scheduler.note(Trigger::AttributesChanged, now_ms);
    }

    /// Toggle paginated presentation
    pub fn set_paginated(&mut self, paginated: bool, now_ms: f64) {
        if self.options.paginated != paginated {
            self.options.paginated = paginated;
            self.scheduler.note(Trigger::AttributesChanged, now_ms);
        }
    }

    /// The editable surface was mounted
    pub fn notify_mounted(&mut self, now_ms: f64) {
        self.scheduler.note(Trigger::Mounted, now_ms);
    }

    /// Content under the editable surface mutated
    pub fn notify_mutation(&mut self, now_ms: f64) {
        self.scheduler.note(Trigger::Mutation, now_ms);
    }

    /// The container was resized
    pub fn notify_resize(&mut self, now_ms: f64) {
        self.scheduler.note(Trigger::Resize, now_ms);
    }

    /// Run a recomputation pass if one is due.
    ///
    /// `root` is the host's measured content tree; `now_ms` its monotonic
    /// clock. Returns fresh statistics on a successful pass. A deferred pass
    /// (content not yet rendered) keeps the previous output visible and is
    /// retried by the scheduler.
    pub fn tick(&mut self, root: &ContentNode, now_ms: f64) -> Option<LayoutStats> {
        if !self.scheduler.begin_if_due(now_ms) {
            return None;
        }
        match self.recompute(root) {
            Ok(stats) => {
                self.scheduler.finish_success();
                if let Some(callback) = &mut self.on_stats {
                    callback(stats);
                }
                Some(stats)
            }
            Err(err) => {
                log::debug!("recomputation deferred: {err}");
                self.scheduler.finish_deferred(now_ms);
                None
            }
        }
    }

    fn recompute(&mut self, root: &ContentNode) -> Result<LayoutStats, LayoutError> {
        if self.options.paginated {
            let height = root.height();
            if height < self.options.min_rendered_height {
                return Err(LayoutError::NotRendered {
                    height,
                    min: self.options.min_rendered_height,
                });
            }
        }

        let blocks = collect_blocks(root);
        if self.options.paginated && blocks.is_empty() {
            return Err(LayoutError::NoBlocks);
        }

        let container_top = root.bounds.y;
        let mut lines: Vec<LineRect> = Vec::new();
        for block in &blocks {
            lines.extend(self.measurer.measure_lines(block.node, container_top));
        }

        let (pages, surface, line_count) = if self.options.paginated {
            let pagination = break_pages(&lines, self.geometry.content_height());
            // Inert duplicates only exist past page 1
            let snapshot =
                (pagination.pages.len() > 1).then(|| ContentSnapshot::capture(root));
            let surface = PageSurface::paginated(&self.geometry, &pagination.pages, snapshot);
            (pagination.pages, surface, pagination.line_count)
        } else {
            let descriptor = PageDescriptor {
                page_number: 1,
                content_offset: 0.0,
                visible_height: root.height(),
            };
            let line_count = lines.iter().filter(|l| l.is_resolvable()).count();
            (
                vec![descriptor],
                PageSurface::continuous(&self.geometry),
                line_count,
            )
        };

        // Whole-value swaps: readers never observe a partially updated set
        self.spacing = normalize_contextual_spacing(&blocks);
        self.pages = pages;
        self.surface = surface;
        self.pass += 1;
        self.stats = LayoutStats {
            page_count: self.pages.len(),
            visual_line_count: line_count,
        };
        Ok(self.stats)
    }

    /// Current page descriptors (previous pass's until a new one succeeds)
    pub fn pages(&self) -> &[PageDescriptor] {
        &self.pages
    }

    /// Current rendered surface description
    pub fn surface(&self) -> &PageSurface {
        &self.surface
    }

    /// Margin assignments from the contextual-spacing pass
    pub fn spacing_adjustments(&self) -> &[SpacingAdjustment] {
        &self.spacing
    }

    /// Latest layout statistics
    pub fn stats(&self) -> LayoutStats {
        self.stats
    }

    pub fn attributes(&self) -> &DocumentAttributes {
        &self.attrs
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn typography(&self) -> &Typography {
        &self.typography
    }

    pub fn is_paginated(&self) -> bool {
        self.options.paginated
    }

    /// Number of successful passes
    pub fn pass(&self) -> u64 {
        self.pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::font::FontMetrics;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn paragraph(id: u64, text: &str) -> ContentNode {
        ContentNode::new(NodeId(id), NodeKind::Paragraph).with_run(TextRun::new(text))
    }

    /// A measured tree with `count` paragraphs of `text`
    fn measured_tree(paginator: &Paginator, count: usize, text: &str) -> ContentNode {
        let mut root = ContentNode::root();
        for i in 0..count {
            root.children.push(paragraph(i as u64 + 1, text));
        }
        let metrics = FontMetrics::from_typography(paginator.typography());
        measure_tree(
            &mut root,
            &metrics,
            paginator.geometry(),
            paginator.typography(),
        );
        root
    }

    #[test]
    fn test_short_document_single_page() {
        let mut paginator = Paginator::new(DocumentAttributes::default(), PaginatorOptions::default());
        let root = measured_tree(&paginator, 3, "Hello, World!");

        paginator.notify_mounted(0.0);
        let stats = paginator.tick(&root, 100.0).expect("pass should run");

        assert_eq!(stats.page_count, 1);
        assert_eq!(stats.visual_line_count, 3);
        assert_eq!(paginator.pages()[0].content_offset, 0.0);
        assert!(paginator.surface().snapshot.is_none());
    }

    #[test]
    fn test_long_document_breaks_into_pages() {
        let mut paginator = Paginator::new(DocumentAttributes::default(), PaginatorOptions::default());
        let root = measured_tree(&paginator, 80, "A paragraph of filler text.");

        paginator.notify_mutation(0.0);
        let stats = paginator.tick(&root, 16.0).expect("pass should run");

        assert!(stats.page_count > 1);
        assert_eq!(stats.page_count, paginator.pages().len());
        assert_eq!(paginator.surface().frames.len(), stats.page_count);
        assert!(paginator.surface().snapshot.is_some());
        assert!(paginator
            .pages()
            .windows(2)
            .all(|w| w[1].content_offset > w[0].content_offset));
    }

    #[test]
    fn test_stats_callback_on_success_only() {
        let mut paginator = Paginator::new(DocumentAttributes::default(), PaginatorOptions::default());
        let seen: Rc<RefCell<Vec<LayoutStats>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        paginator.set_stats_callback(Box::new(move |stats| sink.borrow_mut().push(stats)));

        // Not yet rendered: zero-height root defers, no callback
        let unrendered = ContentNode::root();
        paginator.notify_mounted(0.0);
        assert!(paginator.tick(&unrendered, 100.0).is_none());
        assert!(seen.borrow().is_empty());

        // Rendered content succeeds on the retry
        let root = measured_tree(&paginator, 2, "text");
        let stats = paginator.tick(&root, 300.0).expect("retry should run");
        assert_eq!(seen.borrow().as_slice(), &[stats]);
    }

    #[test]
    fn test_stale_pages_survive_deferred_pass() {
        let mut paginator = Paginator::new(DocumentAttributes::default(), PaginatorOptions::default());
        let root = measured_tree(&paginator, 80, "A paragraph of filler text.");

        paginator.notify_mounted(0.0);
        paginator.tick(&root, 100.0).expect("pass should run");
        let pages_before = paginator.pages().to_vec();

        // The surface collapses (e.g. fonts reloading): pass defers, output stays
        paginator.notify_mutation(200.0);
        assert!(paginator.tick(&ContentNode::root(), 216.0).is_none());
        assert_eq!(paginator.pages(), pages_before.as_slice());
    }

    #[test]
    fn test_disabled_pagination_single_unclipped_descriptor() {
        let mut paginator = Paginator::new(
            DocumentAttributes::default(),
            PaginatorOptions {
                paginated: false,
                ..PaginatorOptions::default()
            },
        );
        let root = measured_tree(&paginator, 200, "Plenty of content on a long page.");

        paginator.notify_mounted(0.0);
        let stats = paginator.tick(&root, 100.0).expect("pass should run");

        assert_eq!(stats.page_count, 1);
        assert_eq!(paginator.pages().len(), 1);
        assert_eq!(paginator.pages()[0].content_offset, 0.0);
        assert_eq!(paginator.surface().frames.len(), 1);
        assert_eq!(paginator.surface().frames[0].clip_height, None);
        assert_eq!(paginator.surface().frames[0].height, None);
    }

    #[test]
    fn test_attribute_change_rederives_geometry() {
        let mut paginator = Paginator::new(DocumentAttributes::default(), PaginatorOptions::default());
        assert_eq!(paginator.geometry().page_width, 816.0);

        let attrs = DocumentAttributes {
            page_width: 11906.0,
            page_height: 16838.0,
            ..DocumentAttributes::default()
        };
        paginator.set_attributes(attrs, 0.0);

        assert!((paginator.geometry().page_width - 793.73).abs() < 0.01);
        let root = measured_tree(&paginator, 1, "x");
        assert!(paginator.tick(&root, 0.0).is_some());
    }

    #[test]
    fn test_no_pass_without_trigger() {
        let mut paginator = Paginator::new(DocumentAttributes::default(), PaginatorOptions::default());
        let root = measured_tree(&paginator, 1, "x");
        assert!(paginator.tick(&root, 1000.0).is_none());
        assert_eq!(paginator.pass(), 0);
    }
}
