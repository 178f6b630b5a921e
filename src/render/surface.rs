//! Page frame stack built from page descriptors
//!
//! Page 1 hosts the live editable surface, clipped to its visible height when
//! shorter than the content area. Pages 2..N are inert duplicates of the
//! frozen snapshot, shifted upward by their content offset so the right slice
//! shows at the top of the frame. With pagination disabled the stack is a
//! single unclipped auto-height frame.

use crate::geometry::PageGeometry;
use crate::layout::PageDescriptor;
use crate::render::ContentSnapshot;

/// One rendered page frame
#[derive(Debug, Clone, PartialEq)]
pub struct PageFrame {
    /// 1-based page number, also the footer label
    pub page_number: u32,
    /// Vertical position of the frame in the page stack
    pub origin_y: f32,
    pub width: f32,
    /// Frame height; `None` renders auto-height (unpaginated mode)
    pub height: Option<f32>,
    /// Upward shift applied to the content so this page's slice shows
    pub content_offset: f32,
    /// Vertical inset clip; `None` renders unclipped
    pub clip_height: Option<f32>,
    /// Page 1 hosts the editable surface; inert frames take no pointer input
    pub live: bool,
    /// Page-number footer text (presentation only)
    pub footer: Option<String>,
    /// Decorative corner marks (presentation only)
    pub corner_marks: bool,
}

/// The full visual stack for one recomputation pass.
///
/// Replaced wholesale on every successful pass so readers never observe a
/// partially updated page set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageSurface {
    pub frames: Vec<PageFrame>,
    /// Frozen markup rendered by the inert frames; `None` when every frame is
    /// live (single page, or pagination disabled)
    pub snapshot: Option<ContentSnapshot>,
}

impl PageSurface {
    /// Build the paginated stack from page descriptors.
    pub fn paginated(
        geometry: &PageGeometry,
        pages: &[PageDescriptor],
        snapshot: Option<ContentSnapshot>,
    ) -> Self {
        let content_height = geometry.content_height();
        let frames = pages
            .iter()
            .map(|page| {
                let index = page.page_number.saturating_sub(1) as f32;
                let live = page.page_number == 1;
                // The live page renders unclipped while it fills the whole
                // content area; inert pages always clip to their window.
                let clip_height = if live && page.visible_height >= content_height {
                    None
                } else {
                    Some(page.visible_height)
                };
                PageFrame {
                    page_number: page.page_number,
                    origin_y: index * (geometry.page_height + geometry.page_gap),
                    width: geometry.page_width,
                    height: Some(geometry.page_height),
                    content_offset: page.content_offset,
                    clip_height,
                    live,
                    footer: Some(page.page_number.to_string()),
                    corner_marks: true,
                }
            })
            .collect();

        Self { frames, snapshot }
    }

    /// Build the single-frame continuous stack (pagination disabled).
    pub fn continuous(geometry: &PageGeometry) -> Self {
        Self {
            frames: vec![PageFrame {
                page_number: 1,
                origin_y: 0.0,
                width: geometry.page_width,
                height: None,
                content_offset: 0.0,
                clip_height: None,
                live: true,
                footer: None,
                corner_marks: false,
            }],
            snapshot: None,
        }
    }

    /// Total pixel height of the rendered stack, if it is fixed-height
    pub fn stack_height(&self) -> Option<f32> {
        self.frames
            .iter()
            .map(|f| f.height.map(|h| f.origin_y + h))
            .try_fold(0.0_f32, |acc, bottom| bottom.map(|b| acc.max(b)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(n: u32, offset: f32, visible: f32) -> PageDescriptor {
        PageDescriptor {
            page_number: n,
            content_offset: offset,
            visible_height: visible,
        }
    }

    #[test]
    fn test_single_full_page_unclipped() {
        let geom = PageGeometry::default();
        let surface =
            PageSurface::paginated(&geom, &[descriptor(1, 0.0, geom.content_height())], None);

        assert_eq!(surface.frames.len(), 1);
        let frame = &surface.frames[0];
        assert!(frame.live);
        assert_eq!(frame.clip_height, None);
        assert_eq!(frame.origin_y, 0.0);
        assert_eq!(frame.footer.as_deref(), Some("1"));
        assert!(frame.corner_marks);
    }

    #[test]
    fn test_live_page_clips_when_short() {
        let geom = PageGeometry::default();
        let pages = [
            descriptor(1, 0.0, 800.0),
            descriptor(2, 800.0, geom.content_height()),
        ];
        let surface = PageSurface::paginated(&geom, &pages, Some(ContentSnapshot::default()));

        assert_eq!(surface.frames[0].clip_height, Some(800.0));
        assert!(surface.frames[0].live);
        assert!(!surface.frames[1].live);
        assert_eq!(surface.frames[1].content_offset, 800.0);
        assert_eq!(surface.frames[1].clip_height, Some(geom.content_height()));
    }

    #[test]
    fn test_frames_stack_with_gap() {
        let geom = PageGeometry::default();
        let pages = [
            descriptor(1, 0.0, 864.0),
            descriptor(2, 864.0, 864.0),
            descriptor(3, 1728.0, 864.0),
        ];
        let surface = PageSurface::paginated(&geom, &pages, None);

        let step = geom.page_height + geom.page_gap;
        assert_eq!(surface.frames[1].origin_y, step);
        assert_eq!(surface.frames[2].origin_y, 2.0 * step);
        assert_eq!(surface.stack_height(), Some(2.0 * step + geom.page_height));
    }

    #[test]
    fn test_continuous_mode_single_auto_frame() {
        let geom = PageGeometry::default();
        let surface = PageSurface::continuous(&geom);

        assert_eq!(surface.frames.len(), 1);
        let frame = &surface.frames[0];
        assert!(frame.live);
        assert_eq!(frame.height, None);
        assert_eq!(frame.clip_height, None);
        assert_eq!(frame.footer, None);
        assert!(!frame.corner_marks);
        assert_eq!(surface.stack_height(), None);
    }
}
