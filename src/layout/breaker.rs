//! Page breaking over measured visual lines

use crate::layout::lines::LineRect;

/// One page's visible window into the content stream.
///
/// `content_offset` is the pixel offset where this page's window starts;
/// offsets are strictly increasing across the list. The list is replaced
/// wholesale on every recomputation, never patched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageDescriptor {
    /// 1-based, contiguous page number
    pub page_number: u32,
    /// Pixel offset into the content stream where this page starts
    pub content_offset: f32,
    /// Pixel height of content shown on this page
    pub visible_height: f32,
}

/// Read-only layout summary pushed to the chrome after each successful pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutStats {
    pub page_count: usize,
    pub visual_line_count: usize,
}

/// Result of a page-breaking pass
#[derive(Debug, Clone, PartialEq)]
pub struct Pagination {
    pub pages: Vec<PageDescriptor>,
    /// Visual lines that entered the break calculation
    pub line_count: usize,
}

/// Break `lines` into pages of `content_height` pixels.
///
/// Single forward greedy pass, no backtracking, O(lines). A line is pushed to
/// the next page only when its bottom strictly exceeds the page boundary: a
/// line flush with the page bottom stays on its page. Lines are never split.
/// Unresolvable lines are dropped from the calculation.
pub fn break_pages(lines: &[LineRect], content_height: f32) -> Pagination {
    let mut pages: Vec<PageDescriptor> = Vec::new();
    let mut page_start = 0.0_f32;
    let mut line_count = 0usize;

    for line in lines {
        if !line.is_resolvable() {
            log::debug!("skipping unresolvable line {line:?}");
            continue;
        }
        line_count += 1;

        if line.bottom > page_start + content_height {
            // First break: emit page 1 lazily so a single-page document never
            // allocates more than one descriptor.
            if pages.is_empty() {
                pages.push(PageDescriptor {
                    page_number: 1,
                    content_offset: 0.0,
                    visible_height: 0.0,
                });
            }
            page_start = line.top;
            pages.push(PageDescriptor {
                page_number: pages.len() as u32 + 1,
                content_offset: page_start,
                visible_height: 0.0,
            });
        }
    }

    if pages.is_empty() {
        pages.push(PageDescriptor {
            page_number: 1,
            content_offset: 0.0,
            visible_height: content_height,
        });
    }

    // Visible height of each page is the gap to the next page's offset; the
    // last page keeps the full content-area height.
    for idx in 0..pages.len() {
        pages[idx].visible_height = if idx + 1 < pages.len() {
            pages[idx + 1].content_offset - pages[idx].content_offset
        } else {
            content_height
        };
    }

    Pagination { pages, line_count }
}
