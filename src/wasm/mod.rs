//! WASM bindings for the pagination engine

pub mod flat_buffer;

use crate::wasm::flat_buffer::{decode_content, FrameBuffer};
use crate::{ContentNode, DocumentAttributes, Paginator, PaginatorOptions};
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// WASM-exposed pagination engine wrapper.
///
/// The host feeds measured content through the flat content buffer, drives
/// the clock with `performance.now()` timestamps, and reads the computed
/// surface back through zero-copy views over the frame buffer.
#[wasm_bindgen]
pub struct WasmPaginator {
    paginator: Paginator,
    content: Option<ContentNode>,
    buffer: FrameBuffer,
}

#[wasm_bindgen]
impl WasmPaginator {
    /// Create an engine with default page setup (US Letter, 1" margins)
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            paginator: Paginator::new(DocumentAttributes::default(), PaginatorOptions::default()),
            content: None,
            buffer: FrameBuffer::new(),
        }
    }

    /// Replace the document attributes (all lengths in twips; zero means
    /// "absent" for grid pitch and default font size)
    #[wasm_bindgen(js_name = setAttributes)]
    pub fn set_attributes(
        &mut self,
        page_width: f32,
        page_height: f32,
        margin_top: f32,
        margin_bottom: f32,
        margin_left: f32,
        margin_right: f32,
        grid_pitch: f32,
        default_font_half_points: f32,
        now_ms: f64,
    ) {
        let attrs = DocumentAttributes {
            page_width,
            page_height,
            margin_top,
            margin_bottom,
            margin_left,
            margin_right,
            grid_pitch: (grid_pitch > 0.0).then_some(grid_pitch),
            default_font_half_points: (default_font_half_points > 0.0)
                .then_some(default_font_half_points),
        };
        self.paginator.set_attributes(attrs, now_ms);
    }

    /// Toggle paginated presentation
    #[wasm_bindgen(js_name = setPaginated)]
    pub fn set_paginated(&mut self, paginated: bool, now_ms: f64) {
        self.paginator.set_paginated(paginated, now_ms);
    }

    /// The editable surface mounted
    #[wasm_bindgen(js_name = notifyMounted)]
    pub fn notify_mounted(&mut self, now_ms: f64) {
        self.paginator.notify_mounted(now_ms);
    }

    /// A mutation was observed under the editable surface
    #[wasm_bindgen(js_name = notifyMutation)]
    pub fn notify_mutation(&mut self, now_ms: f64) {
        self.paginator.notify_mutation(now_ms);
    }

    /// The container resized
    #[wasm_bindgen(js_name = notifyResize)]
    pub fn notify_resize(&mut self, now_ms: f64) {
        self.paginator.notify_resize(now_ms);
    }

    /// Load freshly measured content from the flat content buffer.
    ///
    /// Returns false (keeping the previous content) when the buffer is
    /// malformed.
    #[wasm_bindgen(js_name = loadContent)]
    pub fn load_content(&mut self, u32_data: &[u32], f32_data: &[f32], text_data: &[u8]) -> bool {
        match decode_content(u32_data, f32_data, text_data) {
            Some(root) => {
                self.content = Some(root);
                true
            }
            None => false,
        }
    }

    /// Run a recomputation pass if one is due.
    ///
    /// Returns true when fresh output was produced; the frame buffer is then
    /// re-encoded and its views must be re-read.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let Some(content) = &self.content else {
            return false;
        };
        if self.paginator.tick(content, now_ms).is_some() {
            self.buffer.encode(&self.paginator);
            return true;
        }
        false
    }

    /// Latest page count
    #[wasm_bindgen(js_name = pageCount)]
    pub fn page_count(&self) -> u32 {
        self.paginator.stats().page_count as u32
    }

    /// Latest visual line count
    #[wasm_bindgen(js_name = lineCount)]
    pub fn line_count(&self) -> u32 {
        self.paginator.stats().visual_line_count as u32
    }

    // Frame-buffer accessors: JS constructs typed-array views over WASM
    // linear memory from these

    #[wasm_bindgen(js_name = u32Ptr)]
    pub fn u32_ptr(&self) -> u32 {
        self.buffer.u32_ptr()
    }

    #[wasm_bindgen(js_name = u32Len)]
    pub fn u32_len(&self) -> u32 {
        self.buffer.u32_len()
    }

    #[wasm_bindgen(js_name = f32Ptr)]
    pub fn f32_ptr(&self) -> u32 {
        self.buffer.f32_ptr()
    }

    #[wasm_bindgen(js_name = f32Len)]
    pub fn f32_len(&self) -> u32 {
        self.buffer.f32_len()
    }

    #[wasm_bindgen(js_name = textPtr)]
    pub fn text_ptr(&self) -> u32 {
        self.buffer.text_ptr()
    }

    #[wasm_bindgen(js_name = textLen)]
    pub fn text_len(&self) -> u32 {
        self.buffer.text_len()
    }
}

impl Default for WasmPaginator {
    fn default() -> Self {
        Self::new()
    }
}
