//! Document attributes and derived page metrics

use crate::geometry::units::twips_to_px;

/// Vertical gap between page frames in pixels
pub const PAGE_GAP: f32 = 24.0;

/// Page setup supplied by the document-attributes owner.
///
/// All lengths are twips, mirroring the page-setup structure of the exported
/// document format so no lossy round trip happens here. The engine reads this
/// record on every recomputation and never mutates it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentAttributes {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    /// Baseline grid pitch in twips, if the document uses grid layout
    pub grid_pitch: Option<f32>,
    /// Default run font size in half-points
    pub default_font_half_points: Option<f32>,
}

impl Default for DocumentAttributes {
    fn default() -> Self {
        Self {
            page_width: 12240.0, // US Letter, 8.5"
            page_height: 15840.0, // 11"
            margin_top: 1440.0, // 1" margins
            margin_bottom: 1440.0,
            margin_left: 1440.0,
            margin_right: 1440.0,
            grid_pitch: None,
            default_font_half_points: None,
        }
    }
}

/// Pixel-space page metrics derived from [`DocumentAttributes`].
///
/// Recomputed whenever the attributes change; owned by the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    /// Vertical gap between rendered page frames
    pub page_gap: f32,
}

impl PageGeometry {
    /// Derive pixel metrics from twips attributes.
    pub fn from_attributes(attrs: &DocumentAttributes) -> Self {
        Self {
            page_width: twips_to_px(attrs.page_width),
            page_height: twips_to_px(attrs.page_height),
            margin_top: twips_to_px(attrs.margin_top),
            margin_bottom: twips_to_px(attrs.margin_bottom),
            margin_left: twips_to_px(attrs.margin_left),
            margin_right: twips_to_px(attrs.margin_right),
            page_gap: PAGE_GAP,
        }
    }

    /// Usable content width per page
    pub fn content_width(&self) -> f32 {
        self.page_width - self.margin_left - self.margin_right
    }

    /// Usable content height per page: the vertical budget for flowing content
    pub fn content_height(&self) -> f32 {
        self.page_height - self.margin_top - self.margin_bottom
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::from_attributes(&DocumentAttributes::default())
    }
}
