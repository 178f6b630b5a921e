//! Effective typography derived from document attributes

use crate::geometry::units::{half_points_to_pt, twips_to_pt};
use crate::geometry::DocumentAttributes;

/// Font size used when the attributes carry no default run size
pub const FALLBACK_FONT_SIZE_PT: f32 = 10.5;

/// Line-height multiplier used without a line grid.
/// Generous on purpose: mixed-script lines need the headroom.
pub const FALLBACK_LINE_HEIGHT: f32 = 1.5;

/// Paragraph spacing used without a line grid
pub const FALLBACK_PARAGRAPH_SPACING_PT: f32 = 3.0;

/// Resolved default typography for the document
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Typography {
    /// Default font size in points
    pub font_size_pt: f32,
    /// Unitless line-height multiplier
    pub line_height: f32,
    /// Spacing between paragraphs in points
    pub paragraph_spacing_pt: f32,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            font_size_pt: FALLBACK_FONT_SIZE_PT,
            line_height: FALLBACK_LINE_HEIGHT,
            paragraph_spacing_pt: FALLBACK_PARAGRAPH_SPACING_PT,
        }
    }
}

/// Derive effective typography from document attributes.
///
/// When a line-grid pitch is present the line height is locked to the grid
/// (pitch / font size, 3 decimal places) and paragraph spacing becomes a
/// quarter of the pitch. Pure derivation, safe to recompute unconditionally.
pub fn resolve_typography(attrs: &DocumentAttributes) -> Typography {
    let font_size_pt = match attrs.default_font_half_points {
        Some(hp) if hp > 0.0 => half_points_to_pt(hp),
        _ => FALLBACK_FONT_SIZE_PT,
    };

    match attrs.grid_pitch {
        Some(pitch) if pitch > 0.0 => {
            let pitch_pt = twips_to_pt(pitch);
            Typography {
                font_size_pt,
                line_height: round3(pitch_pt / font_size_pt),
                paragraph_spacing_pt: pitch_pt * 0.25,
            }
        }
        _ => Typography {
            font_size_pt,
            line_height: FALLBACK_LINE_HEIGHT,
            paragraph_spacing_pt: FALLBACK_PARAGRAPH_SPACING_PT,
        },
    }
}

fn round3(value: f32) -> f32 {
    (value * 1000.0).round() / 1000.0
}
