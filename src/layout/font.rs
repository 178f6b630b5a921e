//! Font metrics for headless line measurement

use crate::geometry::units::pt_to_px;
use crate::geometry::Typography;

/// Metrics needed to simulate text layout without a shaping engine
#[derive(Debug, Clone)]
pub struct FontMetrics {
    /// Line height in logical pixels
    pub line_height: f32,
    /// Width of ASCII characters (0-127)
    pub char_widths: Vec<f32>,
    /// Default width for non-ASCII characters
    pub default_width: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self::from_typography(&Typography::default())
    }
}

impl FontMetrics {
    pub fn new(line_height: f32, char_widths: Vec<f32>, default_width: f32) -> Self {
        Self {
            line_height,
            char_widths,
            default_width,
        }
    }

    /// Derive approximate metrics from resolved typography.
    ///
    /// Width approximation is 0.6em monospace-style; good enough for tests
    /// and non-browser embeddings without a shaping engine.
    pub fn from_typography(typo: &Typography) -> Self {
        let font_size_px = pt_to_px(typo.font_size_pt);
        let default_width = font_size_px * 0.6;
        Self {
            line_height: font_size_px * typo.line_height,
            char_widths: vec![default_width; 128],
            default_width,
        }
    }

    /// Get width of a character
    pub fn width(&self, c: char) -> f32 {
        if c.is_ascii() {
            if let Some(w) = self.char_widths.get(c as usize) {
                return *w;
            }
        }
        self.default_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_from_typography() {
        let metrics = FontMetrics::from_typography(&Typography {
            font_size_pt: 12.0,
            line_height: 1.5,
            paragraph_spacing_pt: 3.0,
        });

        // 12pt = 16px at 96 DPI
        assert_eq!(metrics.line_height, 24.0);
        assert_eq!(metrics.width('a'), 9.6);
    }

    #[test]
    fn test_non_ascii_uses_default_width() {
        let metrics = FontMetrics::new(16.0, vec![8.0; 128], 10.0);
        assert_eq!(metrics.width('a'), 8.0);
        assert_eq!(metrics.width('あ'), 10.0);
    }
}
