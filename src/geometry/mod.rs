//! Page geometry: unit conversion, typography resolution, page metrics

mod page;
mod typography;
pub mod units;

pub use page::{DocumentAttributes, PageGeometry, PAGE_GAP};
pub use typography::{
    resolve_typography, Typography, FALLBACK_FONT_SIZE_PT, FALLBACK_LINE_HEIGHT,
    FALLBACK_PARAGRAPH_SPACING_PT,
};
