//! Fixed-point length unit conversion
//!
//! Document attributes arrive in twips (1/20 point, 1440 per inch). Rendering
//! happens at a fixed 96 DPI, so every conversion here is a pure linear
//! scale. Multiply before dividing: page-setup values are whole twips, and
//! this order keeps their pixel results exact.

/// Twips per inch
pub const TWIPS_PER_INCH: f32 = 1440.0;

/// Rendering resolution in pixels per inch
pub const PX_PER_INCH: f32 = 96.0;

/// Twips per typographic point
pub const TWIPS_PER_POINT: f32 = 20.0;

/// Typographic points per inch
pub const POINTS_PER_INCH: f32 = 72.0;

/// Convert twips to rendering pixels.
///
/// Total and sign-preserving; callers clamp if they need non-negative values.
pub fn twips_to_px(twips: f32) -> f32 {
    twips * PX_PER_INCH / TWIPS_PER_INCH
}

/// Convert twips to typographic points.
pub fn twips_to_pt(twips: f32) -> f32 {
    twips / TWIPS_PER_POINT
}

/// Convert half-points (the run-size unit) to points.
pub fn half_points_to_pt(half_points: f32) -> f32 {
    half_points / 2.0
}

/// Convert typographic points to rendering pixels.
pub fn pt_to_px(points: f32) -> f32 {
    points * PX_PER_INCH / POINTS_PER_INCH
}
