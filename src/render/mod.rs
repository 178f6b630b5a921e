//! Page surface: the visual stack rendered from page descriptors

mod snapshot;
mod surface;

pub use snapshot::ContentSnapshot;
pub use surface::{PageFrame, PageSurface};
