//! Page layout: measuring content, slicing it into pages, and rasterizing
//! each slice.
//!
//! The content is laid out once at a fixed container width, measured, then
//! cut into page-height slices at fixed intervals. Breaks do not respect
//! element boundaries.

mod draft;
mod glyph;
mod host;
mod plan;
mod raster;

pub use draft::{DraftHost, DraftSurface, DEFAULT_MAX_CANVAS_PX};
pub use glyph::GlyphFont;
pub use host::{Rasterizer, RenderHost, StyleSheet, Surface};
pub use plan::{plan_pages, ContentBlock, PagePlan, PageSlice};
pub use raster::{paginate, PageContent, Pagination, RasterImage, RasterOptions};
