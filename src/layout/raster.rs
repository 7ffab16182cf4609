//! Page rasterization with retry and placeholder fallback.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, RgbImage};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::PageGeometry;

use super::{plan_pages, ContentBlock, PagePlan, PageSlice, Rasterizer};

/// Rasterization quality settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RasterOptions {
    /// Device pixels per layout pixel on the first attempt
    pub oversample: f64,

    /// JPEG quality (1-100) on the first attempt
    pub quality: u8,

    /// Device pixels per layout pixel on the retry
    pub fallback_scale: f64,

    /// JPEG quality (1-100) on the retry
    pub fallback_quality: u8,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            oversample: 2.0,
            quality: 92,
            fallback_scale: 1.0,
            fallback_quality: 85,
        }
    }
}

impl RasterOptions {
    /// Create options with the default 2x oversampling.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set first-attempt scale and quality.
    pub fn with_primary(mut self, oversample: f64, quality: u8) -> Self {
        self.oversample = oversample;
        self.quality = quality.clamp(1, 100);
        self
    }

    /// Set retry scale and quality.
    pub fn with_fallback(mut self, scale: f64, quality: u8) -> Self {
        self.fallback_scale = scale;
        self.fallback_quality = quality.clamp(1, 100);
        self
    }
}

/// A page slice encoded as JPEG and sized for placement.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    /// Baseline JPEG bytes
    pub jpeg: Vec<u8>,

    /// Bitmap width in pixels
    pub pixel_width: u32,

    /// Bitmap height in pixels
    pub pixel_height: u32,

    /// Scale the bitmap was rendered at
    pub scale: f64,

    /// JPEG quality used
    pub quality: u8,

    /// Placed width in millimetres (the printable width)
    pub placed_width: f64,

    /// Placed height in millimetres, never more than the printable height
    pub placed_height: f64,
}

impl RasterImage {
    /// Encode a bitmap and compute its placement on `geometry`.
    pub fn encode(
        bitmap: &RgbImage,
        scale: f64,
        quality: u8,
        geometry: &PageGeometry,
    ) -> Result<Self> {
        let (width, height) = bitmap.dimensions();
        if width == 0 || height == 0 {
            return Err(Error::Raster(format!(
                "empty bitmap ({}x{})",
                width, height
            )));
        }

        let mut jpeg = Cursor::new(Vec::new());
        JpegEncoder::new_with_quality(&mut jpeg, quality).encode(
            bitmap.as_raw(),
            width,
            height,
            ColorType::Rgb8,
        )?;

        let placed_width = geometry.content_width();
        let placed_height =
            (height as f64 * placed_width / width as f64).min(geometry.content_height());

        Ok(Self {
            jpeg: jpeg.into_inner(),
            pixel_width: width,
            pixel_height: height,
            scale,
            quality,
            placed_width,
            placed_height,
        })
    }
}

/// Content of one output page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageContent {
    /// Rasterized slice
    Image(RasterImage),

    /// Both attempts failed; the page carries a notice instead
    Placeholder {
        /// Zero-based page index
        page_index: usize,
        /// Text shown on the page
        notice: String,
    },
}

impl PageContent {
    /// Placeholder for a slice that could not be rendered.
    pub fn placeholder(page_index: usize) -> Self {
        PageContent::Placeholder {
            page_index,
            notice: format!("[Content chunk {} could not be rendered]", page_index + 1),
        }
    }

    /// Check if this page is a placeholder.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, PageContent::Placeholder { .. })
    }
}

/// A page plan with the rendered content of each page.
#[derive(Debug, Clone)]
pub struct Pagination {
    /// Slices the pages were cut from
    pub plan: PagePlan,

    /// One entry per slice, in order
    pub pages: Vec<PageContent>,
}

impl Pagination {
    /// Number of pages that fell back to a placeholder.
    pub fn placeholder_count(&self) -> usize {
        self.pages.iter().filter(|p| p.is_placeholder()).count()
    }

    /// Number of pages rendered at the retry scale.
    pub fn degraded_count(&self, options: &RasterOptions) -> usize {
        self.pages
            .iter()
            .filter(|p| matches!(p, PageContent::Image(img) if img.scale < options.oversample))
            .count()
    }
}

/// Plan `block` on `geometry` and rasterize every slice.
///
/// Each slice is tried at the primary settings, then once at the fallback
/// settings, then replaced by a placeholder. A failing slice never aborts
/// the document.
pub fn paginate<R: Rasterizer + ?Sized>(
    block: &ContentBlock,
    geometry: &PageGeometry,
    rasterizer: &mut R,
    options: &RasterOptions,
) -> Result<Pagination> {
    let plan = plan_pages(block, geometry)?;
    let mut pages = Vec::with_capacity(plan.page_count());

    for slice in &plan.slices {
        let page = match render_slice(
            rasterizer,
            slice,
            options.oversample,
            options.quality,
            geometry,
        ) {
            Ok(image) => PageContent::Image(image),
            Err(e) => {
                log::warn!(
                    "Failed to render chunk {}, retrying at scale {}: {}",
                    slice.index + 1,
                    options.fallback_scale,
                    e
                );
                match render_slice(
                    rasterizer,
                    slice,
                    options.fallback_scale,
                    options.fallback_quality,
                    geometry,
                ) {
                    Ok(image) => PageContent::Image(image),
                    Err(e) => {
                        log::error!("Chunk {} could not be rendered: {}", slice.index + 1, e);
                        PageContent::placeholder(slice.index)
                    }
                }
            }
        };
        pages.push(page);
    }

    Ok(Pagination { plan, pages })
}

fn render_slice<R: Rasterizer + ?Sized>(
    rasterizer: &mut R,
    slice: &PageSlice,
    scale: f64,
    quality: u8,
    geometry: &PageGeometry,
) -> Result<RasterImage> {
    let bitmap = rasterizer.rasterize(slice, scale)?;
    RasterImage::encode(&bitmap, scale, quality, geometry)
}
