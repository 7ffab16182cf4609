//! Page planning: how much content goes on each physical page.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::PageGeometry;

/// Fraction of a page below which a remainder is treated as rounding.
const PAGE_EPSILON: f64 = 1e-9;

/// Measured size of the assembled content, in unscaled layout pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Rendered width of the layout container
    pub total_width: f64,

    /// Rendered height of all content
    pub total_height: f64,
}

impl ContentBlock {
    /// Create a content block from measured dimensions.
    pub fn new(total_width: f64, total_height: f64) -> Self {
        Self {
            total_width,
            total_height,
        }
    }

    /// Check if there is nothing to paginate.
    pub fn is_empty(&self) -> bool {
        self.total_height <= 0.0
    }
}

/// A vertical region of the content block assigned to one page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSlice {
    /// Zero-based page index
    pub index: usize,

    /// Top of the region in unscaled layout pixels
    pub y_offset: f64,

    /// Height of the region in unscaled layout pixels
    pub height: f64,
}

impl PageSlice {
    /// Bottom edge of the region.
    pub fn end(&self) -> f64 {
        self.y_offset + self.height
    }
}

/// Pagination plan for a content block on a page geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagePlan {
    /// Factor mapping layout pixels to printable-area pixels
    pub scale: f64,

    /// Content height after scaling
    pub scaled_total_height: f64,

    /// Printable height in pixels
    pub render_height: f64,

    /// Unscaled content height that fits on one page
    pub chunk_height: f64,

    /// One slice per page, top to bottom
    pub slices: Vec<PageSlice>,
}

impl PagePlan {
    /// Number of content pages.
    pub fn page_count(&self) -> usize {
        self.slices.len()
    }

    /// Number of physical pages in the output; a document always has one.
    pub fn physical_pages(&self) -> usize {
        self.slices.len().max(1)
    }
}

/// Plan the page slices for `block` on `geometry`.
///
/// The content is cut at fixed intervals of one printable page height,
/// regardless of where elements begin or end.
pub fn plan_pages(block: &ContentBlock, geometry: &PageGeometry) -> Result<PagePlan> {
    if !geometry.is_valid() {
        return Err(Error::Layout(format!(
            "page geometry has no printable area: {:?}",
            geometry
        )));
    }
    if !block.total_width.is_finite() || block.total_width <= 0.0 {
        return Err(Error::Layout(format!(
            "content width must be positive, got {}",
            block.total_width
        )));
    }
    if !block.total_height.is_finite() || block.total_height < 0.0 {
        return Err(Error::Layout(format!(
            "content height must be non-negative, got {}",
            block.total_height
        )));
    }

    let render_width = geometry.content_width_px();
    let render_height = geometry.content_height_px();

    let scale = render_width / block.total_width;
    let scaled_total_height = block.total_height * scale;
    let chunk_height = render_height / scale;

    // Content that is an exact multiple of the page height must not gain a
    // trailing page from rounding in the scale.
    let page_count = if block.is_empty() {
        0
    } else {
        ((scaled_total_height / render_height - PAGE_EPSILON).ceil() as usize).max(1)
    };

    let slices = (0..page_count)
        .map(|index| {
            let y_offset = index as f64 * chunk_height;
            let height = if index + 1 == page_count {
                block.total_height - y_offset
            } else {
                chunk_height
            };
            PageSlice {
                index,
                y_offset,
                height,
            }
        })
        .collect();

    log::debug!(
        "Planned {} page(s): scale {:.4}, chunk {:.2}px of {:.2}px",
        page_count,
        scale,
        chunk_height,
        block.total_height
    );

    Ok(PagePlan {
        scale,
        scaled_total_height,
        render_height,
        chunk_height,
        slices,
    })
}
