//! Physical page geometry and unit conversion.

use serde::{Deserialize, Serialize};

/// Reference pixel density (CSS pixels per inch).
pub const PX_PER_INCH: f64 = 96.0;

/// Millimetres per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// Pixels per millimetre at the reference density.
pub const PX_PER_MM: f64 = PX_PER_INCH / MM_PER_INCH;

/// PDF points per millimetre.
pub(crate) const PT_PER_MM: f64 = 72.0 / MM_PER_INCH;

/// Convert millimetres to pixels at 96 DPI.
pub fn mm_to_px(mm: f64) -> f64 {
    mm * PX_PER_MM
}

/// Convert pixels at 96 DPI to millimetres.
pub fn px_to_mm(px: f64) -> f64 {
    px / PX_PER_MM
}

/// Fixed page size with a uniform margin, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    /// Physical page width
    pub page_width: f64,

    /// Physical page height
    pub page_height: f64,

    /// Margin applied on all four sides
    pub margin: f64,
}

impl PageGeometry {
    /// Create a geometry from page size and margin.
    pub fn new(page_width: f64, page_height: f64, margin: f64) -> Self {
        Self {
            page_width,
            page_height,
            margin,
        }
    }

    /// A4 portrait with 15 mm margins.
    pub fn a4() -> Self {
        Self::new(210.0, 297.0, 15.0)
    }

    /// US Letter portrait with 15 mm margins.
    pub fn letter() -> Self {
        Self::new(215.9, 279.4, 15.0)
    }

    /// Set the margin.
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    /// Printable width.
    pub fn content_width(&self) -> f64 {
        self.page_width - self.margin * 2.0
    }

    /// Printable height.
    pub fn content_height(&self) -> f64 {
        self.page_height - self.margin * 2.0
    }

    /// Printable width in pixels.
    pub fn content_width_px(&self) -> f64 {
        mm_to_px(self.content_width())
    }

    /// Printable height in pixels.
    pub fn content_height_px(&self) -> f64 {
        mm_to_px(self.content_height())
    }

    /// Check that the printable area is positive and finite.
    pub fn is_valid(&self) -> bool {
        let w = self.content_width();
        let h = self.content_height();
        w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}
