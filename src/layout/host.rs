//! Layout host abstraction.
//!
//! A host lays out a [`ContentTree`] at a fixed width, waits for its
//! asynchronous resources, reports the laid-out size, and rasterizes
//! vertical regions of it. Surfaces release their resources on drop, so
//! every exit path of an export tears the layout down.

use std::future::Future;

use image::RgbImage;

use crate::error::Result;
use crate::model::ContentTree;

use super::{ContentBlock, PageSlice};

/// Presentation applied to mounted content.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSheet {
    /// CSS text for hosts that understand it
    pub css: String,

    /// Base font size in points
    pub font_size_pt: f64,

    /// Base line height as a multiple of the font size
    pub line_height: f64,
}

impl StyleSheet {
    /// Create a style sheet from CSS with an 11pt base font.
    pub fn new(css: impl Into<String>) -> Self {
        Self {
            css: css.into(),
            font_size_pt: 11.0,
            line_height: 1.7,
        }
    }

    /// Set the base font size.
    pub fn with_font_size(mut self, pt: f64) -> Self {
        self.font_size_pt = pt;
        self
    }

    /// Set the base line height.
    pub fn with_line_height(mut self, factor: f64) -> Self {
        self.line_height = factor;
        self
    }
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self::new(String::new())
    }
}

/// Renders a vertical region of laid-out content to a bitmap.
pub trait Rasterizer {
    /// Rasterize `slice` at `scale` device pixels per layout pixel.
    fn rasterize(&mut self, slice: &PageSlice, scale: f64) -> Result<RgbImage>;
}

/// Laid-out content owned by a [`RenderHost`].
pub trait Surface: Rasterizer {
    /// Resolve once fonts, images and other asynchronous resources are ready.
    fn settle(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Size of the laid-out content.
    fn measure(&self) -> Result<ContentBlock>;
}

/// Lays out content trees off-screen.
pub trait RenderHost {
    /// Surface type produced by [`RenderHost::mount`].
    type Surface: Surface + Send;

    /// Lay out `tree` with `style` in a container `width_px` wide.
    fn mount(&self, tree: &ContentTree, style: &StyleSheet, width_px: f64)
        -> Result<Self::Surface>;
}
