//! TrueType glyph rendering for the draft host.

use std::fmt;
use std::path::Path;

use image::{Rgb, RgbImage};
use rusttype::{point, Font, Scale};

use crate::error::{Error, Result};

#[cfg(target_os = "linux")]
const REGULAR_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
];

#[cfg(target_os = "linux")]
const MONO_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/liberation-mono/LiberationMono-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeMono.ttf",
];

#[cfg(target_os = "macos")]
const REGULAR_CANDIDATES: &[&str] = &[
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/System/Library/Fonts/Supplemental/DejaVuSans.ttf",
];

#[cfg(target_os = "macos")]
const MONO_CANDIDATES: &[&str] = &[
    "/System/Library/Fonts/Supplemental/Courier New.ttf",
    "/Library/Fonts/Courier New.ttf",
];

#[cfg(target_os = "windows")]
const REGULAR_CANDIDATES: &[&str] = &[
    "C:\\Windows\\Fonts\\arial.ttf",
    "C:\\Windows\\Fonts\\segoeui.ttf",
    "C:\\Windows\\Fonts\\DejaVuSans.ttf",
];

#[cfg(target_os = "windows")]
const MONO_CANDIDATES: &[&str] = &["C:\\Windows\\Fonts\\consola.ttf", "C:\\Windows\\Fonts\\cour.ttf"];

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
const REGULAR_CANDIDATES: &[&str] = &[];

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
const MONO_CANDIDATES: &[&str] = &[];

/// Fonts used to draw text into page bitmaps.
///
/// Code blocks use the monospace face when one is loaded and the regular
/// face otherwise.
#[derive(Clone)]
pub struct GlyphFont {
    regular: Font<'static>,
    mono: Option<Font<'static>>,
}

impl fmt::Debug for GlyphFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlyphFont")
            .field("glyphs", &self.regular.glyph_count())
            .field("mono", &self.mono.is_some())
            .finish()
    }
}

const NOT_A_FONT: &str = "not a TrueType or OpenType font";

fn parse(data: Vec<u8>) -> Result<Font<'static>> {
    Font::try_from_vec(data).ok_or_else(|| Error::Font(NOT_A_FONT.to_string()))
}

fn load(path: &Path) -> Result<Font<'static>> {
    let data = std::fs::read(path)?;
    Font::try_from_vec(data)
        .ok_or_else(|| Error::Font(format!("{}: {}", path.display(), NOT_A_FONT)))
}

fn first_loadable(candidates: &[&str]) -> Option<Font<'static>> {
    candidates.iter().map(Path::new).filter(|p| p.is_file()).find_map(|path| {
        match load(path) {
            Ok(font) => {
                log::debug!("Using font {}", path.display());
                Some(font)
            }
            Err(e) => {
                log::debug!("Skipping font candidate: {}", e);
                None
            }
        }
    })
}

impl GlyphFont {
    /// Parse a font from raw TrueType or OpenType data.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Ok(Self {
            regular: parse(data)?,
            mono: None,
        })
    }

    /// Load a font file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            regular: load(path.as_ref())?,
            mono: None,
        })
    }

    /// Use `data` as the monospace face for code blocks.
    pub fn with_monospace(mut self, data: Vec<u8>) -> Result<Self> {
        self.mono = Some(parse(data)?);
        Ok(self)
    }

    /// Look for a usable font in the platform's usual font directories.
    pub fn discover() -> Option<Self> {
        let regular = first_loadable(REGULAR_CANDIDATES)?;
        let mono = first_loadable(MONO_CANDIDATES);
        Some(Self { regular, mono })
    }

    /// Check if a dedicated monospace face is loaded.
    pub fn has_monospace(&self) -> bool {
        self.mono.is_some()
    }

    fn face(&self, mono: bool) -> &Font<'static> {
        match (&self.mono, mono) {
            (Some(face), true) => face,
            _ => &self.regular,
        }
    }

    /// Advance width of `text` at `px` pixels per em, kerning included.
    pub fn text_width(&self, text: &str, px: f64, mono: bool) -> f64 {
        let scale = Scale::uniform(px as f32);
        self.face(mono)
            .layout(text, scale, point(0.0, 0.0))
            .last()
            .map_or(0.0, |g| {
                f64::from(g.position().x + g.unpositioned().h_metrics().advance_width)
            })
    }

    /// Ascent and descent (negative) at `px` pixels per em.
    pub fn vertical_extent(&self, px: f64, mono: bool) -> (f64, f64) {
        let metrics = self.face(mono).v_metrics(Scale::uniform(px as f32));
        (f64::from(metrics.ascent), f64::from(metrics.descent))
    }

    /// Draw `text` with its baseline at `baseline`, blending glyph coverage
    /// over the existing pixels. Anything outside the bitmap is clipped.
    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &self,
        bitmap: &mut RgbImage,
        text: &str,
        x: f64,
        baseline: f64,
        px: f64,
        mono: bool,
        ink: Rgb<u8>,
    ) {
        let scale = Scale::uniform(px as f32);
        let (width, height) = (bitmap.width() as i32, bitmap.height() as i32);

        for glyph in self
            .face(mono)
            .layout(text, scale, point(x as f32, baseline as f32))
        {
            let Some(bounds) = glyph.pixel_bounding_box() else {
                continue;
            };
            if bounds.max.x < 0 || bounds.max.y < 0 || bounds.min.x >= width || bounds.min.y >= height {
                continue;
            }
            glyph.draw(|gx, gy, coverage| {
                let tx = bounds.min.x + gx as i32;
                let ty = bounds.min.y + gy as i32;
                if tx < 0 || ty < 0 || tx >= width || ty >= height {
                    return;
                }
                blend(bitmap.get_pixel_mut(tx as u32, ty as u32), ink, coverage);
            });
        }
    }
}

fn blend(pixel: &mut Rgb<u8>, ink: Rgb<u8>, coverage: f32) {
    let alpha = coverage.clamp(0.0, 1.0);
    for (dst, src) in pixel.0.iter_mut().zip(ink.0) {
        *dst = (f32::from(*dst) * (1.0 - alpha) + f32::from(src) * alpha).round() as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_font_data() {
        let err = GlyphFont::from_bytes(b"definitely not a font".to_vec()).unwrap_err();
        assert!(matches!(err, Error::Font(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = GlyphFont::from_file("/nonexistent/font.ttf").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_blend() {
        let mut pixel = Rgb([255, 255, 255]);
        blend(&mut pixel, Rgb([0, 0, 0]), 0.5);
        assert_eq!(pixel, Rgb([128, 128, 128]));
        blend(&mut pixel, Rgb([0, 0, 0]), 1.0);
        assert_eq!(pixel, Rgb([0, 0, 0]));
    }

    #[test]
    fn test_metrics_with_system_font() {
        let Some(font) = GlyphFont::discover() else {
            return;
        };
        assert!(font.text_width("iii", 16.0, false) < font.text_width("WWW", 16.0, false));
        assert!(font.text_width("WWW", 32.0, false) > font.text_width("WWW", 16.0, false));
        assert_eq!(font.text_width("", 16.0, false), 0.0);
        if font.has_monospace() {
            let narrow = font.text_width("iii", 16.0, true);
            let wide = font.text_width("WWW", 16.0, true);
            assert!((narrow - wide).abs() < 0.5);
        }
        let (ascent, descent) = font.vertical_extent(16.0, false);
        assert!(ascent > 0.0 && descent < 0.0);
    }

    #[test]
    fn test_draw_antialiased_and_clipped() {
        let Some(font) = GlyphFont::discover() else {
            return;
        };
        let paper = Rgb([255, 255, 255]);
        let ink = Rgb([0, 0, 0]);
        let mut bitmap = RgbImage::from_pixel(60, 20, paper);
        // Starts left of the bitmap and runs past its right edge.
        font.draw(&mut bitmap, "Readable text here", -5.0, 15.0, 16.0, false, ink);
        assert!(bitmap.pixels().any(|p| *p != paper && *p != ink));
        assert!(bitmap.pixels().any(|p| p.0[0] < 64));
    }
}
