//! Built-in draft layout host.
//!
//! Lays out block-level HTML and draws each text line with a TrueType font.
//! Without a font, lines are measured with fixed-advance metrics and drawn
//! as solid bars; the vertical rhythm is the same either way.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use image::{Rgb, RgbImage};
use regex::Regex;
use unicode_width::UnicodeWidthStr;

use crate::error::{Error, Result};
use crate::model::{ContentBody, ContentTree, MetadataHeader};

use super::glyph::GlyphFont;
use super::{ContentBlock, PageSlice, Rasterizer, RenderHost, StyleSheet, Surface};

/// Largest bitmap edge the draft host will allocate.
pub const DEFAULT_MAX_CANVAS_PX: u32 = 16_384;

const PX_PER_PT: f64 = 96.0 / 72.0;

/// Average glyph advance as a fraction of the font size.
const ADVANCE_EM: f64 = 0.5;

/// Bar thickness as a fraction of the font size.
const BAR_EM: f64 = 0.55;

const PAPER: Rgb<u8> = Rgb([255, 255, 255]);

const LINE_BREAK: char = '\u{2028}';

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<!--.*?-->|<(/?)([A-Za-z][A-Za-z0-9]*)\b[^>]*>").expect("valid tag regex")
    })
}

fn entity_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").expect("valid entity regex"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Title,
    Meta,
    Heading(u8),
    Paragraph,
    ListItem,
    Quote,
    Code,
    TableRow,
    Rule,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct DraftBlock {
    kind: BlockKind,
    text: String,
}

enum TagClass {
    Block(BlockKind),
    Container,
    Cell,
    Break,
    Rule,
    Inline,
}

fn classify(name: &str) -> TagClass {
    match name {
        "h1" => TagClass::Block(BlockKind::Heading(1)),
        "h2" => TagClass::Block(BlockKind::Heading(2)),
        "h3" => TagClass::Block(BlockKind::Heading(3)),
        "h4" => TagClass::Block(BlockKind::Heading(4)),
        "h5" => TagClass::Block(BlockKind::Heading(5)),
        "h6" => TagClass::Block(BlockKind::Heading(6)),
        "p" => TagClass::Block(BlockKind::Paragraph),
        "li" => TagClass::Block(BlockKind::ListItem),
        "blockquote" => TagClass::Block(BlockKind::Quote),
        "pre" => TagClass::Block(BlockKind::Code),
        "tr" => TagClass::Block(BlockKind::TableRow),
        "td" | "th" => TagClass::Cell,
        "br" => TagClass::Break,
        "hr" => TagClass::Rule,
        "ul" | "ol" | "table" | "thead" | "tbody" | "div" | "header" | "section" | "article"
        | "details" | "summary" | "figure" => TagClass::Container,
        _ => TagClass::Inline,
    }
}

/// Split an HTML fragment into text blocks.
fn parse_blocks(html: &str) -> Vec<DraftBlock> {
    let mut blocks = Vec::new();
    let mut stack: Vec<BlockKind> = Vec::new();
    let mut text = String::new();
    let mut last = 0;

    for caps in tag_regex().captures_iter(html) {
        let Some(whole) = caps.get(0) else { continue };
        text.push_str(&html[last..whole.start()]);
        last = whole.end();

        // Comments match without a tag name.
        let Some(name) = caps.get(2) else { continue };
        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let name = name.as_str().to_ascii_lowercase();

        match classify(&name) {
            TagClass::Inline => {}
            TagClass::Break => text.push(LINE_BREAK),
            TagClass::Cell => {
                if !closing {
                    text.push_str("   ");
                }
            }
            TagClass::Rule => {
                flush(&mut blocks, &mut text, current_kind(&stack));
                blocks.push(DraftBlock {
                    kind: BlockKind::Rule,
                    text: String::new(),
                });
            }
            TagClass::Container => flush(&mut blocks, &mut text, current_kind(&stack)),
            TagClass::Block(kind) => {
                flush(&mut blocks, &mut text, current_kind(&stack));
                if closing {
                    if let Some(pos) = stack.iter().rposition(|k| *k == kind) {
                        stack.truncate(pos);
                    }
                } else {
                    stack.push(kind);
                }
            }
        }
    }
    text.push_str(&html[last..]);
    flush(&mut blocks, &mut text, current_kind(&stack));
    blocks
}

fn current_kind(stack: &[BlockKind]) -> BlockKind {
    if stack.contains(&BlockKind::Code) {
        return BlockKind::Code;
    }
    // Paragraphs inside list items and quotes take the enclosing style.
    match stack.last() {
        Some(BlockKind::Paragraph) | None => stack
            .iter()
            .rev()
            .find(|k| matches!(k, BlockKind::ListItem | BlockKind::Quote))
            .copied()
            .unwrap_or(BlockKind::Paragraph),
        Some(kind) => *kind,
    }
}

fn flush(blocks: &mut Vec<DraftBlock>, text: &mut String, kind: BlockKind) {
    let raw = std::mem::take(text);
    let decoded = decode_entities(&raw);
    let content = if kind == BlockKind::Code {
        decoded.trim_matches('\n').replace('\t', "    ")
    } else {
        decoded
            .split(LINE_BREAK)
            .map(|segment| segment.split_whitespace().collect::<Vec<_>>().join(" "))
            .collect::<Vec<_>>()
            .join("\n")
            .trim_matches('\n')
            .to_string()
    };
    if !content.trim().is_empty() {
        blocks.push(DraftBlock {
            kind,
            text: content,
        });
    }
}

fn decode_entities(text: &str) -> String {
    entity_regex()
        .replace_all(text, |caps: &regex::Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ if entity.starts_with("#x") || entity.starts_with("#X") => {
                    u32::from_str_radix(&entity[2..], 16).ok().and_then(char::from_u32)
                }
                _ if entity.starts_with('#') => {
                    entity[1..].parse::<u32>().ok().and_then(char::from_u32)
                }
                _ => None,
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

fn header_blocks(header: &MetadataHeader) -> Vec<DraftBlock> {
    let mut blocks = Vec::new();
    if let Some(ref title) = header.title {
        blocks.push(DraftBlock {
            kind: BlockKind::Title,
            text: title.clone(),
        });
    }
    if !header.byline.is_empty() {
        let line = header
            .byline
            .iter()
            .map(|f| format!("{}: {}", f.label(), f.display_value()))
            .collect::<Vec<_>>()
            .join("   ");
        blocks.push(DraftBlock {
            kind: BlockKind::Meta,
            text: line,
        });
    }
    blocks.push(DraftBlock {
        kind: BlockKind::Rule,
        text: String::new(),
    });
    blocks
}

fn tree_blocks(tree: &ContentTree) -> Vec<DraftBlock> {
    let mut blocks = tree.header.as_ref().map(header_blocks).unwrap_or_default();
    match &tree.body {
        ContentBody::Empty => {}
        ContentBody::Html(html) => blocks.extend(parse_blocks(html)),
        ContentBody::Markdown(text) => {
            if !text.trim().is_empty() {
                blocks.push(DraftBlock {
                    kind: BlockKind::Code,
                    text: text.replace('\t', "    "),
                });
            }
        }
    }
    blocks
}

/// Box metrics for one block kind, in layout pixels.
struct BlockStyle {
    font_px: f64,
    line_height: f64,
    margin_top: f64,
    margin_bottom: f64,
    indent: f64,
    padding: f64,
    ink: Rgb<u8>,
    background: Option<Rgb<u8>>,
    rule: Option<Rgb<u8>>,
}

impl BlockStyle {
    fn of(kind: BlockKind, sheet: &StyleSheet) -> Self {
        let base_pt = sheet.font_size_pt;
        let body = |pt: f64| pt / 11.0 * base_pt * PX_PER_PT;
        let text = BlockStyle {
            font_px: body(11.0),
            line_height: sheet.line_height,
            margin_top: 0.0,
            margin_bottom: 0.8 * body(11.0),
            indent: 0.0,
            padding: 0.0,
            ink: Rgb([26, 26, 26]),
            background: None,
            rule: None,
        };

        match kind {
            BlockKind::Title => BlockStyle {
                font_px: body(22.0),
                line_height: 1.3,
                margin_bottom: 0.3 * body(22.0),
                ink: Rgb([17, 17, 17]),
                ..text
            },
            BlockKind::Meta => BlockStyle {
                font_px: body(9.0),
                line_height: 1.5,
                margin_bottom: 0.8 * body(9.0),
                ink: Rgb([102, 102, 102]),
                ..text
            },
            BlockKind::Heading(level) => {
                let pt = match level {
                    1 => 20.0,
                    2 => 16.0,
                    3 => 13.0,
                    4 => 11.0,
                    5 => 10.0,
                    _ => 9.0,
                };
                BlockStyle {
                    font_px: body(pt),
                    line_height: 1.4,
                    margin_top: body(pt),
                    margin_bottom: 0.5 * body(pt),
                    ink: Rgb([17, 17, 17]),
                    ..text
                }
            }
            BlockKind::Paragraph => text,
            BlockKind::ListItem => BlockStyle {
                margin_bottom: 0.3 * body(11.0),
                indent: 1.5 * body(11.0),
                ..text
            },
            BlockKind::Quote => BlockStyle {
                indent: 0.0,
                padding: 0.6 * body(11.0),
                ink: Rgb([75, 85, 99]),
                background: Some(Rgb([249, 250, 251])),
                rule: Some(Rgb([107, 114, 128])),
                ..text
            },
            BlockKind::Code => BlockStyle {
                font_px: body(9.0),
                line_height: 1.5,
                margin_top: 0.8 * body(11.0),
                padding: 0.8 * body(11.0),
                ink: Rgb([226, 232, 240]),
                background: Some(Rgb([30, 41, 59])),
                ..text
            },
            BlockKind::TableRow => BlockStyle {
                font_px: body(9.0),
                line_height: 1.5,
                margin_bottom: 0.0,
                padding: 0.4 * body(9.0),
                ink: Rgb([26, 26, 26]),
                rule: Some(Rgb([209, 213, 219])),
                ..text
            },
            BlockKind::Rule => BlockStyle {
                margin_top: 0.6 * body(11.0),
                margin_bottom: 1.2 * body(11.0),
                ink: Rgb([229, 229, 229]),
                ..text
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Fill {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    color: Rgb<u8>,
}

/// One laid-out line of text.
#[derive(Debug, Clone, PartialEq)]
struct TextRun {
    x: f64,
    /// Top of the line box
    y: f64,
    line_px: f64,
    font_px: f64,
    width: f64,
    text: String,
    mono: bool,
    ink: Rgb<u8>,
}

impl TextRun {
    fn bar(&self) -> Fill {
        let bar = self.font_px * BAR_EM;
        Fill {
            x: self.x,
            y: self.y + (self.line_px - bar) / 2.0,
            width: self.width,
            height: bar,
            color: self.ink,
        }
    }
}

/// Text measurement used for line breaking.
#[derive(Clone, Copy)]
enum Metrics<'a> {
    Fixed,
    Glyphs(&'a GlyphFont),
}

impl Metrics<'_> {
    fn width(&self, text: &str, font_px: f64, mono: bool) -> f64 {
        match self {
            Metrics::Fixed => UnicodeWidthStr::width(text) as f64 * font_px * ADVANCE_EM,
            Metrics::Glyphs(font) => font.text_width(text, font_px, mono),
        }
    }
}

/// Greedy line breaking against a measured width.
///
/// Preformatted text keeps its line structure and is broken at the last
/// character that fits instead of at word boundaries.
fn wrap_lines(
    text: &str,
    max_width: f64,
    preformatted: bool,
    measure: &dyn Fn(&str) -> f64,
) -> Vec<String> {
    let mut lines = Vec::new();

    for line in text.split('\n') {
        if preformatted {
            let line = line.trim_end();
            if line.is_empty() {
                lines.push(String::new());
            } else {
                lines.extend(break_chars(line, max_width, measure));
            }
            continue;
        }

        let start = lines.len();
        let mut current = String::new();
        for word in line.split_whitespace() {
            if !current.is_empty() {
                let candidate = format!("{} {}", current, word);
                if measure(&candidate) <= max_width {
                    current = candidate;
                    continue;
                }
                lines.push(std::mem::take(&mut current));
            }
            if measure(word) <= max_width {
                current = word.to_string();
            } else {
                let mut pieces = break_chars(word, max_width, measure);
                current = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
            }
        }
        if !current.is_empty() || lines.len() == start {
            lines.push(current);
        }
    }
    lines
}

/// Split `text` into pieces no wider than `max_width`; a single character
/// wider than the limit still gets its own piece.
fn break_chars(text: &str, max_width: f64, measure: &dyn Fn(&str) -> f64) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        current.push(c);
        if current.chars().count() > 1 && measure(&current) > max_width {
            current.pop();
            pieces.push(std::mem::replace(&mut current, c.to_string()));
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

fn layout(
    blocks: &[DraftBlock],
    sheet: &StyleSheet,
    width: f64,
    metrics: Metrics<'_>,
) -> (Vec<Fill>, Vec<TextRun>, f64) {
    let mut fills = Vec::new();
    let mut runs = Vec::new();
    let mut y = 0.0_f64;
    let mut pending_margin = 0.0_f64;

    for (i, block) in blocks.iter().enumerate() {
        let style = BlockStyle::of(block.kind, sheet);
        // Adjacent vertical margins collapse to the larger one.
        if i > 0 {
            y += pending_margin.max(style.margin_top);
        }

        if block.kind == BlockKind::Rule {
            fills.push(Fill {
                x: 0.0,
                y,
                width,
                height: 2.0,
                color: style.ink,
            });
            y += 2.0;
            pending_margin = style.margin_bottom;
            continue;
        }

        let mono = block.kind == BlockKind::Code;
        let line_px = style.font_px * style.line_height;
        let text_x = style.indent + style.padding;
        let available = (width - text_x - style.padding).max(style.font_px * ADVANCE_EM);
        let measure = |text: &str| metrics.width(text, style.font_px, mono);
        let lines = wrap_lines(&block.text, available, mono, &measure);

        let box_height = lines.len() as f64 * line_px + style.padding * 2.0;
        if let Some(background) = style.background {
            fills.push(Fill {
                x: style.indent,
                y,
                width: width - style.indent,
                height: box_height,
                color: background,
            });
        }
        if let Some(rule) = style.rule {
            let fill = match block.kind {
                BlockKind::Quote => Fill {
                    x: 0.0,
                    y,
                    width: 3.0,
                    height: box_height,
                    color: rule,
                },
                _ => Fill {
                    x: 0.0,
                    y: y + box_height - 1.0,
                    width,
                    height: 1.0,
                    color: rule,
                },
            };
            fills.push(fill);
        }

        for (row, line) in lines.into_iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            runs.push(TextRun {
                x: text_x,
                y: y + style.padding + row as f64 * line_px,
                line_px,
                font_px: style.font_px,
                width: measure(&line).min(width - text_x),
                text: line,
                mono,
                ink: style.ink,
            });
        }

        y += box_height;
        pending_margin = style.margin_bottom;
    }

    (fills, runs, y)
}

/// Layout host that draws text with an optional TrueType font.
///
/// [`DraftHost::new`] has no font and renders lines as greeked bars. Use
/// [`DraftHost::with_font`] or [`DraftHost::with_system_font`] for
/// readable pages.
#[derive(Debug, Clone)]
pub struct DraftHost {
    font: Option<Arc<GlyphFont>>,
    max_canvas_px: u32,
    settle_delay: Duration,
    live: Arc<AtomicUsize>,
}

impl DraftHost {
    /// Create a host with the default canvas limit and no settle delay.
    pub fn new() -> Self {
        Self {
            font: None,
            max_canvas_px: DEFAULT_MAX_CANVAS_PX,
            settle_delay: Duration::ZERO,
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Draw text with `font`.
    pub fn with_font(mut self, font: GlyphFont) -> Self {
        self.font = Some(Arc::new(font));
        self
    }

    /// Draw text with a font found in the system font directories, if any.
    pub fn with_system_font(self) -> Self {
        match GlyphFont::discover() {
            Some(font) => self.with_font(font),
            None => {
                log::warn!("No system font found; text will be drawn as placeholder bars");
                self
            }
        }
    }

    /// Check if text is drawn as glyphs rather than bars.
    pub fn has_glyphs(&self) -> bool {
        self.font.is_some()
    }

    /// Limit the bitmap edge length; larger rasterizations fail.
    pub fn with_max_canvas(mut self, px: u32) -> Self {
        self.max_canvas_px = px;
        self
    }

    /// Delay before mounted surfaces report settled.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Number of surfaces mounted and not yet dropped.
    pub fn live_surfaces(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

impl Default for DraftHost {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderHost for DraftHost {
    type Surface = DraftSurface;

    fn mount(&self, tree: &ContentTree, style: &StyleSheet, width_px: f64) -> Result<DraftSurface> {
        if !width_px.is_finite() || width_px <= 0.0 {
            return Err(Error::Layout(format!(
                "container width must be positive, got {}",
                width_px
            )));
        }

        let blocks = tree_blocks(tree);
        let metrics = match self.font.as_deref() {
            Some(font) => Metrics::Glyphs(font),
            None => Metrics::Fixed,
        };
        let (fills, runs, height) = layout(&blocks, style, width_px, metrics);
        log::debug!(
            "Mounted draft surface: {} blocks, {} lines, {:.1}x{:.1}px",
            blocks.len(),
            runs.len(),
            width_px,
            height
        );

        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(DraftSurface {
            width: width_px,
            height,
            fills,
            runs,
            font: self.font.clone(),
            max_canvas_px: self.max_canvas_px,
            settle_delay: self.settle_delay,
            settled: false,
            live: Arc::clone(&self.live),
        })
    }
}

/// Content laid out by a [`DraftHost`].
#[derive(Debug)]
pub struct DraftSurface {
    width: f64,
    height: f64,
    fills: Vec<Fill>,
    runs: Vec<TextRun>,
    font: Option<Arc<GlyphFont>>,
    max_canvas_px: u32,
    settle_delay: Duration,
    settled: bool,
    live: Arc<AtomicUsize>,
}

impl DraftSurface {
    /// Check if [`Surface::settle`] has completed.
    pub fn is_settled(&self) -> bool {
        self.settled
    }
}

impl Surface for DraftSurface {
    fn settle(&mut self) -> impl std::future::Future<Output = Result<()>> + Send {
        let delay = self.settle_delay;
        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            self.settled = true;
            Ok(())
        }
    }

    fn measure(&self) -> Result<ContentBlock> {
        Ok(ContentBlock::new(self.width, self.height))
    }
}

impl Rasterizer for DraftSurface {
    fn rasterize(&mut self, slice: &PageSlice, scale: f64) -> Result<RgbImage> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(Error::Raster(format!("invalid scale {}", scale)));
        }

        let width = (self.width * scale).round() as u32;
        let height = ((slice.height * scale).ceil() as u32).max(1);
        if width == 0 || width > self.max_canvas_px || height > self.max_canvas_px {
            return Err(Error::Raster(format!(
                "canvas {}x{} exceeds limit of {}px",
                width, height, self.max_canvas_px
            )));
        }

        let mut bitmap = RgbImage::from_pixel(width, height, PAPER);
        let top = slice.y_offset;
        let bottom = slice.end();

        for fill in &self.fills {
            paint(&mut bitmap, fill, top, bottom, scale);
        }

        for run in &self.runs {
            if run.y >= bottom || run.y + run.line_px <= top {
                continue;
            }
            match self.font.as_deref() {
                Some(font) => {
                    let (ascent, descent) = font.vertical_extent(run.font_px, run.mono);
                    let baseline = run.y + (run.line_px - (ascent - descent)) / 2.0 + ascent;
                    font.draw(
                        &mut bitmap,
                        &run.text,
                        run.x * scale,
                        (baseline - top) * scale,
                        run.font_px * scale,
                        run.mono,
                        run.ink,
                    );
                }
                None => paint(&mut bitmap, &run.bar(), top, bottom, scale),
            }
        }

        Ok(bitmap)
    }
}

/// Fill the part of `fill` between `top` and `bottom`, in bitmap pixels.
fn paint(bitmap: &mut RgbImage, fill: &Fill, top: f64, bottom: f64, scale: f64) {
    let y0 = fill.y.max(top);
    let y1 = (fill.y + fill.height).min(bottom);
    if y1 <= y0 {
        return;
    }

    let px0 = (fill.x * scale).floor().max(0.0) as u32;
    let px1 = (((fill.x + fill.width) * scale).ceil().max(0.0) as u32).min(bitmap.width());
    let py0 = ((y0 - top) * scale).floor().max(0.0) as u32;
    let py1 = (((y1 - top) * scale).ceil() as u32).min(bitmap.height());
    for py in py0..py1 {
        for px in px0..px1 {
            bitmap.put_pixel(px, py, fill.color);
        }
    }
}

impl Drop for DraftSurface {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}
