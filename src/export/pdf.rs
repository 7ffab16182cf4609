//! Paginated PDF export.
//!
//! The assembled content is mounted into an off-screen surface one printable
//! page wide, measured, cut into page slices, and each slice is embedded as
//! a full-width JPEG image at the page margin.

use std::io::Write;
use std::time::Duration;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Object, ObjectId, Stream, StringFormat};

use crate::assemble::Assembler;
use crate::error::{Error, Result};
use crate::layout::{
    paginate, plan_pages, PageContent, PagePlan, RasterImage, RasterOptions, RenderHost, Surface,
};
use crate::model::{Document, ExportTarget, Metadata, PageGeometry, PT_PER_MM};

use super::style::{pdf_stylesheet, GENERATOR};
use super::ExportResult;

/// Default time allowed for fonts and images to load.
pub const DEFAULT_SETTLE_TIMEOUT: Duration = Duration::from_millis(500);

/// Placeholder font size in points.
const NOTICE_FONT_PT: f64 = 12.0;

/// Placeholder baseline offset below the top margin, in millimetres.
const NOTICE_OFFSET_MM: f64 = 20.0;

/// Options for PDF export.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfOptions {
    /// Page size and margin
    pub geometry: PageGeometry,

    /// Rasterization quality
    pub raster: RasterOptions,

    /// Longest wait for the mounted content to settle
    pub settle_timeout: Duration,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            geometry: PageGeometry::a4(),
            raster: RasterOptions::default(),
            settle_timeout: DEFAULT_SETTLE_TIMEOUT,
        }
    }
}

impl PdfOptions {
    /// Create A4 options with default quality.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page geometry.
    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Set the rasterization options.
    pub fn with_raster(mut self, raster: RasterOptions) -> Self {
        self.raster = raster;
        self
    }

    /// Set the settle timeout.
    pub fn with_settle_timeout(mut self, timeout: Duration) -> Self {
        self.settle_timeout = timeout;
        self
    }
}

/// Export `doc` as a PDF through `host` with the default markdown pipeline.
pub async fn export_pdf<H: RenderHost>(
    doc: &Document,
    host: &H,
    options: &PdfOptions,
) -> Result<ExportResult> {
    export_pdf_with(doc, &Assembler::default(), host, options).await
}

/// Export `doc` as a PDF through `host`, assembling with `assembler`.
///
/// The mounted surface is dropped on every path out of this function,
/// including a settle timeout.
pub async fn export_pdf_with<H: RenderHost>(
    doc: &Document,
    assembler: &Assembler,
    host: &H,
    options: &PdfOptions,
) -> Result<ExportResult> {
    let geometry = &options.geometry;
    let mut surface = mount_settled(doc, assembler, host, options).await?;

    let block = surface.measure()?;
    log::debug!(
        "Measured content: {:.1}x{:.1}px",
        block.total_width,
        block.total_height
    );
    let pagination = paginate(&block, geometry, &mut surface, &options.raster)?;
    drop(surface);

    if pagination.placeholder_count() > 0 {
        log::warn!(
            "{} of {} pages could not be rendered",
            pagination.placeholder_count(),
            pagination.pages.len()
        );
    }

    let bytes = write_pdf(&pagination.pages, geometry, &doc.metadata)?;
    Ok(ExportResult::new(doc, ExportTarget::Portable, bytes)
        .with_page_count(pagination.plan.physical_pages()))
}

/// Assemble `doc`, mount it one printable width wide and wait for it to
/// settle.
///
/// On a settle timeout the surface is dropped before the error returns.
pub(crate) async fn mount_settled<H: RenderHost>(
    doc: &Document,
    assembler: &Assembler,
    host: &H,
    options: &PdfOptions,
) -> Result<H::Surface> {
    let tree = assembler.assemble(doc, ExportTarget::Portable)?;
    let mut surface = host.mount(
        &tree,
        &pdf_stylesheet(),
        options.geometry.content_width_px(),
    )?;
    match tokio::time::timeout(options.settle_timeout, surface.settle()).await {
        Ok(settled) => settled?,
        Err(_) => return Err(Error::SettleTimeout(options.settle_timeout)),
    }
    Ok(surface)
}

/// Page plan `doc` would get in a PDF export, without rasterizing.
pub async fn plan_pdf<H: RenderHost>(
    doc: &Document,
    assembler: &Assembler,
    host: &H,
    options: &PdfOptions,
) -> Result<PagePlan> {
    let surface = mount_settled(doc, assembler, host, options).await?;
    plan_pages(&surface.measure()?, &options.geometry)
}

/// Serialize rendered pages into a PDF.
///
/// Each page carries one image or one placeholder notice. With no pages the
/// document has a single blank page.
pub fn write_pdf(pages: &[PageContent], geometry: &PageGeometry, metadata: &Metadata) -> Result<Vec<u8>> {
    let mut pdf = lopdf::Document::with_version("1.5");
    let pages_id = pdf.new_object_id();
    let font_id = pdf.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let page_width = geometry.page_width * PT_PER_MM;
    let page_height = geometry.page_height * PT_PER_MM;

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len().max(1));
    if pages.is_empty() {
        let blank = Content {
            operations: Vec::<Operation>::new(),
        };
        let content_id = add_content(&mut pdf, blank)?;
        kids.push(add_page(&mut pdf, pages_id, content_id, Dictionary::new()).into());
    }

    for page in pages {
        let (operations, resources) = match page {
            PageContent::Image(image) => {
                let image_id = pdf.add_object(image_xobject(image));
                let ops = image_operations(image, geometry, page_height);
                let resources = dictionary! {
                    "XObject" => dictionary! { "Im0" => image_id },
                };
                (ops, resources)
            }
            PageContent::Placeholder { notice, .. } => {
                let ops = notice_operations(notice, geometry, page_height);
                let resources = dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                };
                (ops, resources)
            }
        };
        let content_id = add_content(&mut pdf, Content { operations })?;
        kids.push(add_page(&mut pdf, pages_id, content_id, resources).into());
    }

    let count = kids.len() as i64;
    pdf.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![real(0.0), real(0.0), real(page_width), real(page_height)],
        }),
    );

    let catalog_id = pdf.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    pdf.trailer.set("Root", catalog_id);

    let mut info = dictionary! {
        "Producer" => Object::string_literal(GENERATOR),
        "Creator" => Object::string_literal(GENERATOR),
    };
    if let Some(title) = metadata.included_title() {
        info.set("Title", text_string(title));
    }
    if let Some(author) = metadata.included_author() {
        info.set("Author", text_string(author));
    }
    let info_id = pdf.add_object(info);
    pdf.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    pdf.save_to(&mut bytes)?;
    log::debug!("Wrote PDF: {} page(s), {} bytes", count, bytes.len());
    Ok(bytes)
}

fn add_page(
    pdf: &mut lopdf::Document,
    parent: ObjectId,
    contents: ObjectId,
    resources: Dictionary,
) -> ObjectId {
    pdf.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => parent,
        "Contents" => contents,
        "Resources" => resources,
    })
}

/// Add a Flate-compressed content stream.
fn add_content(pdf: &mut lopdf::Document, content: Content) -> Result<ObjectId> {
    let raw = content.encode()?;
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&raw)?;
    let compressed = encoder.finish()?;

    let mut stream = Stream::new(dictionary! { "Filter" => "FlateDecode" }, compressed);
    stream.allows_compression = false;
    Ok(pdf.add_object(stream))
}

fn image_xobject(image: &RasterImage) -> Stream {
    let mut stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => image.pixel_width as i64,
            "Height" => image.pixel_height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8_i64,
            "Filter" => "DCTDecode",
        },
        image.jpeg.clone(),
    );
    stream.allows_compression = false;
    stream
}

/// Draw the image at the top-left margin, printable width wide.
fn image_operations(image: &RasterImage, geometry: &PageGeometry, page_height: f64) -> Vec<Operation> {
    let width = image.placed_width * PT_PER_MM;
    let height = image.placed_height * PT_PER_MM;
    let x = geometry.margin * PT_PER_MM;
    let y = page_height - geometry.margin * PT_PER_MM - height;

    vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![real(width), real(0.0), real(0.0), real(height), real(x), real(y)],
        ),
        Operation::new("Do", vec!["Im0".into()]),
        Operation::new("Q", vec![]),
    ]
}

fn notice_operations(notice: &str, geometry: &PageGeometry, page_height: f64) -> Vec<Operation> {
    let x = geometry.margin * PT_PER_MM;
    let y = page_height - (geometry.margin + NOTICE_OFFSET_MM) * PT_PER_MM;

    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), real(NOTICE_FONT_PT)]),
        Operation::new("Td", vec![real(x), real(y)]),
        Operation::new("Tj", vec![Object::string_literal(notice)]),
        Operation::new("ET", vec![]),
    ]
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

/// PDF text string: literal for ASCII, UTF-16BE with byte order mark
/// otherwise.
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{DraftHost, RasterImage};
    use image::RgbImage;

    fn sample_image(geometry: &PageGeometry) -> RasterImage {
        RasterImage::encode(&RgbImage::new(40, 20), 2.0, 92, geometry).unwrap()
    }

    fn load(bytes: &[u8]) -> lopdf::Document {
        lopdf::Document::load_mem(bytes).unwrap()
    }

    #[test]
    fn test_empty_pages_give_one_blank_page() {
        let bytes = write_pdf(&[], &PageGeometry::a4(), &Metadata::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        assert_eq!(load(&bytes).get_pages().len(), 1);
    }

    #[test]
    fn test_one_page_per_content() {
        let g = PageGeometry::a4();
        let pages = vec![
            PageContent::Image(sample_image(&g)),
            PageContent::placeholder(1),
            PageContent::Image(sample_image(&g)),
        ];
        let bytes = write_pdf(&pages, &g, &Metadata::default()).unwrap();
        let pdf = load(&bytes);
        assert_eq!(pdf.get_pages().len(), 3);
    }

    #[test]
    fn test_placeholder_text_is_written() {
        let g = PageGeometry::a4();
        let bytes = write_pdf(&[PageContent::placeholder(0)], &g, &Metadata::default()).unwrap();
        let pdf = load(&bytes);
        let page_id = *pdf.get_pages().get(&1).unwrap();
        let content = pdf.get_and_decode_page_content(page_id).unwrap();
        let shown = content
            .operations
            .iter()
            .find(|op| op.operator == "Tj")
            .and_then(|op| op.operands.first())
            .and_then(|o| o.as_str().ok())
            .unwrap();
        assert_eq!(shown, b"[Content chunk 1 could not be rendered]");
    }

    #[test]
    fn test_image_placed_at_margin() {
        let g = PageGeometry::a4();
        let image = sample_image(&g);
        let ops = image_operations(&image, &g, g.page_height * PT_PER_MM);
        let cm = &ops[1].operands;
        let x = cm[4].as_float().unwrap() as f64;
        let y = cm[5].as_float().unwrap() as f64;
        let h = cm[3].as_float().unwrap() as f64;
        assert!((x - 15.0 * PT_PER_MM).abs() < 0.01);
        assert!((y + h - (297.0 - 15.0) * PT_PER_MM).abs() < 0.01);
    }

    #[test]
    fn test_info_respects_inclusion() {
        let meta = Metadata::default()
            .with_title("Report")
            .with_author("Ada")
            .with_inclusion(true, false, true);
        let bytes = write_pdf(&[], &PageGeometry::a4(), &meta).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("(Report)"));
        assert!(!text.contains("Ada"));
    }

    #[test]
    fn test_text_string_unicode() {
        match text_string("Café") {
            Object::String(bytes, StringFormat::Hexadecimal) => {
                assert_eq!(&bytes[..2], &[0xFE, 0xFF]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_export_pdf_with_draft_host() {
        let doc = Document::new("# Title\n\nSome text.\n").with_metadata(
            Metadata::default().with_title("My Report!!"),
        );
        let host = DraftHost::new();
        let result = export_pdf_with(
            &doc,
            &Assembler::new(crate::render::MarkdownPipeline::plain()),
            &host,
            &PdfOptions::default(),
        )
        .await
        .unwrap();
        assert_eq!(result.filename, "my-report.pdf");
        assert_eq!(result.mime_type, "application/pdf");
        assert_eq!(result.page_count, Some(1));
        assert_eq!(load(&result.bytes).get_pages().len(), 1);
        assert_eq!(host.live_surfaces(), 0);
    }

    #[tokio::test]
    async fn test_settle_timeout_releases_surface() {
        let host = DraftHost::new().with_settle_delay(Duration::from_secs(5));
        let options = PdfOptions::default().with_settle_timeout(Duration::from_millis(10));
        let err = export_pdf(&Document::new("text"), &host, &options)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SettleTimeout(d) if d == Duration::from_millis(10)));
        assert_eq!(host.live_surfaces(), 0);
    }

    #[tokio::test]
    async fn test_plan_matches_export() {
        let doc = Document::new("Paragraph of text.\n\n".repeat(400));
        let assembler = Assembler::new(crate::render::MarkdownPipeline::plain());
        let host = DraftHost::new();
        let options = PdfOptions::default();

        let plan = plan_pdf(&doc, &assembler, &host, &options).await.unwrap();
        let result = export_pdf_with(&doc, &assembler, &host, &options).await.unwrap();
        assert!(plan.page_count() > 1);
        assert_eq!(result.page_count, Some(plan.physical_pages()));
        assert_eq!(host.live_surfaces(), 0);
    }

    #[tokio::test]
    async fn test_plan_timeout_releases_surface() {
        let host = DraftHost::new().with_settle_delay(Duration::from_secs(5));
        let options = PdfOptions::default().with_settle_timeout(Duration::from_millis(10));
        let err = plan_pdf(&Document::new("text"), &Assembler::default(), &host, &options)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SettleTimeout(_)));
        assert_eq!(host.live_surfaces(), 0);
    }
}
