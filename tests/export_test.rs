//! Integration tests for the export writers.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use image::{Rgb, RgbImage};
use mdesigner::error::{Error, Result};
use mdesigner::{
    paginate, plan_pages, ContentBlock, ContentTree, Designer, Document, DraftHost, ExportTarget,
    GlyphFont, MarkdownPipeline, Metadata, PageContent, PageGeometry, PageSlice, PdfOptions, RasterOptions,
    Rasterizer, RenderHost, StyleSheet, Surface,
};

/// Host whose surfaces have a fixed height and fail on chosen pages.
struct StubHost {
    height_px: f64,
    failing_pages: Vec<usize>,
    fail_fallback: bool,
    live: Arc<AtomicUsize>,
}

impl StubHost {
    fn new(height_px: f64) -> Self {
        Self {
            height_px,
            failing_pages: Vec::new(),
            fail_fallback: true,
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn failing(mut self, pages: &[usize], fail_fallback: bool) -> Self {
        self.failing_pages = pages.to_vec();
        self.fail_fallback = fail_fallback;
        self
    }

    fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

struct StubSurface {
    width_px: f64,
    height_px: f64,
    failing_pages: Vec<usize>,
    fail_fallback: bool,
    live: Arc<AtomicUsize>,
}

impl RenderHost for StubHost {
    type Surface = StubSurface;

    fn mount(&self, _tree: &ContentTree, _style: &StyleSheet, width_px: f64) -> Result<StubSurface> {
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(StubSurface {
            width_px,
            height_px: self.height_px,
            failing_pages: self.failing_pages.clone(),
            fail_fallback: self.fail_fallback,
            live: Arc::clone(&self.live),
        })
    }
}

impl Rasterizer for StubSurface {
    fn rasterize(&mut self, slice: &PageSlice, scale: f64) -> Result<RgbImage> {
        if self.failing_pages.contains(&slice.index) && (scale > 1.0 || self.fail_fallback) {
            return Err(Error::Raster(format!("slice {} too large", slice.index)));
        }
        let width = ((self.width_px * scale / 8.0).ceil() as u32).max(1);
        let height = ((slice.height * scale / 8.0).ceil() as u32).max(1);
        Ok(RgbImage::from_pixel(width, height, Rgb([255, 255, 255])))
    }
}

impl Surface for StubSurface {
    fn settle(&mut self) -> impl Future<Output = Result<()>> + Send {
        std::future::ready(Ok(()))
    }

    fn measure(&self) -> Result<ContentBlock> {
        Ok(ContentBlock::new(self.width_px, self.height_px))
    }
}

impl Drop for StubSurface {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

fn designer() -> Designer {
    Designer::new().with_pipeline(MarkdownPipeline::plain())
}

fn page_text(pdf: &lopdf::Document, page: u32) -> String {
    let id = *pdf.get_pages().get(&page).unwrap();
    let content = pdf.get_and_decode_page_content(id).unwrap();
    content
        .operations
        .iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| op.operands.first())
        .filter_map(|o| o.as_str().ok())
        .map(|s| String::from_utf8_lossy(s).into_owned())
        .collect()
}

#[test]
fn test_three_and_a_half_pages() {
    let geometry = PageGeometry::a4();
    let chunk = geometry.content_height_px();
    let block = ContentBlock::new(geometry.content_width_px(), chunk * 3.5);

    let plan = plan_pages(&block, &geometry).unwrap();
    assert_eq!(plan.page_count(), 4);
    assert!((plan.scale - 1.0).abs() < 1e-9);
    assert!((plan.slices[3].y_offset - chunk * 3.0).abs() < 1e-6);
    assert!((plan.slices[3].height - chunk * 0.5).abs() < 1e-6);
}

#[test]
fn test_exact_page_multiples_plan_no_extra_page() {
    let geometry = PageGeometry::a4();
    for (width, pages) in [(600.0, 3), (500.0, 13), (680.0, 7), (1000.0, 40)] {
        let per_page = geometry.content_height_px() * width / geometry.content_width_px();
        let block = ContentBlock::new(width, per_page * pages as f64);
        let plan = plan_pages(&block, &geometry).unwrap();
        assert_eq!(plan.page_count(), pages, "container width {}", width);
        assert!(plan.slices.iter().all(|s| s.height > 0.0));
    }
}

#[tokio::test]
async fn test_exact_page_multiple_exports_no_blank_page() {
    let geometry = PageGeometry::a4();
    let host = StubHost::new(geometry.content_height_px() * 3.0);
    let result = designer()
        .export_pdf(&Document::new("body"), &host)
        .await
        .unwrap();
    assert_eq!(result.page_count, Some(3));
    let pdf = lopdf::Document::load_mem(&result.bytes).unwrap();
    assert_eq!(pdf.get_pages().len(), 3);
}

#[test]
fn test_retry_at_fallback_scale() {
    let geometry = PageGeometry::a4();
    let host = StubHost::new(geometry.content_height_px() * 3.0).failing(&[1], false);
    let tree = ContentTree::default();
    let mut surface = host
        .mount(&tree, &StyleSheet::default(), geometry.content_width_px())
        .unwrap();
    let block = surface.measure().unwrap();
    let options = RasterOptions::default();

    let pagination = paginate(&block, &geometry, &mut surface, &options).unwrap();
    assert_eq!(pagination.pages.len(), 3);
    assert_eq!(pagination.placeholder_count(), 0);
    assert_eq!(pagination.degraded_count(&options), 1);

    drop(surface);
    assert_eq!(host.live(), 0);
}

#[tokio::test]
async fn test_pdf_keeps_page_for_failed_slice() {
    let geometry = PageGeometry::a4();
    let host = StubHost::new(geometry.content_height_px() * 2.5).failing(&[1], true);
    let doc = Document::new("body").with_metadata(Metadata::default().with_title("Chunks"));

    let result = designer().export_pdf(&doc, &host).await.unwrap();
    assert_eq!(result.page_count, Some(3));
    assert_eq!(host.live(), 0);

    let pdf = lopdf::Document::load_mem(&result.bytes).unwrap();
    assert_eq!(pdf.get_pages().len(), 3);
    assert_eq!(page_text(&pdf, 1), "");
    assert_eq!(page_text(&pdf, 2), "[Content chunk 2 could not be rendered]");
    assert_eq!(page_text(&pdf, 3), "");
}

#[tokio::test]
async fn test_empty_content_gives_blank_page() {
    let host = StubHost::new(0.0);
    let result = designer()
        .export_pdf(&Document::new(""), &host)
        .await
        .unwrap();
    assert_eq!(result.page_count, Some(1));
    let pdf = lopdf::Document::load_mem(&result.bytes).unwrap();
    assert_eq!(pdf.get_pages().len(), 1);
}

#[tokio::test]
async fn test_pdf_with_draft_host() {
    let doc = Document::new("# Heading\n\n".to_string() + &"A paragraph of text.\n\n".repeat(300))
        .with_metadata(Metadata::default().with_title("My Report!!"));
    let host = DraftHost::new();

    let result = designer().export_pdf(&doc, &host).await.unwrap();
    assert_eq!(result.filename, "my-report.pdf");
    assert_eq!(result.target, ExportTarget::Portable);
    assert!(result.page_count.unwrap() > 1);
    assert_eq!(host.live_surfaces(), 0);

    let pdf = lopdf::Document::load_mem(&result.bytes).unwrap();
    assert_eq!(pdf.get_pages().len(), result.page_count.unwrap());
}

#[tokio::test]
async fn test_pdf_with_system_font() {
    let Some(font) = GlyphFont::discover() else {
        return;
    };
    let host = DraftHost::new().with_font(font);
    let doc = Document::new("# Heading\n\n".to_string() + &"Readable sentence.\n\n".repeat(200));

    let result = designer().export_pdf(&doc, &host).await.unwrap();
    assert!(result.page_count.unwrap() > 1);
    assert_eq!(host.live_surfaces(), 0);
}

#[tokio::test]
async fn test_settle_timeout_releases_surface() {
    let host = DraftHost::new().with_settle_delay(Duration::from_secs(5));
    let designer = designer()
        .with_pdf_options(PdfOptions::new().with_settle_timeout(Duration::from_millis(20)));

    let err = designer
        .export_pdf(&Document::new("text"), &host)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SettleTimeout(_)));
    assert_eq!(host.live_surfaces(), 0);
}

#[tokio::test]
async fn test_excluded_author_absent_from_all_targets() {
    let doc = Document::new("Plain body.\n").with_metadata(
        Metadata::default()
            .with_title("Quarterly")
            .with_author("Ada Lovelace")
            .with_date("2024-03-05")
            .with_inclusion(true, false, true),
    );
    let designer = designer();

    let md = designer.export_markdown(&doc).unwrap();
    let md = md.as_text().unwrap();
    assert!(md.contains("title: \"Quarterly\""));
    assert!(!md.contains("Ada"));

    let html = designer.export_html(&doc).unwrap();
    let html = html.as_text().unwrap();
    assert!(html.contains("Quarterly"));
    assert!(!html.contains("Ada"));

    let pdf = designer.export_pdf(&doc, &DraftHost::new()).await.unwrap();
    let pdf = lopdf::Document::load_mem(&pdf.bytes).unwrap();
    let info_id = pdf.trailer.get(b"Info").unwrap().as_reference().unwrap();
    let info = pdf.get_dictionary(info_id).unwrap();
    assert!(info.has(b"Title"));
    assert!(!info.has(b"Author"));
}

#[test]
fn test_exported_filenames() {
    let doc = Document::new("x").with_metadata(Metadata::default().with_title("My Report!!"));
    let designer = designer();
    assert_eq!(designer.export_html(&doc).unwrap().filename, "my-report.html");
    assert_eq!(designer.export_markdown(&doc).unwrap().filename, "my-report.md");

    let untitled = Document::new("x").with_metadata(Metadata::default());
    assert_eq!(
        designer.export_markdown(&untitled).unwrap().filename,
        "untitled-document.md"
    );
}

#[test]
fn test_markdown_round_trip() {
    let source = "# Notes\n\n- [x] done\n- [ ] todo\n\n| a | b |\n|---|---|\n| 1 | 2 |\n";
    let doc = Document::new(source).with_metadata(
        Metadata::default()
            .with_title("Notes: \"draft\"")
            .with_author("Grace")
            .with_date("2024-01-02"),
    );

    let exported = designer().export_markdown(&doc).unwrap();
    let imported = Document::from_markdown_source(exported.as_text().unwrap());
    assert_eq!(imported.markdown, source);
    assert_eq!(imported.metadata.title, doc.metadata.title);
    assert_eq!(imported.metadata.author, "Grace");
    assert_eq!(imported.metadata.date, "2024-01-02");
}

#[test]
fn test_markdown_round_trip_without_metadata() {
    let source = "---\nIntro\n---\n\nA paragraph under a rule.\n";
    let doc = Document::new(source).with_metadata(
        Metadata::default()
            .with_title("Unused")
            .with_inclusion(false, false, false),
    );

    let exported = designer().export_markdown(&doc).unwrap();
    assert_eq!(exported.as_text().unwrap(), source);
    let imported = Document::from_markdown_source(exported.as_text().unwrap());
    assert_eq!(imported.markdown, source);
    assert_eq!(imported.metadata.title, "");
}

#[test]
fn test_foreign_front_matter_kept_on_import() {
    let source = "---\nlayout: post\ntags: [rust, pdf]\n---\n\n# Post\n";
    let imported = Document::from_markdown_source(source);
    assert_eq!(imported.markdown, source);
    assert_eq!(imported.metadata.title, "");

    let exported = designer().export_markdown(&imported).unwrap();
    assert_eq!(exported.as_text().unwrap(), source);
}

#[test]
fn test_write_to_directory() {
    let dir = tempfile::tempdir().unwrap();
    let doc = Document::new("text").with_metadata(Metadata::default().with_title("Saved"));
    let result = designer().export_html(&doc).unwrap();
    let path = result.write_to(&dir.path().join("out")).unwrap();
    assert_eq!(path.file_name().unwrap(), "saved.html");
    assert_eq!(std::fs::read(&path).unwrap(), result.bytes);
}
