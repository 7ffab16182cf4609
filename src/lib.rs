//! # mdesigner
//!
//! Markdown document designer: live preview rendering and export to
//! paginated PDF, standalone HTML, and markdown with front matter.
//!
//! ## Quick Start
//!
//! ```no_run
//! use mdesigner::{Designer, DraftHost, Document, Metadata};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> mdesigner::Result<()> {
//!     let doc = Document::new("# Hello\n\nSome **markdown**.")
//!         .with_metadata(Metadata::today().with_title("Hello"));
//!
//!     let designer = Designer::new();
//!     let pdf = designer.export_pdf(&doc, &DraftHost::new().with_system_font()).await?;
//!     pdf.write_to(std::path::Path::new("."))?;
//!
//!     let html = designer.export_html(&doc)?;
//!     println!("{} -> {} bytes", html.filename, html.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **GFM rendering**: tables, task lists, strikethrough, autolinks
//! - **Code highlighting**: syntect classes, with language auto-detection
//! - **Paginated PDF**: content cut into page-height slices, one image per page
//! - **Shared header**: title, author and date rendered the same for every target
//! - **Session persistence**: content, metadata, theme and sidebar state

pub mod assemble;
pub mod error;
pub mod export;
pub mod layout;
pub mod model;
pub mod render;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use assemble::{assemble, metadata_header, Assembler};
pub use error::{Error, Result};
pub use export::{
    export_html, export_markdown, export_pdf, filename_for, slugify, ExportResult, PdfOptions,
};
pub use layout::{
    paginate, plan_pages, ContentBlock, DraftHost, GlyphFont, PageContent, PagePlan, PageSlice,
    Pagination, RasterImage, RasterOptions, Rasterizer, RenderHost, StyleSheet, Surface,
};
pub use model::{
    split_front_matter, ContentBody, ContentTree, Document, DocumentStats, ExportTarget,
    FrontMatter, MetaField, Metadata, MetadataHeader, PageGeometry,
};
pub use render::{MarkdownPipeline, Preview, RenderOptions};
pub use session::{AppState, Autosaver, SessionConfig, SidebarState, Theme};
pub use store::{FileStore, MemoryStore, Store};

use std::path::Path;

/// Render markdown to an HTML fragment with the default pipeline.
///
/// # Example
///
/// ```
/// let html = mdesigner::render_markdown("**bold**").unwrap();
/// assert!(html.contains("<strong>bold</strong>"));
/// ```
pub fn render_markdown(markdown: &str) -> Result<String> {
    MarkdownPipeline::default().render(markdown)
}

/// Read a markdown file, taking metadata from its front matter if present.
///
/// # Example
///
/// ```no_run
/// let doc = mdesigner::open_file("notes.md").unwrap();
/// println!("{}", doc.stats());
/// ```
pub fn open_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let source = std::fs::read_to_string(path)?;
    Ok(Document::from_markdown_source(&source))
}

/// Builder-style facade over rendering and the export writers.
///
/// # Example
///
/// ```no_run
/// use mdesigner::{Designer, Document, PageGeometry, RenderOptions};
///
/// let designer = Designer::new()
///     .with_render_options(RenderOptions::new().with_hard_breaks(false))
///     .with_geometry(PageGeometry::letter());
/// let md = designer.export_markdown(&Document::new("text"))?;
/// # Ok::<(), mdesigner::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct Designer {
    assembler: Assembler,
    pdf_options: PdfOptions,
}

impl Designer {
    /// Create a designer with default rendering and A4 PDF output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set markdown rendering options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.assembler = Assembler::new(MarkdownPipeline::with_options(options));
        self
    }

    /// Use a custom markdown pipeline.
    pub fn with_pipeline(mut self, pipeline: MarkdownPipeline) -> Self {
        self.assembler = Assembler::new(pipeline);
        self
    }

    /// Set the PDF page geometry.
    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.pdf_options = self.pdf_options.with_geometry(geometry);
        self
    }

    /// Set all PDF options.
    pub fn with_pdf_options(mut self, options: PdfOptions) -> Self {
        self.pdf_options = options;
        self
    }

    /// Current PDF options.
    pub fn pdf_options(&self) -> &PdfOptions {
        &self.pdf_options
    }

    /// Render the preview pane for `doc`.
    pub fn preview(&self, doc: &Document) -> Preview {
        Preview::of(doc, self.assembler.pipeline())
    }

    /// Assemble `doc` for `target`.
    pub fn assemble(&self, doc: &Document, target: ExportTarget) -> Result<ContentTree> {
        self.assembler.assemble(doc, target)
    }

    /// Export `doc` as standalone HTML.
    pub fn export_html(&self, doc: &Document) -> Result<ExportResult> {
        let html = export::html_document(doc, &self.assembler)?;
        Ok(ExportResult::new(doc, ExportTarget::Markup, html.into_bytes()))
    }

    /// Export `doc` as markdown with front matter.
    pub fn export_markdown(&self, doc: &Document) -> Result<ExportResult> {
        export::export_markdown_with(doc, &self.assembler)
    }

    /// Export `doc` as a paginated PDF laid out by `host`.
    pub async fn export_pdf<H: RenderHost>(&self, doc: &Document, host: &H) -> Result<ExportResult> {
        export::export_pdf_with(doc, &self.assembler, host, &self.pdf_options).await
    }

    /// Page plan `doc` would get in a PDF export, without rasterizing.
    pub async fn plan<H: RenderHost>(&self, doc: &Document, host: &H) -> Result<PagePlan> {
        export::plan_pdf(doc, &self.assembler, host, &self.pdf_options).await
    }
}
