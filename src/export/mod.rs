//! Export target writers: paginated PDF, standalone HTML, and markdown with
//! front matter.
//!
//! Every writer builds on the same assembled [`ContentTree`](crate::model::ContentTree),
//! so the metadata header is identical across targets. Writers return the
//! finished bytes; nothing is written to disk unless the caller asks for it.
//!
//! # Example
//!
//! ```no_run
//! use mdesigner::export::{export_html, export_markdown};
//! use mdesigner::{Document, Metadata};
//!
//! fn main() -> mdesigner::Result<()> {
//!     let doc = Document::new("# Notes\n\nHello").with_metadata(
//!         Metadata::default().with_title("Weekly Notes"),
//!     );
//!
//!     let html = export_html(&doc)?;
//!     assert_eq!(html.filename, "weekly-notes.html");
//!
//!     let md = export_markdown(&doc)?;
//!     html.write_to(std::path::Path::new("out"))?;
//!     md.write_to(std::path::Path::new("out"))?;
//!     Ok(())
//! }
//! ```

mod html;
mod markdown;
mod pdf;
mod style;

pub use html::{export_html, html_document};
pub use markdown::{export_markdown, export_markdown_with, markdown_document};
pub use pdf::{
    export_pdf, export_pdf_with, plan_pdf, write_pdf, PdfOptions, DEFAULT_SETTLE_TIMEOUT,
};
pub use style::{pdf_stylesheet, GENERATOR, HTML_CSS, PDF_CSS};

use std::path::{Path, PathBuf};

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::error::Result;
use crate::model::{Document, ExportTarget};

/// Slug used when a title yields no usable characters.
pub const UNTITLED_SLUG: &str = "untitled-document";

/// A finished export, ready to be saved.
#[derive(Debug, Clone)]
pub struct ExportResult {
    /// Target the bytes were produced for
    pub target: ExportTarget,

    /// Suggested file name, `{slug}.{ext}`
    pub filename: String,

    /// File contents
    pub bytes: Vec<u8>,

    /// MIME type of the contents
    pub mime_type: &'static str,

    /// Number of physical pages (PDF only)
    pub page_count: Option<usize>,
}

impl ExportResult {
    /// Create a result for `doc` with the target's MIME type.
    pub fn new(doc: &Document, target: ExportTarget, bytes: Vec<u8>) -> Self {
        Self {
            target,
            filename: filename_for(doc, target),
            bytes,
            mime_type: target.mime_type(),
            page_count: None,
        }
    }

    /// Set the page count.
    pub fn with_page_count(mut self, pages: usize) -> Self {
        self.page_count = Some(pages);
        self
    }

    /// Get content length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the contents are empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Contents as UTF-8 text, for the text targets.
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }

    /// Write the contents into `dir` under [`ExportResult::filename`].
    ///
    /// The directory is created if needed.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes)?;
        log::info!("Wrote {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// Derive a file-name-safe slug from a title.
///
/// Accented letters fold to their base letter; every run of other
/// characters becomes a single `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.nfkd().filter(|c| !is_combining_mark(*c)) {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        UNTITLED_SLUG.to_string()
    } else {
        slug
    }
}

/// File name for exporting `doc` to `target`.
pub fn filename_for(doc: &Document, target: ExportTarget) -> String {
    format!("{}.{}", slugify(&doc.metadata.title), target.extension())
}
