//! Document assembly: metadata header plus body, per export target.

use crate::error::Result;
use crate::model::{ContentBody, ContentTree, Document, ExportTarget, MetaField, MetadataHeader};
use crate::render::MarkdownPipeline;

/// Build the metadata header shared by every export target.
///
/// Returns `None` when no field is included.
pub fn metadata_header(doc: &Document) -> Option<MetadataHeader> {
    let meta = &doc.metadata;
    let mut byline = Vec::new();
    if let Some(author) = meta.included_author() {
        byline.push(MetaField::Author(author.to_string()));
    }
    if let Some(date) = meta.included_date() {
        byline.push(MetaField::Date(date.to_string()));
    }

    let header = MetadataHeader {
        title: meta.included_title().map(str::to_string),
        byline,
    };
    (!header.is_empty()).then_some(header)
}

/// Assembles documents into content trees.
#[derive(Debug, Default)]
pub struct Assembler {
    pipeline: MarkdownPipeline,
}

impl Assembler {
    /// Create an assembler that renders through `pipeline`.
    pub fn new(pipeline: MarkdownPipeline) -> Self {
        Self { pipeline }
    }

    /// The markdown pipeline used for HTML targets.
    pub fn pipeline(&self) -> &MarkdownPipeline {
        &self.pipeline
    }

    /// Assemble a document for an export target.
    ///
    /// HTML targets get the rendered markdown as body, the markdown target
    /// gets the raw text. A blank document has no body and never reaches the
    /// renderer.
    pub fn assemble(&self, doc: &Document, target: ExportTarget) -> Result<ContentTree> {
        let body = if doc.is_blank() {
            ContentBody::Empty
        } else if target.is_html() {
            ContentBody::Html(self.pipeline.render(&doc.markdown)?)
        } else {
            ContentBody::Markdown(doc.markdown.clone())
        };

        Ok(ContentTree {
            header: metadata_header(doc),
            body,
        })
    }
}

/// Assemble a document with the default markdown pipeline.
pub fn assemble(doc: &Document, target: ExportTarget) -> Result<ContentTree> {
    Assembler::default().assemble(doc, target)
}
