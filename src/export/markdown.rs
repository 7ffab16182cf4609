//! Markdown export with front matter.

use crate::assemble::Assembler;
use crate::error::Result;
use crate::model::{ContentBody, ContentTree, Document, ExportTarget, MetadataHeader};

use super::ExportResult;

/// Markdown text for an assembled tree: the header as front matter, then
/// the buffer byte-for-byte.
pub fn markdown_document(tree: &ContentTree) -> String {
    let mut text = tree
        .header
        .as_ref()
        .map(MetadataHeader::to_front_matter)
        .unwrap_or_default();
    match &tree.body {
        ContentBody::Empty => {}
        ContentBody::Markdown(body) | ContentBody::Html(body) => text.push_str(body),
    }
    text
}

/// Export `doc` as a markdown file, assembling with `assembler`.
pub fn export_markdown_with(doc: &Document, assembler: &Assembler) -> Result<ExportResult> {
    let tree = assembler.assemble(doc, ExportTarget::Markdown)?;
    Ok(ExportResult::new(
        doc,
        ExportTarget::Markdown,
        markdown_document(&tree).into_bytes(),
    ))
}

/// Export `doc` as a markdown file.
pub fn export_markdown(doc: &Document) -> Result<ExportResult> {
    export_markdown_with(doc, &Assembler::default())
}
