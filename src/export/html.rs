//! Standalone HTML export.

use crate::assemble::Assembler;
use crate::error::Result;
use crate::model::{escape_html, Document, ExportTarget};

use super::style::{GENERATOR, HTML_CSS};
use super::ExportResult;

const FONT_LINKS: &str = r#"    <link rel="preconnect" href="https://fonts.googleapis.com">
    <link rel="preconnect" href="https://fonts.gstatic.com" crossorigin>
    <link href="https://fonts.googleapis.com/css2?family=Inter:wght@300;400;500;600;700&family=JetBrains+Mono:wght@400;500&display=swap" rel="stylesheet">
"#;

/// Build a standalone HTML document for `doc` with `assembler`.
pub fn html_document(doc: &Document, assembler: &Assembler) -> Result<String> {
    let tree = assembler.assemble(doc, ExportTarget::Markup)?;

    let title = match doc.metadata.title.trim() {
        "" => "Untitled Document",
        t => t,
    };

    let mut html = String::with_capacity(HTML_CSS.len() + 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("    <meta charset=\"UTF-8\">\n");
    html.push_str(
        "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    html.push_str(&format!(
        "    <meta name=\"generator\" content=\"{}\">\n",
        GENERATOR
    ));
    if let Some(author) = doc.metadata.included_author() {
        html.push_str(&format!(
            "    <meta name=\"author\" content=\"{}\">\n",
            escape_html(author)
        ));
    }
    html.push_str(&format!("    <title>{}</title>\n", escape_html(title)));
    html.push_str(FONT_LINKS);
    html.push_str("    <style>\n");
    html.push_str(HTML_CSS);
    html.push_str("    </style>\n</head>\n<body>\n");
    html.push_str(&tree.to_html());
    html.push_str("\n</body>\n</html>\n");

    Ok(html)
}

/// Export `doc` as a standalone HTML file.
pub fn export_html(doc: &Document) -> Result<ExportResult> {
    let html = html_document(doc, &Assembler::default())?;
    Ok(ExportResult::new(doc, ExportTarget::Markup, html.into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Metadata;
    use crate::render::MarkdownPipeline;

    fn render(doc: &Document) -> String {
        html_document(doc, &Assembler::new(MarkdownPipeline::plain())).unwrap()
    }

    #[test]
    fn test_html_document_structure() {
        let doc = Document::new("# Intro\n\nHello").with_metadata(
            Metadata::default()
                .with_title("Q&A Notes")
                .with_author("Ada")
                .with_date("2024-03-05"),
        );
        let html = render(&doc);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Q&amp;A Notes</title>"));
        assert!(html.contains("<meta name=\"author\" content=\"Ada\">"));
        assert!(html.contains("<meta name=\"generator\" content=\"MarkDown Designer\">"));
        assert!(html.contains("<header class=\"document-header\"><h1>Q&amp;A Notes</h1>"));
        assert!(html.contains("<strong>Date:</strong> March 5, 2024"));

        let header_at = html.find("document-header\">").unwrap();
        let body_at = html.find("Hello").unwrap();
        assert!(header_at < body_at);
    }

    #[test]
    fn test_untitled_fallback() {
        let html = render(&Document::new("text"));
        assert!(html.contains("<title>Untitled Document</title>"));
        assert!(!html.contains("document-header\">"));
    }

    #[test]
    fn test_author_excluded() {
        let doc = Document::new("text").with_metadata(
            Metadata::default()
                .with_author("Secret Person")
                .with_inclusion(true, false, true),
        );
        let html = render(&doc);
        assert!(!html.contains("Secret Person"));
        assert!(!html.contains("name=\"author\""));
    }

    #[test]
    fn test_export_html_filename() {
        let doc = Document::new("x").with_metadata(Metadata::default().with_title("My Report!!"));
        let result = export_html(&doc).unwrap();
        assert_eq!(result.filename, "my-report.html");
        assert_eq!(result.mime_type, "text/html;charset=utf-8");
        assert!(result.as_text().unwrap().contains("<body>"));
    }
}
