//! Assembled content consumed by the export targets.

use serde::{Deserialize, Serialize};

use super::document::format_date;

/// Export target kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExportTarget {
    /// Paginated PDF
    Portable,
    /// Standalone HTML
    Markup,
    /// Markdown with front matter
    Markdown,
}

impl ExportTarget {
    /// File extension, without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportTarget::Portable => "pdf",
            ExportTarget::Markup => "html",
            ExportTarget::Markdown => "md",
        }
    }

    /// MIME type of the produced file.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportTarget::Portable => "application/pdf",
            ExportTarget::Markup => "text/html;charset=utf-8",
            ExportTarget::Markdown => "text/markdown;charset=utf-8",
        }
    }

    /// Check if the body of this target is rendered HTML.
    pub fn is_html(&self) -> bool {
        matches!(self, ExportTarget::Portable | ExportTarget::Markup)
    }
}

impl std::fmt::Display for ExportTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ExportTarget::Portable => "PDF",
            ExportTarget::Markup => "HTML",
            ExportTarget::Markdown => "Markdown",
        };
        f.write_str(name)
    }
}

/// One entry of the metadata byline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetaField {
    /// Trimmed author name
    Author(String),
    /// Trimmed date, as typed
    Date(String),
}

impl MetaField {
    /// Label shown before the value.
    pub fn label(&self) -> &'static str {
        match self {
            MetaField::Author(_) => "Author",
            MetaField::Date(_) => "Date",
        }
    }

    /// Field value.
    pub fn value(&self) -> &str {
        match self {
            MetaField::Author(v) | MetaField::Date(v) => v,
        }
    }

    /// Value as shown to readers; `YYYY-MM-DD` dates become `Month D, YYYY`.
    pub fn display_value(&self) -> String {
        match self {
            MetaField::Author(v) => v.clone(),
            MetaField::Date(v) => format_date(v),
        }
    }
}

/// Title block and byline preceding the body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataHeader {
    /// Included title
    pub title: Option<String>,

    /// Included author and date, in that order
    pub byline: Vec<MetaField>,
}

impl MetadataHeader {
    /// Check if the header carries nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.byline.is_empty()
    }

    /// Serialize the header as an HTML block.
    ///
    /// Every HTML target embeds exactly this snippet.
    pub fn to_html(&self) -> String {
        let mut html = String::from("<header class=\"document-header\">");
        if let Some(ref title) = self.title {
            html.push_str("<h1>");
            html.push_str(&escape_html(title));
            html.push_str("</h1>");
        }
        if !self.byline.is_empty() {
            html.push_str("<div class=\"document-meta\">");
            for field in &self.byline {
                html.push_str("<span><strong>");
                html.push_str(field.label());
                html.push_str(":</strong> ");
                html.push_str(&escape_html(&field.display_value()));
                html.push_str("</span>");
            }
            html.push_str("</div>");
        }
        html.push_str("</header>");
        html
    }

    /// Serialize the header as YAML front matter.
    ///
    /// Keys appear in the order title, author, date, and the block ends
    /// with a blank line.
    pub fn to_front_matter(&self) -> String {
        let mut lines = vec!["---".to_string()];
        if let Some(ref title) = self.title {
            lines.push(format!("title: \"{}\"", escape_yaml(title)));
        }
        for field in &self.byline {
            match field {
                MetaField::Author(author) => {
                    lines.push(format!("author: \"{}\"", escape_yaml(author)))
                }
                MetaField::Date(date) => lines.push(format!("date: {}", date)),
            }
        }
        lines.push("---".to_string());
        lines.push(String::new());
        lines.push(String::new());
        lines.join("\n")
    }
}

/// Body of the assembled content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentBody {
    /// No body (blank markdown)
    #[default]
    Empty,
    /// Rendered HTML fragment
    Html(String),
    /// Raw markdown text
    Markdown(String),
}

impl ContentBody {
    /// Check if there is no body.
    pub fn is_empty(&self) -> bool {
        matches!(self, ContentBody::Empty)
    }
}

/// Flat content tree: optional header followed by the body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTree {
    /// Metadata header, absent when no field is included
    pub header: Option<MetadataHeader>,

    /// Document body
    pub body: ContentBody,
}

impl ContentTree {
    /// Check if the tree has neither header nor body.
    pub fn is_empty(&self) -> bool {
        self.header.is_none() && self.body.is_empty()
    }

    /// Serialize header and body as one HTML fragment.
    ///
    /// A markdown body is emitted as escaped preformatted text.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        if let Some(ref header) = self.header {
            html.push_str(&header.to_html());
            html.push('\n');
        }
        match &self.body {
            ContentBody::Empty => {}
            ContentBody::Html(body) => html.push_str(body),
            ContentBody::Markdown(text) => {
                html.push_str("<pre>");
                html.push_str(&escape_html(text));
                html.push_str("</pre>");
            }
        }
        html
    }
}

/// Escape special characters for YAML strings.
fn escape_yaml(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Escape text for safe insertion into HTML.
pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_extensions() {
        assert_eq!(ExportTarget::Portable.extension(), "pdf");
        assert_eq!(ExportTarget::Markup.extension(), "html");
        assert_eq!(ExportTarget::Markdown.extension(), "md");
        assert!(ExportTarget::Markup.is_html());
        assert!(!ExportTarget::Markdown.is_html());
    }

    #[test]
    fn test_header_html() {
        let header = MetadataHeader {
            title: Some("Q&A".to_string()),
            byline: vec![
                MetaField::Author("Ada <ada@example.com>".to_string()),
                MetaField::Date("2024-03-05".to_string()),
            ],
        };
        assert_eq!(
            header.to_html(),
            "<header class=\"document-header\"><h1>Q&amp;A</h1>\
             <div class=\"document-meta\"><span><strong>Author:</strong> Ada &lt;ada@example.com&gt;</span>\
             <span><strong>Date:</strong> March 5, 2024</span></div></header>"
        );
    }

    #[test]
    fn test_header_front_matter() {
        let header = MetadataHeader {
            title: Some("Test \"Doc\"".to_string()),
            byline: vec![
                MetaField::Author("John Doe".to_string()),
                MetaField::Date("2024-01-02".to_string()),
            ],
        };
        assert_eq!(
            header.to_front_matter(),
            "---\ntitle: \"Test \\\"Doc\\\"\"\nauthor: \"John Doe\"\ndate: 2024-01-02\n---\n\n"
        );
    }

    #[test]
    fn test_display_value_keeps_free_text() {
        assert_eq!(MetaField::Date("next tuesday".to_string()).display_value(), "next tuesday");
        assert_eq!(MetaField::Date("2024-03-05".to_string()).display_value(), "March 5, 2024");
    }

    #[test]
    fn test_header_without_byline() {
        let header = MetadataHeader {
            title: Some("Only".to_string()),
            byline: Vec::new(),
        };
        assert!(!header.to_html().contains("document-meta"));
    }

    #[test]
    fn test_tree_html() {
        let tree = ContentTree {
            header: None,
            body: ContentBody::Html("<p>x</p>".to_string()),
        };
        assert_eq!(tree.to_html(), "<p>x</p>");
        assert!(ContentTree::default().is_empty());
    }
}
