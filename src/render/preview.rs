//! Live preview rendering.

use crate::model::Document;

use super::MarkdownPipeline;

/// Placeholder shown while the document is empty.
pub const EMPTY_PREVIEW_HTML: &str =
    "<div class=\"preview-placeholder\"><p>Your rendered markdown will appear here</p></div>";

/// Placeholder shown when the markdown converter fails.
pub const ERROR_PREVIEW_HTML: &str =
    "<p class=\"preview-error\" style=\"color: var(--error);\">Error parsing markdown</p>";

/// Outcome of rendering the preview pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    /// The document is blank; the renderer was not invoked.
    Empty,
    /// Rendered HTML fragment.
    Rendered(String),
    /// The renderer failed with this message.
    Failed(String),
}

impl Preview {
    /// Render the preview for a document.
    ///
    /// Render errors are reported as [`Preview::Failed`] rather than
    /// propagated, so the editing session stays usable.
    pub fn of(doc: &Document, pipeline: &MarkdownPipeline) -> Self {
        if doc.is_blank() {
            return Preview::Empty;
        }
        match pipeline.render(&doc.markdown) {
            Ok(html) => Preview::Rendered(html),
            Err(e) => {
                log::error!("Markdown parsing error: {}", e);
                Preview::Failed(e.to_string())
            }
        }
    }

    /// Check if the preview is the empty placeholder.
    pub fn is_empty(&self) -> bool {
        matches!(self, Preview::Empty)
    }

    /// HTML to display in the preview pane.
    pub fn to_html(&self) -> &str {
        match self {
            Preview::Empty => EMPTY_PREVIEW_HTML,
            Preview::Rendered(html) => html,
            Preview::Failed(_) => ERROR_PREVIEW_HTML,
        }
    }
}
