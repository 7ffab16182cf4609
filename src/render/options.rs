//! Rendering options and configuration.

/// Options for converting markdown to HTML.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// GitHub-flavored extensions (tables, task lists, strikethrough, autolinks)
    pub gfm: bool,

    /// Treat single newlines as hard line breaks
    pub hard_breaks: bool,

    /// Emit `id` attributes on headings
    pub heading_ids: bool,

    /// Pass raw HTML in the markdown through to the output
    pub raw_html: bool,

    /// Highlight fenced code blocks
    pub highlight_code: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable GFM extensions.
    pub fn with_gfm(mut self, gfm: bool) -> Self {
        self.gfm = gfm;
        self
    }

    /// Enable or disable hard line breaks.
    pub fn with_hard_breaks(mut self, hard_breaks: bool) -> Self {
        self.hard_breaks = hard_breaks;
        self
    }

    /// Enable or disable heading ids.
    pub fn with_heading_ids(mut self, heading_ids: bool) -> Self {
        self.heading_ids = heading_ids;
        self
    }

    /// Enable or disable raw HTML passthrough.
    pub fn with_raw_html(mut self, raw_html: bool) -> Self {
        self.raw_html = raw_html;
        self
    }

    /// Enable or disable code highlighting.
    pub fn with_highlighting(mut self, highlight: bool) -> Self {
        self.highlight_code = highlight;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            gfm: true,
            hard_breaks: true,
            heading_ids: true,
            raw_html: true,
            highlight_code: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_builder() {
        let options = RenderOptions::new()
            .with_gfm(false)
            .with_hard_breaks(false)
            .with_highlighting(false);

        assert!(!options.gfm);
        assert!(!options.hard_breaks);
        assert!(!options.highlight_code);
        assert!(options.heading_ids);
    }

    #[test]
    fn test_default_options() {
        let options = RenderOptions::default();
        assert!(options.gfm);
        assert!(options.hard_breaks);
        assert!(options.raw_html);
    }
}
