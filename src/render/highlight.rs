//! Syntax highlighting for fenced code blocks.

use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::error::{Error, Result};
use crate::model::escape_html;

/// Highlights code for inclusion in rendered HTML.
pub trait Highlighter: Send + Sync {
    /// Highlight `code`, using `language` as a hint.
    ///
    /// Implementations fall back to automatic detection when the hint is
    /// absent or unsupported. The result is an HTML fragment meant to sit
    /// inside `<pre><code>`.
    fn highlight(&self, code: &str, language: Option<&str>) -> Result<String>;

    /// Check if the language hint is supported.
    fn supports(&self, language: &str) -> bool {
        let _ = language;
        false
    }
}

/// Highlighter that only escapes the code.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainHighlighter;

impl Highlighter for PlainHighlighter {
    fn highlight(&self, code: &str, _language: Option<&str>) -> Result<String> {
        Ok(escape_html(code))
    }
}

/// Class-based highlighter backed by syntect's bundled grammars.
///
/// Emits `<span class="...">` markup so the page stylesheet decides colors.
pub struct SyntectHighlighter {
    syntaxes: SyntaxSet,
}

impl SyntectHighlighter {
    /// Create a highlighter with the default grammar set.
    pub fn new() -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
        }
    }

    fn find_syntax(&self, language: &str) -> Option<&SyntaxReference> {
        self.syntaxes.find_syntax_by_token(language.trim())
    }

    fn detect_syntax(&self, code: &str) -> &SyntaxReference {
        code.lines()
            .next()
            .and_then(|first| self.syntaxes.find_syntax_by_first_line(first))
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text())
    }

    fn highlight_with(&self, code: &str, syntax: &SyntaxReference) -> Result<String> {
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntaxes, ClassStyle::Spaced);
        for line in LinesWithEndings::from(code) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .map_err(|e| Error::Highlight(e.to_string()))?;
        }
        Ok(generator.finalize())
    }
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter for SyntectHighlighter {
    fn highlight(&self, code: &str, language: Option<&str>) -> Result<String> {
        if let Some(syntax) = language.and_then(|lang| self.find_syntax(lang)) {
            match self.highlight_with(code, syntax) {
                Ok(html) => return Ok(html),
                Err(e) => log::warn!("Highlight error for {}: {}", syntax.name, e),
            }
        }
        self.highlight_with(code, self.detect_syntax(code))
    }

    fn supports(&self, language: &str) -> bool {
        self.find_syntax(language).is_some()
    }
}
