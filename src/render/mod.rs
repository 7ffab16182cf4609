//! Markdown rendering: conversion to HTML, code highlighting, and preview.

mod highlight;
mod markdown;
mod options;
mod preview;

pub use highlight::{Highlighter, PlainHighlighter, SyntectHighlighter};
pub use markdown::{ComrakRenderer, MarkdownRenderer};
pub use options::RenderOptions;
pub use preview::{Preview, EMPTY_PREVIEW_HTML, ERROR_PREVIEW_HTML};

use crate::error::Result;

/// A markdown renderer paired with the highlighter it calls for code.
pub struct MarkdownPipeline {
    renderer: Box<dyn MarkdownRenderer>,
    highlighter: Box<dyn Highlighter>,
}

impl MarkdownPipeline {
    /// Pair a renderer with a highlighter.
    pub fn new(
        renderer: impl MarkdownRenderer + 'static,
        highlighter: impl Highlighter + 'static,
    ) -> Self {
        Self {
            renderer: Box::new(renderer),
            highlighter: Box::new(highlighter),
        }
    }

    /// comrak with the given options and syntect highlighting.
    pub fn with_options(options: RenderOptions) -> Self {
        Self::new(ComrakRenderer::with_options(options), SyntectHighlighter::new())
    }

    /// comrak without syntax highlighting.
    pub fn plain() -> Self {
        Self::new(
            ComrakRenderer::with_options(RenderOptions::new().with_highlighting(false)),
            PlainHighlighter,
        )
    }

    /// Render markdown to an HTML fragment.
    pub fn render(&self, markdown: &str) -> Result<String> {
        self.renderer.render(markdown, self.highlighter.as_ref())
    }
}

impl Default for MarkdownPipeline {
    fn default() -> Self {
        Self::with_options(RenderOptions::default())
    }
}

impl std::fmt::Debug for MarkdownPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkdownPipeline").finish_non_exhaustive()
    }
}
