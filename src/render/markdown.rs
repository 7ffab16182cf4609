//! Markdown to HTML conversion.

use comrak::nodes::{NodeHtmlBlock, NodeValue};
use comrak::{format_html, parse_document, Arena, Options};

use crate::error::{Error, Result};
use crate::model::escape_html;

use super::{Highlighter, RenderOptions};

/// Converts markdown text to an HTML fragment.
pub trait MarkdownRenderer: Send + Sync {
    /// Render `markdown`, passing fenced code through `highlighter`.
    fn render(&self, markdown: &str, highlighter: &dyn Highlighter) -> Result<String>;
}

/// Markdown renderer backed by comrak.
#[derive(Debug, Clone, Default)]
pub struct ComrakRenderer {
    options: RenderOptions,
}

impl ComrakRenderer {
    /// Create a renderer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a renderer with the given options.
    pub fn with_options(options: RenderOptions) -> Self {
        Self { options }
    }

    fn comrak_options(&self) -> Options {
        let mut options = Options::default();
        if self.options.gfm {
            options.extension.table = true;
            options.extension.tasklist = true;
            options.extension.strikethrough = true;
            options.extension.autolink = true;
        }
        if self.options.heading_ids {
            options.extension.header_ids = Some(String::new());
        }
        options.render.hardbreaks = self.options.hard_breaks;
        // Highlighted code is spliced in as raw HTML blocks, which comrak
        // only emits verbatim in unsafe mode.
        options.render.unsafe_ = self.options.raw_html || self.options.highlight_code;
        options
    }
}

impl MarkdownRenderer for ComrakRenderer {
    fn render(&self, markdown: &str, highlighter: &dyn Highlighter) -> Result<String> {
        let arena = Arena::new();
        let options = self.comrak_options();
        let root = parse_document(&arena, markdown, &options);

        if self.options.highlight_code {
            for node in root.descendants() {
                let mut data = node.data.borrow_mut();
                let replacement = match &data.value {
                    NodeValue::CodeBlock(block) => Some(html_block(code_block_html(
                        &block.info,
                        &block.literal,
                        highlighter,
                    ))),
                    NodeValue::HtmlBlock(block) if !self.options.raw_html => {
                        Some(html_block(escape_html(&block.literal)))
                    }
                    NodeValue::HtmlInline(raw) if !self.options.raw_html => {
                        Some(NodeValue::Text(raw.clone()))
                    }
                    _ => None,
                };
                if let Some(value) = replacement {
                    data.value = value;
                }
            }
        }

        let mut output = Vec::new();
        format_html(root, &options, &mut output)
            .map_err(|e| Error::Render(format!("HTML formatting error: {}", e)))?;
        String::from_utf8(output).map_err(|e| Error::Render(e.to_string()))
    }
}

fn html_block(literal: String) -> NodeValue {
    NodeValue::HtmlBlock(NodeHtmlBlock {
        block_type: 0,
        literal,
    })
}

/// Build the `<pre><code>` block for a fenced code block.
///
/// A failing highlighter degrades to escaped plain code.
fn code_block_html(info: &str, code: &str, highlighter: &dyn Highlighter) -> String {
    let language = info.split_whitespace().next().filter(|l| !l.is_empty());
    let highlighted = highlighter.highlight(code, language).unwrap_or_else(|e| {
        log::warn!("Highlighting failed, emitting plain code: {}", e);
        escape_html(code)
    });

    match language {
        Some(lang) => format!(
            "<pre><code class=\"hljs language-{}\">{}</code></pre>\n",
            escape_html(lang),
            highlighted
        ),
        None => format!("<pre><code class=\"hljs\">{}</code></pre>\n", highlighted),
    }
}
