//! Stylesheets embedded in exported documents.

use crate::layout::StyleSheet;

/// Generator name written into exported HTML.
pub const GENERATOR: &str = "MarkDown Designer";

/// Style applied to the off-screen PDF layout container.
pub const PDF_CSS: &str = r#".pdf-content {
    font-family: 'Inter', -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
    font-size: 11pt;
    line-height: 1.7;
    color: #1a1a1a;
    background: #ffffff;
}
.pdf-content * { box-sizing: border-box; }
.pdf-content h1, .pdf-content h2, .pdf-content h3,
.pdf-content h4, .pdf-content h5, .pdf-content h6 {
    color: #000000;
    font-weight: 700;
    line-height: 1.4;
    margin-top: 1em;
    margin-bottom: 0.5em;
}
.pdf-content h1:first-child { margin-top: 0; }
.pdf-content h1 { font-size: 20pt; border-bottom: 2px solid #e5e5e5; padding-bottom: 0.3em; }
.pdf-content h2 { font-size: 16pt; }
.pdf-content h3 { font-size: 13pt; }
.pdf-content h4 { font-size: 11pt; }
.pdf-content h5 { font-size: 10pt; }
.pdf-content h6 { font-size: 9pt; color: #666; }
.pdf-content p { margin: 0 0 0.8em 0; overflow-wrap: break-word; }
.pdf-content a { color: #2563eb; text-decoration: none; }
.pdf-content ul, .pdf-content ol { margin: 0 0 0.8em 0; padding-left: 1.5em; }
.pdf-content li { margin-bottom: 0.3em; line-height: 1.6; }
.pdf-content .contains-task-list { list-style: none; padding-left: 0; }
.pdf-content blockquote {
    margin: 0.8em 0;
    padding: 0.6em 1em;
    border-left: 3px solid #6b7280;
    background: #f9fafb;
    font-style: italic;
    color: #4b5563;
}
.pdf-content code {
    font-family: 'JetBrains Mono', 'Fira Code', Consolas, monospace;
    font-size: 0.85em;
    padding: 0.1em 0.3em;
    background: #f1f5f9;
    border-radius: 3px;
}
.pdf-content pre {
    margin: 0.8em 0;
    padding: 0.8em;
    background: #1e293b;
    color: #e2e8f0;
    border-radius: 4px;
    white-space: pre-wrap;
    word-break: break-word;
}
.pdf-content pre code { background: transparent; padding: 0; color: inherit; font-size: 9pt; line-height: 1.5; }
.pdf-content table { width: 100%; margin: 0.8em 0; border-collapse: collapse; font-size: 9pt; }
.pdf-content th, .pdf-content td { padding: 0.4em 0.6em; text-align: left; border: 1px solid #d1d5db; }
.pdf-content th { background: #f3f4f6; font-weight: 600; }
.pdf-content tr:nth-child(even) { background: #f9fafb; }
.pdf-content hr { margin: 1em 0; border: none; height: 1px; background: #e5e7eb; }
.pdf-content img { max-width: 100%; height: auto; margin: 0.5em 0; }
.pdf-content .document-header { margin-bottom: 1.2em; padding-bottom: 0.8em; border-bottom: 2px solid #e5e5e5; }
.pdf-content .document-header h1 { font-size: 22pt; margin: 0 0 0.3em 0; padding: 0; border: none; }
.pdf-content .document-meta { font-size: 9pt; color: #666; }
.pdf-content .document-meta span { margin-right: 1.5em; }
"#;

/// Style embedded in standalone HTML exports.
pub const HTML_CSS: &str = r#"*, *::before, *::after { box-sizing: border-box; margin: 0; padding: 0; }

html {
    font-size: 16px;
    -webkit-font-smoothing: antialiased;
}

body {
    font-family: 'Inter', -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
    font-size: 1rem;
    line-height: 1.7;
    color: #1a1a1a;
    background: #ffffff;
    max-width: 800px;
    margin: 0 auto;
    padding: 3rem 2rem;
}

h1, h2, h3, h4, h5, h6 {
    color: #0f172a;
    font-weight: 700;
    line-height: 1.3;
    margin-top: 1.5em;
    margin-bottom: 0.75em;
}

h1 { font-size: 2.25rem; border-bottom: 2px solid #e2e8f0; padding-bottom: 0.5em; }
h2 { font-size: 1.875rem; }
h3 { font-size: 1.5rem; }
h4 { font-size: 1.25rem; }
h5 { font-size: 1.125rem; }
h6 { font-size: 1rem; color: #64748b; }

h1:first-child, h2:first-child, h3:first-child { margin-top: 0; }

p { margin-bottom: 1.25em; }

a { color: #2563eb; text-decoration: none; }
a:hover { text-decoration: underline; }

ul, ol { margin-bottom: 1.25em; padding-left: 1.5em; }
li { margin-bottom: 0.5em; }

.contains-task-list { list-style: none; padding-left: 0; }
.task-list-item input { margin-top: 0.3em; accent-color: #10b981; }

blockquote {
    margin: 1.5em 0;
    padding: 1rem 1.25rem;
    border-left: 4px solid #64748b;
    background: #f8fafc;
    border-radius: 0 8px 8px 0;
    font-style: italic;
    color: #475569;
}

code {
    font-family: 'JetBrains Mono', 'Fira Code', Consolas, monospace;
    font-size: 0.9em;
    padding: 0.15em 0.4em;
    background: #f1f5f9;
    border-radius: 4px;
}

pre {
    margin: 1.5em 0;
    padding: 1.25rem;
    background: #1e293b;
    color: #e2e8f0;
    border-radius: 8px;
    overflow-x: auto;
}

pre code { background: transparent; padding: 0; color: inherit; }

table { width: 100%; margin: 1.5em 0; border-collapse: collapse; }
th, td { padding: 0.75rem 1rem; text-align: left; border: 1px solid #e2e8f0; }
th { background: #f8fafc; font-weight: 600; }
tr:nth-child(even) { background: #f8fafc; }

hr { margin: 2em 0; border: none; height: 2px; background: #e2e8f0; }

img { max-width: 100%; height: auto; border-radius: 8px; margin: 1em 0; }

.document-header {
    margin-bottom: 2rem;
    padding-bottom: 1.5rem;
    border-bottom: 2px solid #e2e8f0;
}

.document-header h1 { margin: 0 0 0.5rem 0; padding: 0; border: none; }

.document-meta { font-size: 0.875rem; color: #64748b; }
.document-meta span { margin-right: 1.5rem; }

@media print {
    body { max-width: none; padding: 1cm; }
    pre { white-space: pre-wrap; word-wrap: break-word; }
    h1, h2, h3, h4 { page-break-after: avoid; }
    pre, blockquote, table { page-break-inside: avoid; }
}
"#;

/// Style sheet for PDF layout: 11pt base font, 1.7 line height.
pub fn pdf_stylesheet() -> StyleSheet {
    StyleSheet::new(PDF_CSS)
        .with_font_size(11.0)
        .with_line_height(1.7)
}
