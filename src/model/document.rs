//! Document-level types.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Markdown shown when nothing has been persisted yet.
pub(crate) const WELCOME_MARKDOWN: &str = r#"# Welcome to MarkDown Designer

A client-side markdown editor with **real-time preview** and designer themes.

## Features

- **Three Designer Themes**: Minimalist Light, Cyberpunk Dark, Swiss Design
- **Real-time Preview**: See your markdown rendered instantly
- **Auto-save**: Your work is saved automatically
- **Export Options**: PDF, HTML, and Markdown downloads

## Getting Started

Start typing in the editor, and watch your markdown come to life!

### Code Highlighting

```javascript
function greet(name) {
    console.log(`Hello, ${name}!`);
    return true;
}
```

### Tables

| Feature | Status |
|---------|--------|
| Markdown Parsing | Complete |
| Syntax Highlighting | Complete |
| PDF Export | Complete |
| HTML Export | Complete |

### Task Lists

- [x] Create beautiful UI
- [x] Implement three themes
- [x] Add export functionality
- [ ] Write more markdown!

---

> "The best way to predict the future is to invent it." (Alan Kay)

Enjoy writing!
"#;

/// The document being edited: a markdown buffer plus its metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Raw markdown text, exactly as typed
    pub markdown: String,

    /// Title, author, date and their inclusion flags
    pub metadata: Metadata,
}

impl Document {
    /// Create a document from markdown with default metadata.
    pub fn new(markdown: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
            metadata: Metadata::default(),
        }
    }

    /// The document shown on first launch.
    pub fn welcome() -> Self {
        Self {
            markdown: WELCOME_MARKDOWN.to_string(),
            metadata: Metadata::today(),
        }
    }

    /// Build a document from markdown that may start with front matter.
    ///
    /// Recognised front matter keys populate the metadata; the rest of the
    /// text becomes the markdown buffer unchanged.
    pub fn from_markdown_source(source: &str) -> Self {
        let (front, body) = split_front_matter(source);
        let mut metadata = Metadata::default();
        if let Some(front) = front {
            metadata.title = front.title.unwrap_or_default();
            metadata.author = front.author.unwrap_or_default();
            metadata.date = front.date.unwrap_or_default();
        }
        Self {
            markdown: body.to_string(),
            metadata,
        }
    }

    /// Set the metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Check if the markdown is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.markdown.trim().is_empty()
    }

    /// Character and word counts of the markdown buffer.
    pub fn stats(&self) -> DocumentStats {
        DocumentStats::of(&self.markdown)
    }
}

/// Character and word counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStats {
    /// Number of characters, whitespace included
    pub chars: usize,

    /// Number of whitespace-separated words
    pub words: usize,
}

impl DocumentStats {
    /// Count characters and words in text.
    pub fn of(text: &str) -> Self {
        Self {
            chars: text.chars().count(),
            words: text.split_whitespace().count(),
        }
    }
}

impl std::fmt::Display for DocumentStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} chars · {} words", self.chars, self.words)
    }
}

/// Document metadata with independent inclusion flags.
///
/// Field values are stored untrimmed, the way they were typed. A field is
/// *included* in exports only when its flag is set and the trimmed value is
/// non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Document title
    #[serde(default)]
    pub title: String,

    /// Document author
    #[serde(default)]
    pub author: String,

    /// Document date, normally `YYYY-MM-DD`
    #[serde(default)]
    pub date: String,

    /// Include the title in exports
    #[serde(default = "default_true")]
    pub include_title: bool,

    /// Include the author in exports
    #[serde(default = "default_true")]
    pub include_author: bool,

    /// Include the date in exports
    #[serde(default = "default_true")]
    pub include_date: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            title: String::new(),
            author: String::new(),
            date: String::new(),
            include_title: true,
            include_author: true,
            include_date: true,
        }
    }
}

impl Metadata {
    /// Default metadata with the date set to today.
    pub fn today() -> Self {
        Self {
            date: Local::now().date_naive().format("%Y-%m-%d").to_string(),
            ..Default::default()
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Set the date.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    /// Set all three inclusion flags.
    pub fn with_inclusion(mut self, title: bool, author: bool, date: bool) -> Self {
        self.include_title = title;
        self.include_author = author;
        self.include_date = date;
        self
    }

    /// The title, if it is included in exports.
    pub fn included_title(&self) -> Option<&str> {
        included(self.include_title, &self.title)
    }

    /// The author, if it is included in exports.
    pub fn included_author(&self) -> Option<&str> {
        included(self.include_author, &self.author)
    }

    /// The date, if it is included in exports.
    pub fn included_date(&self) -> Option<&str> {
        included(self.include_date, &self.date)
    }

    /// Check if any field is included in exports.
    pub fn has_included_fields(&self) -> bool {
        self.included_title().is_some()
            || self.included_author().is_some()
            || self.included_date().is_some()
    }

    /// The included date formatted for display, e.g. `March 5, 2024`.
    ///
    /// Values that are not `YYYY-MM-DD` are returned as typed (trimmed).
    pub fn display_date(&self) -> Option<String> {
        self.included_date().map(format_date)
    }
}

/// Format a `YYYY-MM-DD` date as `Month D, YYYY`; other text is returned
/// unchanged.
pub(crate) fn format_date(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|_| date.to_string())
}

fn included(flag: bool, value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (flag && !trimmed.is_empty()).then_some(trimmed)
}

fn unescape_yaml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Fields recognised in a front matter block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    /// `title` key
    pub title: Option<String>,
    /// `author` key
    pub author: Option<String>,
    /// `date` key
    pub date: Option<String>,
}

/// Split leading front matter from markdown.
///
/// A block opens with a `---` line at the very start of the text and closes
/// at the next `---` line. One blank line after the closing fence belongs to
/// the block. Every line in between must be a `title`, `author` or `date`
/// entry; anything else (other keys, prose under a thematic break) means the
/// block belongs to the document and the text is returned untouched.
pub fn split_front_matter(source: &str) -> (Option<FrontMatter>, &str) {
    let Some(rest) = source.strip_prefix("---\n") else {
        return (None, source);
    };

    let mut front = FrontMatter::default();
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        offset += line.len();
        let trimmed = line.trim_end_matches('\n');
        if trimmed == "---" {
            if front == FrontMatter::default() {
                break;
            }
            let body = &rest[offset..];
            let body = body.strip_prefix('\n').unwrap_or(body);
            return (Some(front), body);
        }

        let Some((key, value)) = trimmed.split_once(':') else {
            break;
        };
        let value = value.trim();
        let value = match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
            Some(quoted) => unescape_yaml(quoted),
            None => value.to_string(),
        };
        let slot = match key {
            "title" => &mut front.title,
            "author" => &mut front.author,
            "date" => &mut front.date,
            other => {
                log::debug!("Keeping front matter with unknown key {:?} in the body", other);
                break;
            }
        };
        if slot.replace(value).is_some() {
            break;
        }
    }

    (None, source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_blank() {
        assert!(Document::new("").is_blank());
        assert!(Document::new("  \n\t ").is_blank());
        assert!(!Document::new("# Hi").is_blank());
    }

    #[test]
    fn test_welcome_document() {
        let doc = Document::welcome();
        assert!(doc.markdown.starts_with("# Welcome"));
        assert_eq!(doc.metadata.date.len(), 10);
    }

    #[test]
    fn test_stats() {
        let stats = Document::new("Hello, world! This is a test.").stats();
        assert_eq!(stats.words, 6);
        assert_eq!(stats.chars, 29);
        assert_eq!(stats.to_string(), "29 chars · 6 words");
        assert_eq!(Document::new("   ").stats().words, 0);
    }

    #[test]
    fn test_included_fields_trim() {
        let meta = Metadata::default()
            .with_title("  Report  ")
            .with_author("   ")
            .with_date("2024-03-05");
        assert_eq!(meta.included_title(), Some("Report"));
        assert_eq!(meta.included_author(), None);
        assert_eq!(meta.included_date(), Some("2024-03-05"));
    }

    #[test]
    fn test_inclusion_flags() {
        let meta = Metadata::default()
            .with_title("Report")
            .with_author("Ada")
            .with_inclusion(true, false, true);
        assert_eq!(meta.included_author(), None);
        assert!(meta.has_included_fields());

        let hidden = meta.with_inclusion(false, false, false);
        assert!(!hidden.has_included_fields());
    }

    #[test]
    fn test_display_date() {
        let meta = Metadata::default().with_date("2024-03-05");
        assert_eq!(meta.display_date().as_deref(), Some("March 5, 2024"));

        let meta = Metadata::default().with_date("next tuesday");
        assert_eq!(meta.display_date().as_deref(), Some("next tuesday"));
    }

    #[test]
    fn test_split_front_matter() {
        let source = "---\ntitle: \"A \\\"B\\\"\"\nauthor: Ada\ndate: 2024-01-02\n---\n\n# Body\n";
        let (front, body) = split_front_matter(source);
        let front = front.unwrap();
        assert_eq!(front.title.as_deref(), Some("A \"B\""));
        assert_eq!(front.author.as_deref(), Some("Ada"));
        assert_eq!(front.date.as_deref(), Some("2024-01-02"));
        assert_eq!(body, "# Body\n");
    }

    #[test]
    fn test_split_front_matter_absent_or_unclosed() {
        let (front, body) = split_front_matter("# Title\n---\n");
        assert!(front.is_none());
        assert_eq!(body, "# Title\n---\n");

        let (front, body) = split_front_matter("---\ntitle: x\nno close");
        assert!(front.is_none());
        assert_eq!(body, "---\ntitle: x\nno close");
    }

    #[test]
    fn test_thematic_break_is_not_front_matter() {
        let source = "---\nIntro\n---\n\nText\n";
        let (front, body) = split_front_matter(source);
        assert!(front.is_none());
        assert_eq!(body, source);

        let (front, _) = split_front_matter("---\n\n---\nText");
        assert!(front.is_none());
    }

    #[test]
    fn test_unknown_keys_stay_in_body() {
        let source = "---\nlayout: post\ntitle: \"Hi\"\ntags: rust\n---\n\n# Body\n";
        let doc = Document::from_markdown_source(source);
        assert_eq!(doc.markdown, source);
        assert_eq!(doc.metadata.title, "");
    }

    #[test]
    fn test_duplicate_key_is_not_front_matter() {
        let source = "---\ntitle: a\ntitle: b\n---\nText";
        assert!(split_front_matter(source).0.is_none());
    }

    #[test]
    fn test_from_markdown_source() {
        let doc = Document::from_markdown_source("---\ntitle: \"Notes\"\n---\n\nText");
        assert_eq!(doc.metadata.title, "Notes");
        assert_eq!(doc.metadata.author, "");
        assert_eq!(doc.markdown, "Text");
    }

    #[test]
    fn test_metadata_serde_defaults() {
        let meta: Metadata = serde_json::from_str(r#"{"title":"T"}"#).unwrap();
        assert_eq!(meta.title, "T");
        assert!(meta.include_title && meta.include_author && meta.include_date);

        let json = serde_json::to_string(&Metadata::default()).unwrap();
        assert!(json.contains("\"includeAuthor\":true"));
    }
}
