//! Editor session state and its persistence.
//!
//! The session is an explicit [`AppState`] value that is loaded from and
//! saved to a [`Store`]. Content and metadata are saved periodically by an
//! [`Autosaver`]; theme and sidebar changes are saved as they happen.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{Document, Metadata};
use crate::store::Store;

/// Key holding the markdown buffer as a [`ContentBlob`].
pub const CONTENT_KEY: &str = "md-designer-content";

/// Key holding the [`Metadata`] JSON.
pub const METADATA_KEY: &str = "md-designer-metadata";

/// Key holding the theme name.
pub const THEME_KEY: &str = "md-designer-theme";

/// Key holding `open` or `closed`.
pub const SIDEBAR_KEY: &str = "md-designer-sidebar";

/// Default autosave period.
pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_millis(2000);

/// Persisted form of the markdown buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlob {
    /// Markdown text
    #[serde(default)]
    pub content: String,

    /// Save time in milliseconds since the Unix epoch
    #[serde(default)]
    pub timestamp: i64,
}

impl ContentBlob {
    /// Wrap `content` with the current time.
    pub fn now(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Visual theme of the editor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Clean light theme
    #[default]
    Minimalist,
    /// Neon dark theme
    Cyberpunk,
    /// Grid-based typographic theme
    Swiss,
}

impl Theme {
    /// Every theme, in display order.
    pub const ALL: [Theme; 3] = [Theme::Minimalist, Theme::Cyberpunk, Theme::Swiss];

    /// Stored name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Minimalist => "minimalist",
            Theme::Cyberpunk => "cyberpunk",
            Theme::Swiss => "swiss",
        }
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Theme::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::InvalidTheme(s.to_string()))
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the settings sidebar is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SidebarState {
    /// Shown
    #[default]
    Open,
    /// Collapsed
    Closed,
}

impl SidebarState {
    /// Stored name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SidebarState::Open => "open",
            SidebarState::Closed => "closed",
        }
    }

    /// Parse a stored value; anything but `closed` means open.
    pub fn from_stored(value: &str) -> Self {
        if value == "closed" {
            SidebarState::Closed
        } else {
            SidebarState::Open
        }
    }

    /// The opposite state.
    pub fn toggled(self) -> Self {
        match self {
            SidebarState::Open => SidebarState::Closed,
            SidebarState::Closed => SidebarState::Open,
        }
    }
}

/// Session settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Period between automatic saves of content and metadata
    pub autosave_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            autosave_interval: DEFAULT_AUTOSAVE_INTERVAL,
        }
    }
}

impl SessionConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the autosave interval.
    pub fn with_autosave_interval(mut self, interval: Duration) -> Self {
        self.autosave_interval = interval;
        self
    }
}

/// Everything the editor persists between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    /// Document being edited
    pub document: Document,

    /// Active theme
    pub theme: Theme,

    /// Sidebar visibility
    pub sidebar: SidebarState,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            document: Document::welcome(),
            theme: Theme::default(),
            sidebar: SidebarState::default(),
        }
    }
}

impl AppState {
    /// Load the session from `store`.
    ///
    /// Missing content yields the welcome document and missing metadata
    /// dates the document today. Malformed values are logged and replaced
    /// by defaults; only store failures are errors.
    pub fn load<S: Store + ?Sized>(store: &S) -> Result<Self> {
        let markdown = load_markdown(store)?;
        let metadata = load_metadata(store)?;
        let theme = load_theme(store)?.unwrap_or_default();
        let sidebar = store
            .get(SIDEBAR_KEY)?
            .map(|v| SidebarState::from_stored(&v))
            .unwrap_or_default();

        Ok(Self {
            document: Document { markdown, metadata },
            theme,
            sidebar,
        })
    }

    /// Save every key.
    pub fn save<S: Store + ?Sized>(&self, store: &mut S) -> Result<()> {
        self.save_document(store)?;
        store.set(THEME_KEY, self.theme.as_str())?;
        store.set(SIDEBAR_KEY, self.sidebar.as_str())
    }

    /// Save the markdown buffer and metadata.
    pub fn save_document<S: Store + ?Sized>(&self, store: &mut S) -> Result<()> {
        let blob = ContentBlob::now(self.document.markdown.clone());
        store.set(CONTENT_KEY, &serde_json::to_string(&blob)?)?;
        store.set(METADATA_KEY, &serde_json::to_string(&self.document.metadata)?)
    }

    /// Switch theme and persist the choice.
    pub fn set_theme<S: Store + ?Sized>(&mut self, theme: Theme, store: &mut S) -> Result<()> {
        self.theme = theme;
        store.set(THEME_KEY, theme.as_str())
    }

    /// Show or hide the sidebar and persist the choice.
    pub fn set_sidebar<S: Store + ?Sized>(
        &mut self,
        sidebar: SidebarState,
        store: &mut S,
    ) -> Result<()> {
        self.sidebar = sidebar;
        store.set(SIDEBAR_KEY, sidebar.as_str())
    }
}

fn load_markdown<S: Store + ?Sized>(store: &S) -> Result<String> {
    let Some(raw) = store.get(CONTENT_KEY)? else {
        return Ok(Document::welcome().markdown);
    };
    match serde_json::from_str::<ContentBlob>(&raw) {
        Ok(blob) => Ok(blob.content),
        Err(e) => {
            log::warn!("Stored content is not a content blob, using it as text: {}", e);
            Ok(raw)
        }
    }
}

fn load_metadata<S: Store + ?Sized>(store: &S) -> Result<Metadata> {
    let Some(raw) = store.get(METADATA_KEY)? else {
        return Ok(Metadata::today());
    };
    match serde_json::from_str::<Metadata>(&raw) {
        Ok(metadata) => Ok(metadata),
        Err(e) => {
            log::warn!("Error loading metadata: {}", e);
            Ok(Metadata::default())
        }
    }
}

fn load_theme<S: Store + ?Sized>(store: &S) -> Result<Option<Theme>> {
    let Some(raw) = store.get(THEME_KEY)? else {
        return Ok(None);
    };
    match raw.parse::<Theme>() {
        Ok(theme) => Ok(Some(theme)),
        Err(e) => {
            log::warn!("Ignoring stored theme: {}", e);
            Ok(None)
        }
    }
}

/// Saves content and metadata once per interval.
#[derive(Debug, Clone)]
pub struct Autosaver {
    interval: Duration,
    last_save: Instant,
}

impl Autosaver {
    /// Start the timer at `now`; the first save is due one interval later.
    pub fn start(config: &SessionConfig, now: Instant) -> Self {
        Self {
            interval: config.autosave_interval,
            last_save: now,
        }
    }

    /// Check if a save is due at `now`.
    pub fn is_due(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_save) >= self.interval
    }

    /// Save `state` if an interval has elapsed. Returns whether it saved.
    pub fn tick<S: Store + ?Sized>(
        &mut self,
        now: Instant,
        state: &AppState,
        store: &mut S,
    ) -> Result<bool> {
        if !self.is_due(now) {
            return Ok(false);
        }
        state.save_document(store)?;
        self.last_save = now;
        log::debug!("Autosaved {} chars", state.document.markdown.len());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_empty_store_defaults() {
        let state = AppState::load(&MemoryStore::new()).unwrap();
        assert!(state.document.markdown.starts_with("# Welcome"));
        assert_eq!(state.document.metadata.date.len(), 10);
        assert_eq!(state.theme, Theme::Minimalist);
        assert_eq!(state.sidebar, SidebarState::Open);
    }

    #[test]
    fn test_round_trip() {
        let mut store = MemoryStore::new();
        let state = AppState {
            document: Document::new("# Saved\n").with_metadata(
                Metadata::default()
                    .with_title("T")
                    .with_inclusion(true, false, true),
            ),
            theme: Theme::Swiss,
            sidebar: SidebarState::Closed,
        };
        state.save(&mut store).unwrap();
        assert_eq!(AppState::load(&store).unwrap(), state);
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("swiss"));
        assert_eq!(store.get(SIDEBAR_KEY).unwrap().as_deref(), Some("closed"));
    }

    #[test]
    fn test_metadata_wire_format() {
        let mut store = MemoryStore::new();
        let state = AppState {
            document: Document::new("x").with_metadata(Metadata::default().with_author("Ada")),
            ..AppState::default()
        };
        state.save_document(&mut store).unwrap();
        let raw = store.get(METADATA_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["author"], "Ada");
        assert_eq!(value["includeAuthor"], true);

        let blob: serde_json::Value =
            serde_json::from_str(&store.get(CONTENT_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(blob["content"], "x");
        assert!(blob["timestamp"].as_i64().unwrap() > 0);
    }

    #[test]
    fn test_corrupt_content_used_as_text() {
        let mut store = MemoryStore::new();
        store.set(CONTENT_KEY, "plain # text {").unwrap();
        let state = AppState::load(&store).unwrap();
        assert_eq!(state.document.markdown, "plain # text {");
    }

    #[test]
    fn test_partial_metadata_flags_default_true() {
        let mut store = MemoryStore::new();
        store
            .set(METADATA_KEY, r#"{"title":"Old","includeDate":false}"#)
            .unwrap();
        let meta = AppState::load(&store).unwrap().document.metadata;
        assert_eq!(meta.title, "Old");
        assert!(meta.include_title);
        assert!(meta.include_author);
        assert!(!meta.include_date);
        assert_eq!(meta.date, "");
    }

    #[test]
    fn test_invalid_theme_ignored() {
        let mut store = MemoryStore::new();
        store.set(THEME_KEY, "neon").unwrap();
        assert_eq!(AppState::load(&store).unwrap().theme, Theme::Minimalist);
        assert!(matches!("neon".parse::<Theme>(), Err(Error::InvalidTheme(_))));
        assert_eq!("cyberpunk".parse::<Theme>().unwrap(), Theme::Cyberpunk);
    }

    #[test]
    fn test_sidebar_values() {
        assert_eq!(SidebarState::from_stored("closed"), SidebarState::Closed);
        assert_eq!(SidebarState::from_stored("open"), SidebarState::Open);
        assert_eq!(SidebarState::from_stored("weird"), SidebarState::Open);
        assert_eq!(SidebarState::Open.toggled(), SidebarState::Closed);
    }

    #[test]
    fn test_setters_persist() {
        let mut store = MemoryStore::new();
        let mut state = AppState::default();
        state.set_theme(Theme::Cyberpunk, &mut store).unwrap();
        state.set_sidebar(SidebarState::Closed, &mut store).unwrap();
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("cyberpunk"));
        assert_eq!(store.get(SIDEBAR_KEY).unwrap().as_deref(), Some("closed"));
        assert!(!store.contains(CONTENT_KEY).unwrap());
    }

    #[test]
    fn test_autosaver_interval() {
        let mut store = MemoryStore::new();
        let state = AppState::default();
        let start = Instant::now();
        let mut saver = Autosaver::start(&SessionConfig::default(), start);

        assert!(!saver.tick(start + Duration::from_millis(1999), &state, &mut store).unwrap());
        assert!(store.is_empty());
        assert!(saver.tick(start + Duration::from_millis(2000), &state, &mut store).unwrap());
        assert!(store.contains(CONTENT_KEY).unwrap());
        assert!(store.contains(METADATA_KEY).unwrap());
        assert!(!store.contains(THEME_KEY).unwrap());
        assert!(!saver.tick(start + Duration::from_millis(3000), &state, &mut store).unwrap());
        assert!(saver.tick(start + Duration::from_millis(4000), &state, &mut store).unwrap());
    }
}
