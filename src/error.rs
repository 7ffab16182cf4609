//! Error types for mdesigner.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for mdesigner operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while rendering, laying out, or exporting.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON (de)serialization error for persisted blobs.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The markdown converter failed.
    #[error("Markdown rendering error: {0}")]
    Render(String),

    /// Code highlighting failed.
    #[error("Highlighting error: {0}")]
    Highlight(String),

    /// The content block cannot be laid out on the page geometry.
    #[error("Layout error: {0}")]
    Layout(String),

    /// Rasterizing a page slice failed.
    #[error("Rasterization error: {0}")]
    Raster(String),

    /// Encoding a bitmap to a compressed image failed.
    #[error("Image encoding error: {0}")]
    Encode(String),

    /// Writing the PDF document failed.
    #[error("PDF writing error: {0}")]
    Pdf(String),

    /// Asynchronous resources did not settle in time.
    #[error("Resources did not settle within {0:?}")]
    SettleTimeout(Duration),

    /// Key-value store failure.
    #[error("Store error: {0}")]
    Store(String),

    /// Unknown theme name.
    #[error("Unknown theme: {0}")]
    InvalidTheme(String),

    /// A font file could not be read or parsed.
    #[error("Font error: {0}")]
    Font(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::Pdf(err.to_string()),
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Encode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::SettleTimeout(Duration::from_millis(500));
        assert_eq!(err.to_string(), "Resources did not settle within 500ms");

        let err = Error::InvalidTheme("neon".to_string());
        assert_eq!(err.to_string(), "Unknown theme: neon");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
