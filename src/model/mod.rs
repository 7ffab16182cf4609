//! Document model types.
//!
//! This module defines the in-memory source of truth (the markdown buffer
//! and its metadata), the assembled content tree that every export target
//! consumes, and the physical page geometry used by the layout engine.

mod content;
mod document;
mod geometry;

pub use content::{ContentBody, ContentTree, ExportTarget, MetaField, MetadataHeader};
pub use document::{split_front_matter, Document, DocumentStats, FrontMatter, Metadata};
pub use geometry::{mm_to_px, px_to_mm, PageGeometry, MM_PER_INCH, PX_PER_INCH, PX_PER_MM};

pub(crate) use content::escape_html;
pub(crate) use geometry::PT_PER_MM;
