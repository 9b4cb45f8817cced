//! EPUB generation for converted markdown documents.
//!
//! This module packages a converted document into an EPUB 3 book with:
//! - Title, language, generator and (optional) author metadata
//! - The bundled stylesheet, extended with an `@font-face` rule when a font
//!   is configured for the book's language
//! - A cover page showing the title
//! - The converted document as a single content section

mod config;
mod fonts;
mod rendering;
mod styles;

pub use config::{FontConfig, MetadataConfig, RenderStats, EPUB};
