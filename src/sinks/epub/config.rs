//! EPUB output configuration.
//!
//! `MetadataConfig` and `FontConfig` are read from `md2epub.toml`; `EPUB` is
//! the fully resolved set of options for one book and is built per run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::fonts;

/// EPUB document metadata defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Author used when none is given on the command line.
    /// Empty string for none.
    pub author: String,
    /// Language code (BCP 47 format, e.g., "en", "en-GB", "ja").
    pub language: String,
    /// Value of the generator metadata field.
    pub generator: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            author: String::new(),
            language: "en".to_string(),
            generator: "md2epub".to_string(),
        }
    }
}

impl MetadataConfig {
    /// Returns the author, if configured.
    pub fn author_opt(&self) -> Option<&str> {
        if self.author.is_empty() {
            None
        } else {
            Some(&self.author)
        }
    }

    /// Returns the language, if configured.
    pub fn language_opt(&self) -> Option<&str> {
        if self.language.is_empty() {
            None
        } else {
            Some(&self.language)
        }
    }
}

/// A font to embed when the book is written in a given language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontConfig {
    /// Primary language subtag the font applies to (e.g., "ja", "zh").
    pub language: String,
    /// Path to a TTF, OTF, WOFF or WOFF2 file.
    pub path: PathBuf,
}

/// EPUB output options for a single book.
#[derive(Debug, Clone)]
#[allow(clippy::upper_case_acronyms)]
pub struct EPUB {
    /// Output EPUB file path
    pub outfile: PathBuf,
    /// Language code written to the metadata and every content document
    pub language: String,
    /// Optional author metadata
    pub author: Option<String>,
    /// Generator metadata
    pub generator: String,
    /// Font to embed, if one matches the language
    pub font: Option<FontConfig>,
    /// Directory the stylesheet is staged in while the book is assembled
    pub staging_dir: PathBuf,
}

impl EPUB {
    /// Build the output options, picking the first configured font whose
    /// language matches `language`.
    pub fn new(
        outfile: PathBuf,
        language: String,
        author: Option<String>,
        metadata: &MetadataConfig,
        fonts: &[FontConfig],
    ) -> EPUB {
        let font = fonts::select(fonts, &language).cloned();
        EPUB {
            outfile,
            language,
            author,
            generator: metadata.generator.clone(),
            font,
            staging_dir: std::env::temp_dir(),
        }
    }

    /// Stage the stylesheet in `dir` instead of the system temp directory.
    pub fn with_staging_dir<P: Into<PathBuf>>(mut self, dir: P) -> EPUB {
        self.staging_dir = dir.into();
        self
    }
}

/// Statistics from rendering an EPUB, used for user feedback.
#[derive(Debug)]
pub struct RenderStats {
    /// Number of documents/chapters in the EPUB
    pub document_count: usize,
    /// Family name of the embedded font, if any
    pub font_family: Option<String>,
}
