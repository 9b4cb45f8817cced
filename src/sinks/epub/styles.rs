//! Stylesheet generation and staging for EPUB output.
//!
//! The bundled stylesheet is compiled into the binary. When a font is embedded
//! an `@font-face` rule for it is appended and the body font switched over.
//!
//! Before it is added to the book the stylesheet is staged as a uniquely named
//! `epub-style-*.css` file. The staged file lives exactly as long as the
//! returned handle, so it is removed however assembly ends.

use super::fonts::EmbeddedFont;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// The default stylesheet shipped with the binary.
pub const DEFAULT_STYLESHEET: &str = include_str!("../../../assets/style.css");

/// Filename prefix of staged stylesheets.
pub const STAGED_PREFIX: &str = "epub-style-";

/// Generate the complete CSS stylesheet for the EPUB.
pub fn generate_stylesheet(font: Option<&EmbeddedFont>) -> String {
    let mut css = String::with_capacity(DEFAULT_STYLESHEET.len() + 256);
    css.push_str(DEFAULT_STYLESHEET);

    if let Some(font) = font {
        // quotes would terminate the family string early
        let family = font.family.replace(['"', '\\'], "");
        css.push_str(&format!(
            r#"
/* Embedded font */
@font-face {{
    font-family: "{family}";
    src: url("{href}");
}}

body {{
    font-family: "{family}", serif;
}}
"#,
            family = family,
            href = font.href,
        ));
    }

    css
}

/// Write the stylesheet to a fresh temporary file in `dir`.
///
/// The file is deleted when the returned handle is dropped.
pub fn stage_stylesheet(css: &str, dir: &Path) -> Result<NamedTempFile> {
    let mut staged = tempfile::Builder::new()
        .prefix(STAGED_PREFIX)
        .suffix(".css")
        .tempfile_in(dir)
        .with_context(|| format!("Failed to create temp CSS file in {}", dir.display()))?;
    staged
        .write_all(css.as_bytes())
        .and_then(|_| staged.flush())
        .with_context(|| format!("Failed to write CSS to {}", staged.path().display()))?;
    Ok(staged)
}
