use super::config::FontConfig;
use anyhow::{anyhow, bail, Context, Result};
use owned_ttf_parser::{name_id, Face};
use std::path::Path;

/// A font file ready to be added to the book as a resource.
pub struct EmbeddedFont {
    /// Family name used in the `@font-face` rule.
    pub family: String,
    /// Path of the resource inside the book, relative to the stylesheet.
    pub href: String,
    pub mime: &'static str,
    pub data: Vec<u8>,
}

impl EmbeddedFont {
    /// Read a font file from disk.
    ///
    /// TrueType and OpenType files are parsed to check they are usable and to
    /// take the family name from the font's name table. WOFF files are embedded
    /// as-is. Either way the file stem is the fallback family name.
    pub fn load(path: &Path) -> Result<EmbeddedFont> {
        let file_name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .ok_or_else(|| anyhow!("Font path has no file name: {}", path.display()))?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        let mime = match extension.as_str() {
            "ttf" => "font/ttf",
            "otf" => "font/otf",
            "woff" => "font/woff",
            "woff2" => "font/woff2",
            _ => bail!("Unsupported font format: {}", path.display()),
        };

        let data = std::fs::read(path)
            .with_context(|| format!("Failed to read font file: {}", path.display()))?;

        let family = match extension.as_str() {
            "ttf" | "otf" => {
                let face = Face::parse(&data, 0).map_err(|e| {
                    anyhow!("Failed to parse font file {}: {e}", path.display())
                })?;
                family_name(&face)
            }
            _ => None,
        };
        let family = family.unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| file_name.clone())
        });

        log::debug!("Loaded font `{family}` from {}", path.display());
        Ok(EmbeddedFont {
            family,
            href: format!("fonts/{file_name}"),
            mime,
            data,
        })
    }
}

fn family_name(face: &Face) -> Option<String> {
    face.names()
        .into_iter()
        .filter(|name| name.name_id == name_id::FAMILY && name.is_unicode())
        .find_map(|name| name.to_string())
}

/// Pick the font configured for a language, comparing primary subtags only,
/// so `ja-JP` and `ja` both select a font configured for `ja`.
pub fn select<'a>(fonts: &'a [FontConfig], language: &str) -> Option<&'a FontConfig> {
    let wanted = primary_subtag(language);
    if wanted.is_empty() {
        return None;
    }
    fonts
        .iter()
        .find(|font| primary_subtag(&font.language) == wanted)
}

fn primary_subtag(language: &str) -> String {
    language
        .trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}
