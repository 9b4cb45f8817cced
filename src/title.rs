//! Book title resolution.
//!
//! The first of these that applies wins: an explicit title, the first
//! level-one `# ` heading in the markdown source, the input filename with its
//! final extension removed.

use std::path::Path;

/// Where a resolved title came from, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleSource {
    Explicit,
    Heading,
    Filename,
}

/// Pick the book title.
pub fn resolve(explicit: Option<&str>, markdown: &str, input: &Path) -> (String, TitleSource) {
    if let Some(title) = explicit.filter(|t| !t.is_empty()) {
        return (title.to_string(), TitleSource::Explicit);
    }
    if let Some(title) = extract_from_markdown(markdown).filter(|t| !t.is_empty()) {
        return (title.to_string(), TitleSource::Heading);
    }
    (filename_stem(input), TitleSource::Filename)
}

/// Return the text of the first line starting with `# ` once surrounding
/// whitespace is trimmed. `#Title` and underlined headings do not count.
pub fn extract_from_markdown(markdown: &str) -> Option<&str> {
    markdown
        .split('\n')
        .map(str::trim)
        .find_map(|line| line.strip_prefix("# "))
        .map(str::trim)
}

/// The file name with everything from its last `.` removed.
fn filename_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    match name.rfind('.') {
        Some(dot) => name[..dot].to_string(),
        None => name,
    }
}
