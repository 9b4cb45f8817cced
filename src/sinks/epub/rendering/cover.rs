//! Cover page rendering for EPUB.
//!
//! The cover is the first section of the book and shows nothing but the
//! title. The title is inserted as given, without escaping.

/// Render the cover page body fragment.
pub fn render(title: &str) -> String {
    format!(
        "<div class=\"cover-page\">\n\t<h1 class=\"cover-title\">{}</h1>\n</div>",
        title
    )
}
