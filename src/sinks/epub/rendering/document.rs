//! XHTML content document wrapper.
//!
//! EPUB 3 content documents must be complete, well-formed XHTML. Every
//! section of the book is a body fragment wrapped here with the book's
//! language and a link to the shared stylesheet.

/// Wrap a body fragment in an XHTML content document.
pub fn wrap(title: &str, language: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops" xml:lang="{lang}" lang="{lang}">
<head>
    <meta charset="UTF-8"/>
    <title>{title}</title>
    <link rel="stylesheet" type="text/css" href="stylesheet.css"/>
</head>
<body>
{body}
</body>
</html>"#,
        lang = html_escape::encode_double_quoted_attribute(language),
        title = html_escape::encode_text(title),
        body = body,
    )
}
