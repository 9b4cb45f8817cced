//! Markdown to XHTML conversion.
//!
//! Parses with `pulldown-cmark` (tables, strikethrough, task lists and
//! footnotes enabled) and rewrites the event stream before rendering:
//!
//! - soft line breaks become hard breaks, so single newlines show up as `<br />`
//! - bare URLs and e-mail addresses become links
//! - raw HTML is replaced by a comment, keeping the output well-formed XHTML
//! - every heading gets an `id` derived from its text
//!
//! The HTML renderer self-closes void elements and escapes text and attribute
//! values, which is what EPUB content documents need.

use anyhow::{Context, Result};
use pulldown_cmark::{
    html, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd, TextMergeStream,
};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Placeholder emitted instead of raw HTML.
const RAW_HTML_OMITTED: &str = "<!-- raw HTML omitted -->";

/// Check raw markdown bytes are text. This is the only way conversion can fail.
pub fn decode(content: &[u8]) -> Result<&str> {
    std::str::from_utf8(content).with_context(|| "Markdown is not valid UTF-8")
}

/// Convert markdown into an XHTML fragment.
pub fn to_xhtml(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);

    let events = TextMergeStream::new(Parser::new_ext(markdown, options));
    let mut events = rewrite_events(events);
    assign_heading_ids(&mut events);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    log::debug!(
        "Converted {} bytes of markdown into {} bytes of XHTML",
        markdown.len(),
        out.len()
    );
    out
}

/// Apply hard wraps, autolinking and raw HTML omission.
fn rewrite_events<'a>(events: impl Iterator<Item = Event<'a>>) -> Vec<Event<'a>> {
    let mut out = Vec::new();
    // links, images and code blocks never get autolinked
    let mut no_link_depth = 0usize;
    let mut in_html_block = false;
    let mut html_block_emitted = false;

    for event in events {
        match event {
            Event::SoftBreak => out.push(Event::HardBreak),

            Event::Start(Tag::HtmlBlock) => {
                in_html_block = true;
                html_block_emitted = false;
                out.push(Event::Start(Tag::HtmlBlock));
            }
            Event::End(TagEnd::HtmlBlock) => {
                in_html_block = false;
                out.push(Event::End(TagEnd::HtmlBlock));
            }
            Event::Html(_) => {
                // one placeholder per block, however many lines it spans
                if !in_html_block || !html_block_emitted {
                    out.push(Event::Html(CowStr::from(format!("{RAW_HTML_OMITTED}\n"))));
                    html_block_emitted = true;
                }
            }
            Event::InlineHtml(_) => out.push(Event::InlineHtml(CowStr::from(RAW_HTML_OMITTED))),

            Event::Start(tag @ (Tag::Link { .. } | Tag::Image { .. } | Tag::CodeBlock(_))) => {
                no_link_depth += 1;
                out.push(Event::Start(tag));
            }
            Event::End(tag @ (TagEnd::Link | TagEnd::Image | TagEnd::CodeBlock)) => {
                no_link_depth = no_link_depth.saturating_sub(1);
                out.push(Event::End(tag));
            }

            Event::Text(text) if no_link_depth == 0 => autolink(text, &mut out),

            other => out.push(other),
        }
    }

    out
}

// Scheme prefixes and e-mail addresses are ASCII only. A Unicode
// case-insensitive match would also accept letters such as U+212A KELVIN SIGN
// for `k`.
// The pattern is a constant, so a failure here is a bug caught by any test
// that converts text.
static AUTOLINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?i-u:https?://|www\.)[^\s<]+|[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)+",
    )
    .expect("autolink regex is valid")
});

/// Split a text event around bare URLs and e-mail addresses, turning each into
/// a link.
fn autolink<'a>(text: CowStr<'a>, out: &mut Vec<Event<'a>>) {
    let mut last = 0;
    let mut linked = false;

    for found in AUTOLINK.find_iter(&text) {
        let candidate = trim_link_end(found.as_str());
        let start = found.start();
        let end = start + candidate.len();

        let (dest, link_type) = if candidate.contains("://") {
            (candidate.to_string(), LinkType::Autolink)
        } else if candidate
            .get(..4)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("www."))
        {
            (format!("http://{candidate}"), LinkType::Autolink)
        } else if candidate.contains('@') && !candidate.ends_with(['-', '_']) {
            // the renderer adds the `mailto:` scheme for e-mail links
            (candidate.to_string(), LinkType::Email)
        } else {
            continue;
        };

        if start > last {
            out.push(Event::Text(CowStr::from(text[last..start].to_string())));
        }
        out.push(Event::Start(Tag::Link {
            link_type,
            dest_url: CowStr::from(dest),
            title: CowStr::Borrowed(""),
            id: CowStr::Borrowed(""),
        }));
        out.push(Event::Text(CowStr::from(candidate.to_string())));
        out.push(Event::End(TagEnd::Link));
        last = end;
        linked = true;
    }

    if !linked {
        out.push(Event::Text(text));
    } else if last < text.len() {
        out.push(Event::Text(CowStr::from(text[last..].to_string())));
    }
}

/// Drop trailing punctuation that belongs to the sentence, not the link, and
/// closing parentheses that have no opening partner inside the link.
fn trim_link_end(candidate: &str) -> &str {
    let mut s = candidate;
    loop {
        let Some(last) = s.chars().last() else {
            return s;
        };
        if matches!(last, '.' | ',' | ':' | ';' | '!' | '?' | '\'' | '"' | '*' | '_' | '~') {
            s = &s[..s.len() - last.len_utf8()];
        } else if last == ')' && s.matches(')').count() > s.matches('(').count() {
            s = &s[..s.len() - 1];
        } else {
            return s;
        }
    }
}

/// Give every heading an `id` generated from its text, unique within the
/// document.
fn assign_heading_ids(events: &mut [Event<'_>]) {
    let mut used = HashSet::new();
    let mut i = 0;
    while i < events.len() {
        if !matches!(events[i], Event::Start(Tag::Heading { .. })) {
            i += 1;
            continue;
        }

        let mut text = String::new();
        let mut j = i + 1;
        while j < events.len() {
            match &events[j] {
                Event::End(TagEnd::Heading(_)) => break,
                Event::Text(t) | Event::Code(t) => text.push_str(t),
                _ => {}
            }
            j += 1;
        }

        let generated = unique_id(heading_id(&text), &mut used);
        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            *id = Some(CowStr::from(generated));
        }
        i = j;
    }
}

/// Derive an anchor from heading text.
fn heading_id(text: &str) -> String {
    let id: String = text
        .trim()
        .chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() {
                Some(c.to_ascii_lowercase())
            } else if c.is_ascii_whitespace() || c == '-' || c == '_' {
                Some('-')
            } else {
                None
            }
        })
        .collect();

    if id.is_empty() {
        "heading".to_string()
    } else {
        id
    }
}

fn unique_id(id: String, used: &mut HashSet<String>) -> String {
    if used.insert(id.clone()) {
        return id;
    }
    let mut n = 1;
    loop {
        let candidate = format!("{id}-{n}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::events::Event as XmlEvent;
    use quick_xml::Reader;

    fn convert(markdown: &str) -> String {
        to_xhtml(markdown)
    }

    /// Parse the fragment as XML and check every element is closed.
    fn assert_well_formed(fragment: &str) {
        let wrapped = format!("<root>{fragment}</root>");
        let mut reader = Reader::from_str(&wrapped);
        let mut depth = 0i32;
        loop {
            match reader.read_event() {
                Ok(XmlEvent::Start(_)) => depth += 1,
                Ok(XmlEvent::End(_)) => depth -= 1,
                Ok(XmlEvent::Eof) => break,
                Ok(_) => {}
                Err(e) => panic!("not well-formed XHTML ({e}):\n{fragment}"),
            }
            assert!(depth >= 0, "unbalanced end tag:\n{fragment}");
        }
        assert_eq!(depth, 0, "unclosed element:\n{fragment}");
    }

    #[test]
    fn can_convert_tables_and_strikethrough() {
        let html = convert(
            "| Name | Qty |\n| ---- | --- |\n| Tea  | 2   |\n\nThis is ~~gone~~ now.\n",
        );
        assert!(html.contains("<table>"));
        assert!(html.contains("<th>Name</th>"));
        assert!(html.contains("<td>Tea</td>"));
        assert!(html.contains("<del>gone</del>"));
        assert_well_formed(&html);
    }

    #[test]
    fn can_render_soft_breaks_as_hard_breaks() {
        let html = convert("first line\nsecond line\n");
        assert_eq!(html, "<p>first line<br />\nsecond line</p>\n");
        assert_well_formed(&html);
    }

    #[test]
    fn can_self_close_void_elements() {
        let html = convert("a\n\n---\n\n![alt text](cover.png)\n\n- [x] done\n");
        assert!(html.contains("<hr />"));
        assert!(html.contains(r#"<img src="cover.png" alt="alt text" />"#));
        assert_well_formed(&html);
    }

    #[test]
    fn can_escape_text_and_attributes() {
        let html = convert("Fish & chips < 5 \"quid\"\n\n[x](http://a.b/?q=1&r=2)\n");
        assert!(html.contains("Fish &amp; chips &lt; 5"));
        assert!(html.contains(r#"href="http://a.b/?q=1&amp;r=2""#));
        assert_well_formed(&html);
    }

    #[test]
    fn can_generate_heading_ids() {
        let html = convert("# My Book\n\n## Part `one`: The_Start!\n\n## 日本語\n");
        assert!(html.contains(r#"<h1 id="my-book">My Book</h1>"#));
        assert!(html.contains(r#"<h2 id="part-one-the-start">"#));
        assert!(html.contains(r#"<h2 id="heading">日本語</h2>"#));
    }

    #[test]
    fn can_deduplicate_heading_ids() {
        let html = convert("# Notes\n\n# Notes\n\n# Notes-1\n\n# Notes\n");
        assert!(html.contains(r#"<h1 id="notes">"#));
        assert!(html.contains(r#"<h1 id="notes-1">Notes</h1>"#));
        assert!(html.contains(r#"<h1 id="notes-1-1">Notes-1</h1>"#));
        assert!(html.contains(r#"<h1 id="notes-2">"#));
    }

    #[test]
    fn can_autolink_urls_and_emails() {
        let html = convert(
            "Visit https://example.com/docs, or www.example.org.\nMail me@example.com!\n",
        );
        assert!(html.contains(
            r#"<a href="https://example.com/docs">https://example.com/docs</a>, or "#
        ));
        assert!(html.contains(r#"<a href="http://www.example.org">www.example.org</a>."#));
        assert!(html.contains(r#"<a href="mailto:me@example.com">me@example.com</a>!"#));
        assert_well_formed(&html);
    }

    #[test]
    fn can_balance_parentheses_in_autolinks() {
        let html = convert("(see https://en.wikipedia.org/wiki/Rust_(language))\n");
        assert!(html.contains(
            r#"<a href="https://en.wikipedia.org/wiki/Rust_(language)">https://en.wikipedia.org/wiki/Rust_(language)</a>)"#
        ));
    }

    #[test]
    fn can_skip_autolinks_in_links_and_code() {
        let html = convert(
            "[https://a.example](https://b.example)\n\n`https://c.example`\n\n```\nhttps://d.example\n```\n",
        );
        assert_eq!(html.matches("<a ").count(), 1);
        assert!(html.contains("<code>https://c.example</code>"));
        assert!(html.contains("https://d.example\n</code></pre>"));
    }

    #[test]
    fn can_omit_raw_html() {
        let html = convert("<div>\n<b>unclosed\n</div>\n\ninline <span>tag</span> here\n");
        assert!(!html.contains("<div>"));
        assert!(!html.contains("<b>"));
        assert!(!html.contains("<span>"));
        assert_eq!(html.matches("<!-- raw HTML omitted -->\n").count(), 1);
        assert!(html.contains("inline <!-- raw HTML omitted -->tag<!-- raw HTML omitted --> here"));
        assert_well_formed(&html);
    }

    #[test]
    fn can_render_footnotes_well_formed() {
        let html = convert("Text[^1].\n\n[^1]: The note.\n");
        assert!(html.contains("footnote-definition"));
        assert_well_formed(&html);
    }

    #[test]
    fn can_leave_case_folded_letters_unlinked() {
        let html = convert("contact ab\u{212A}@example.com today\n");
        assert_eq!(html, "<p>contact ab\u{212A}@example.com today</p>\n");

        let html = convert("see http\u{17F}://example.com or \u{212A}ww.example.org\n");
        assert!(!html.contains("<a "));
        assert_well_formed(&html);
    }

    #[test]
    fn can_autolink_upper_case_schemes() {
        let html = convert("HTTPS://EXAMPLE.COM and WWW.EXAMPLE.ORG\n");
        assert!(html.contains(r#"<a href="HTTPS://EXAMPLE.COM">HTTPS://EXAMPLE.COM</a>"#));
        assert!(html.contains(r#"<a href="http://WWW.EXAMPLE.ORG">WWW.EXAMPLE.ORG</a>"#));
    }

    #[test]
    fn can_decode_utf8_text() {
        assert_eq!(decode("# Héllo\n".as_bytes()).expect("text is UTF-8"), "# Héllo\n");
    }

    #[test]
    fn rejects_invalid_utf8() {
        let err = decode(&[0x23, 0x20, 0xff, 0xfe]).expect_err("invalid UTF-8 is rejected");
        assert!(err.to_string().contains("not valid UTF-8"));
    }
}
