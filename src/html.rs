//! Pattern helpers for rendered view HTML.
//!
//! Rendered views are HTML (often not well-formed XML), so post-processing
//! works on the text with pre-compiled patterns instead of a tree.

use quick_xml::escape::unescape_with;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

static RE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid html tag regex"));

/// `name="value"` or `name='value'` inside an opening tag.
static RE_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)([\w:.-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid attribute regex")
});

/// Value of attribute `name` in the attribute text of an opening tag.
/// Names compare ASCII case-insensitively, values are entity-decoded.
pub fn attribute(attrs: &str, name: &str) -> Option<String> {
    RE_ATTRIBUTE
        .captures_iter(attrs)
        .find(|caps| caps[1].eq_ignore_ascii_case(name))
        .and_then(|caps| caps.get(2).or_else(|| caps.get(3)))
        .map(|value| decode_entities(value.as_str()).into_owned())
}

/// Remove every tag, keeping text.
pub fn strip_tags(html: &str) -> Cow<'_, str> {
    RE_TAG.replace_all(html, "")
}

/// Decode XML character references plus the HTML entities XSLT processors
/// emit in `html` output mode. Unknown entities leave the text as it was.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    unescape_with(text, html_entity).unwrap_or(Cow::Borrowed(text))
}

fn html_entity(name: &str) -> Option<&'static str> {
    match name {
        "nbsp" => Some("\u{a0}"),
        "amp" => Some("&"),
        "lt" => Some("<"),
        "gt" => Some(">"),
        "quot" => Some("\""),
        "apos" => Some("'"),
        "copy" => Some("\u{a9}"),
        "reg" => Some("\u{ae}"),
        "hellip" => Some("\u{2026}"),
        "ndash" => Some("\u{2013}"),
        "mdash" => Some("\u{2014}"),
        _ => None,
    }
}
