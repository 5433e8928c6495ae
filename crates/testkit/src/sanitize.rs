//! Pre-parse cleanup of server-rendered pages
//!
//! The pages are HTML that is close to, but not quite, well-formed XML. The
//! rewrites here remove the pieces a strict XML parser rejects without
//! changing the element structure.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::PlaceholderHit;

static DOCTYPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<!DOCTYPE [^>]*>").unwrap());
static HTML_OPEN_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<html[^>]*>").unwrap());

/// Every line containing `sentinel`, with trailing whitespace stripped.
pub fn find_placeholders(content: &str, sentinel: &str) -> Vec<PlaceholderHit> {
    if sentinel.is_empty() || !content.contains(sentinel) {
        return Vec::new();
    }

    content
        .split('\n')
        .enumerate()
        .filter(|(_, line)| line.contains(sentinel))
        .map(|(index, line)| PlaceholderHit {
            index,
            line: line.trim_end().to_string(),
        })
        .collect()
}

/// Drop DOCTYPE declarations, strip attributes from `<html>` and turn
/// `&nbsp;` into plain spaces.
pub fn sanitize(content: &str) -> String {
    let without_doctype = DOCTYPE.replace_all(content, "");
    let bare_html = HTML_OPEN_TAG.replace_all(&without_doctype, "<html>");
    bare_html.replace("&nbsp;", " ")
}
