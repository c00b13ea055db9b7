//! HTML references: URL attributes, `srcset`, meta refresh, and inline CSS.
//!
//! Matching is textual so the untouched parts of a page stay byte-identical;
//! archived markup is too often broken for a round trip through a DOM.

use regex::bytes::{Captures, Regex};
use std::sync::LazyLock;

use super::css::{as_text, quoted_value, rewrite_css};
use super::target::PageRewriter;

static URL_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i-u)(\s(?:href|src|poster|action|data-src|data-href|data-url)\s*=\s*)(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#,
    )
    .expect("url attribute pattern")
});

static SRCSET_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i-u)(\s(?:srcset|data-srcset)\s*=\s*)(?:"([^"]*)"|'([^']*)')"#).expect("srcset pattern")
});

static META_REFRESH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i-u)(<meta\b[^>]*?\scontent\s*=\s*["']\s*\d*\s*[;,]\s*url\s*=\s*['"]?)([^"'>\s]+)"#)
        .expect("meta refresh pattern")
});

/// Rewrite every mapped reference in an HTML document.
///
/// Works on raw bytes, so any ASCII-compatible charset is fine.
pub fn rewrite_html(page: &mut PageRewriter<'_>, text: &[u8]) -> Vec<u8> {
    let text = URL_ATTR.replace_all(text, |caps: &Captures<'_>| {
        let (quote, value) = quoted_value(caps);
        match as_text(value).and_then(|v| page.target(&unescape_amp(v))) {
            Some(new) => [&caps[1], quote, new.as_bytes(), quote].concat(),
            None => caps[0].to_vec(),
        }
    });
    let text = SRCSET_ATTR.replace_all(&text, |caps: &Captures<'_>| {
        let (quote, value) = quoted_value(caps);
        match as_text(value).and_then(|v| rewrite_srcset(page, v)) {
            Some(new) => [&caps[1], quote, new.as_bytes(), quote].concat(),
            None => caps[0].to_vec(),
        }
    });
    let text = META_REFRESH.replace_all(&text, |caps: &Captures<'_>| {
        match as_text(&caps[2]).and_then(|v| page.target(&unescape_amp(v))) {
            Some(new) => [&caps[1], new.as_bytes()].concat(),
            None => caps[0].to_vec(),
        }
    });
    // style attributes and <style> blocks
    rewrite_css(page, &text)
}

/// Rewrite the URL of each `url [descriptor]` candidate; None if none changed.
fn rewrite_srcset(page: &mut PageRewriter<'_>, value: &str) -> Option<String> {
    let mut changed = false;
    let candidates: Vec<String> = value
        .split(',')
        .map(|candidate| {
            let lead = candidate.len() - candidate.trim_start().len();
            let rest = &candidate[lead..];
            let url_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            match page.target(&unescape_amp(&rest[..url_end])) {
                Some(new) => {
                    changed = true;
                    format!("{}{}{}", &candidate[..lead], new, &rest[url_end..])
                }
                None => candidate.to_string(),
            }
        })
        .collect();
    changed.then(|| candidates.join(","))
}

/// Attribute values escape `&` in query strings, by name or by number.
fn unescape_amp(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    ["&amp;", "&#038;", "&#38;", "&#x26;", "&#X26;"]
        .iter()
        .fold(s.to_string(), |acc, entity| acc.replace(*entity, "&"))
}
