//! CSS references: `url(...)` and `@import "..."`.
//!
//! Stylesheets are matched as bytes so legacy single-byte charsets pass
//! through untouched.

use regex::bytes::{Captures, Regex};
use std::sync::LazyLock;

use super::target::PageRewriter;

static URL_FN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i-u)(url\(\s*)(?:"([^"]*)"|'([^']*)'|([^)"'\s]+))(\s*\))"#).expect("css url pattern")
});

static IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i-u)(@import\s+)(?:"([^"]*)"|'([^']*)')"#).expect("css import pattern"));

/// Rewrite every mapped reference in `text`; everything else is kept as is.
pub fn rewrite_css(page: &mut PageRewriter<'_>, text: &[u8]) -> Vec<u8> {
    let text = URL_FN.replace_all(text, |caps: &Captures<'_>| {
        let (quote, value) = quoted_value(caps);
        match as_text(value).and_then(|v| page.target(v)) {
            Some(new) => [&caps[1], quote, new.as_bytes(), quote, &caps[5]].concat(),
            None => caps[0].to_vec(),
        }
    });
    IMPORT
        .replace_all(&text, |caps: &Captures<'_>| {
            let (quote, value) = quoted_value(caps);
            match as_text(value).and_then(|v| page.target(v)) {
                Some(new) => [&caps[1], quote, new.as_bytes(), quote].concat(),
                None => caps[0].to_vec(),
            }
        })
        .into_owned()
}

/// Value and its quote character from groups 2 (`"`), 3 (`'`) or 4 (bare).
pub(super) fn quoted_value<'t>(caps: &Captures<'t>) -> (&'static [u8], &'t [u8]) {
    if let Some(m) = caps.get(2) {
        (b"\"", m.as_bytes())
    } else if let Some(m) = caps.get(3) {
        (b"'", m.as_bytes())
    } else {
        (b"", caps.get(4).map_or(&b""[..], |m| m.as_bytes()))
    }
}

/// References are ASCII in practice; anything else is left alone.
pub(super) fn as_text(value: &[u8]) -> Option<&str> {
    std::str::from_utf8(value).ok()
}
