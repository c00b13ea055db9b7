//! Resolution of one URL reference found in a saved page.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use super::relpath::relative_path;
use crate::url_map::UrlPathMap;

const ARCHIVE_HOST: &str = "web.archive.org";

static WAYBACK_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/web/\d{1,14}(?:[a-z]{2}_)?/(.+)$").expect("wayback path pattern")
});

/// Per-file rewriting state: where the page came from, where it lives, and
/// how many references were replaced so far.
pub struct PageRewriter<'a> {
    map: &'a UrlPathMap,
    page_url: Option<Url>,
    page_path: &'a str,
    replaced: usize,
}

impl<'a> PageRewriter<'a> {
    pub fn new(map: &'a UrlPathMap, page_url: &str, page_path: &'a str) -> Self {
        Self {
            map,
            page_url: Url::parse(page_url).ok(),
            page_path,
            replaced: 0,
        }
    }

    pub fn replaced(&self) -> usize {
        self.replaced
    }

    /// Replacement for `raw`, or None to leave it untouched.
    ///
    /// Only absolute, protocol-relative and rooted references are
    /// candidates. Document-relative ones already point into the tree,
    /// which is what makes a second pass a no-op.
    pub fn target(&mut self, raw: &str) -> Option<String> {
        let reference = raw.trim();
        if reference.is_empty() || reference.starts_with('#') {
            return None;
        }
        let resolved = match scheme_of(reference) {
            Some(scheme) if scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https") => {
                Url::parse(reference).ok()?
            }
            Some(_) => return None,
            None if reference.starts_with('/') => self.page_url.as_ref()?.join(reference).ok()?,
            None => return None,
        };
        // A site may have its own /web/<digits>/ paths; the plain URL is the fallback.
        let (target, local) = unwrap_wayback(&resolved, reference.starts_with("/web/"))
            .and_then(|inner| self.map.lookup(&inner).map(|local| (inner, local)))
            .or_else(|| self.map.lookup(&resolved).map(|local| (resolved.clone(), local)))?;
        let mut rel = relative_path(self.page_path, local);
        if let Some(frag) = target.fragment() {
            rel.push('#');
            rel.push_str(frag);
        }
        self.replaced += 1;
        Some(rel)
    }
}

/// Scheme of `s` if it starts with one (`mailto:`, `https:`, ...).
fn scheme_of(s: &str) -> Option<&str> {
    let end = s.find(':')?;
    let scheme = &s[..end];
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if first.is_ascii_alphabetic() && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        Some(scheme)
    } else {
        None
    }
}

/// Original URL inside a Wayback replay URL, query and fragment included.
fn unwrap_wayback(url: &Url, rooted: bool) -> Option<Url> {
    if !rooted && url.host_str() != Some(ARCHIVE_HOST) {
        return None;
    }
    let caps = WAYBACK_PATH.captures(url.path())?;
    let mut inner = caps[1].to_string();
    for scheme in ["http:", "https:"] {
        // Replay paths sometimes collapse `//` after the scheme.
        if let Some(rest) = inner.strip_prefix(scheme) {
            if !rest.starts_with("//") {
                inner = format!("{}//{}", scheme, rest.trim_start_matches('/'));
            }
        }
    }
    if scheme_of(&inner).is_none() {
        inner = format!("http://{}", inner);
    }
    if let Some(q) = url.query() {
        inner.push('?');
        inner.push_str(q);
    }
    if let Some(f) = url.fragment() {
        inner.push('#');
        inner.push_str(f);
    }
    Url::parse(&inner).ok()
}
