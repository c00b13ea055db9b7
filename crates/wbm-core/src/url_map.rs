//! URL → local path map shared by both phases.
//!
//! Keys ignore the scheme, a default port and a leading `www.`, since
//! archived pages freely mix `http://www.example.org` and
//! `https://example.org` for the same resource. Fragments are not part of a
//! key. Query strings are, because they select distinct captures.

use std::collections::HashMap;
use url::Url;

use crate::journal::SnapshotRecord;

/// Identity key of an http(s) URL, or None for other schemes.
pub fn url_key(url: &Url) -> Option<String> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    let host = url.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let mut key = String::with_capacity(host.len() + url.path().len() + 8);
    key.push_str(host);
    if let Some(port) = url.port() {
        key.push(':');
        key.push_str(&port.to_string());
    }
    key.push_str(url.path());
    if let Some(q) = url.query().filter(|q| !q.is_empty()) {
        key.push('?');
        key.push_str(q);
    }
    Some(key)
}

/// [`url_key`] for a string; None if it does not parse.
pub fn url_key_str(s: &str) -> Option<String> {
    Url::parse(s).ok().as_ref().and_then(url_key)
}

/// Flat map from URL key to local path. Later inserts win.
#[derive(Debug, Clone, Default)]
pub struct UrlPathMap {
    map: HashMap<String, String>,
}

impl UrlPathMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an index, keeping successful records only.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a SnapshotRecord>) -> Self {
        let mut map = Self::new();
        for rec in records.into_iter().filter(|r| r.is_ok()) {
            map.insert(&rec.original_url, &rec.local_path);
        }
        map
    }

    /// Returns false if `original_url` has no usable key.
    pub fn insert(&mut self, original_url: &str, local_path: &str) -> bool {
        match url_key_str(original_url) {
            Some(key) => {
                self.map.insert(key, local_path.to_string());
                true
            }
            None => false,
        }
    }

    /// Local path for `url`. `/a` and `/a/` are tried as each other's
    /// fallback, as servers usually redirect one to the other.
    pub fn lookup(&self, url: &Url) -> Option<&str> {
        let key = url_key(url)?;
        if let Some(p) = self.map.get(&key) {
            return Some(p.as_str());
        }
        if url.query().is_some() {
            return None;
        }
        let alt = match key.strip_suffix('/') {
            Some(stripped) if !stripped.ends_with('/') && stripped.contains('/') => {
                stripped.to_string()
            }
            Some(_) => return None,
            None => format!("{}/", key),
        };
        self.map.get(&alt).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
