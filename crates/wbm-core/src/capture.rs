//! Capture entries: the (original URL, timestamp) pairs the pipeline consumes.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One archived capture of a URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaptureEntry {
    pub original_url: String,
    /// Wayback capture time, `YYYYMMDDhhmmss` (shorter prefixes are accepted by the archive).
    pub timestamp: String,
    /// MIME type reported by the discovery source; may be empty.
    #[serde(default)]
    pub mimetype: String,
    /// Status code reported by the discovery source; may be empty.
    #[serde(default)]
    pub statuscode: String,
}

impl CaptureEntry {
    pub fn new(original_url: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            original_url: original_url.into(),
            timestamp: timestamp.into(),
            mimetype: String::new(),
            statuscode: String::new(),
        }
    }

    pub fn with_mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = mimetype.into();
        self
    }
}

/// Raw replay URL for a capture: `{base}/{timestamp}id_/{original}`.
///
/// The `id_` flag asks the archive for the original bytes without the
/// injected toolbar or rewritten links.
pub fn archived_url(wayback_base: &str, entry: &CaptureEntry) -> String {
    format!(
        "{}/{}id_/{}",
        wayback_base.trim_end_matches('/'),
        entry.timestamp,
        entry.original_url
    )
}

fn is_timestamp(s: &str) -> bool {
    !s.is_empty() && s.len() <= 14 && s.bytes().all(|b| b.is_ascii_digit())
}

/// Parse a capture list: one `timestamp url [mimetype]` per line.
/// Blank lines and `#` comments are skipped.
pub fn parse_capture_list(text: &str) -> Result<Vec<CaptureEntry>> {
    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.split_whitespace();
        let (timestamp, url) = match (parts.next(), parts.next()) {
            (Some(ts), Some(url)) => (ts, url),
            _ => anyhow::bail!("line {}: expected `timestamp url [mimetype]`", idx + 1),
        };
        if !is_timestamp(timestamp) {
            anyhow::bail!("line {}: invalid timestamp {:?}", idx + 1, timestamp);
        }
        let mut entry = CaptureEntry::new(url, timestamp);
        if let Some(mime) = parts.next() {
            entry.mimetype = mime.to_string();
        }
        out.push(entry);
    }
    Ok(out)
}

pub fn read_capture_list(path: &Path) -> Result<Vec<CaptureEntry>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read capture list: {}", path.display()))?;
    parse_capture_list(&text).with_context(|| format!("parse capture list: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archived_url_uses_raw_mode() {
        let e = CaptureEntry::new("https://example.org/style.css", "20200101000000");
        assert_eq!(
            archived_url("https://web.archive.org/web/", &e),
            "https://web.archive.org/web/20200101000000id_/https://example.org/style.css"
        );
    }

    #[test]
    fn parse_list_with_comments_and_mime() {
        let text = "# seeds\n\n20200101000000 https://example.org/\n20200102 https://example.org/a.css text/css\n";
        let list = parse_capture_list(text).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].original_url, "https://example.org/");
        assert_eq!(list[0].mimetype, "");
        assert_eq!(list[1].timestamp, "20200102");
        assert_eq!(list[1].mimetype, "text/css");
    }

    #[test]
    fn parse_list_rejects_bad_timestamp() {
        let err = parse_capture_list("yesterday https://example.org/").unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn parse_list_rejects_missing_url() {
        assert!(parse_capture_list("20200101000000").is_err());
    }
}
