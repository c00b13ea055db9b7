//! Link rewriting over a fetched tree.
//!
//! Runs only once the URL map is complete. Each saved HTML or CSS file is
//! read, its mapped references are replaced by paths relative to the file,
//! and it is written back in place if anything changed.

mod css;
mod html;
mod relpath;
mod target;

pub use css::rewrite_css;
pub use html::rewrite_html;
pub use relpath::relative_path;
pub use target::PageRewriter;

use std::collections::HashSet;
use std::fs;

use crate::error::RewriteError;
use crate::journal::SnapshotRecord;
use crate::layout::OutputLayout;
use crate::local_path::{is_css, is_html, mime_from_path};
use crate::storage;
use crate::url_map::UrlPathMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Html,
    Css,
}

impl FileKind {
    /// Kind of a saved file, from its recorded type or else its extension.
    pub fn of(record: &SnapshotRecord) -> Option<Self> {
        let mime = if record.content_type.is_empty() {
            mime_from_path(&record.local_path)
        } else {
            record.content_type.as_str()
        };
        if is_html(mime) {
            Some(FileKind::Html)
        } else if is_css(mime) {
            Some(FileKind::Css)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileOutcome {
    pub kind: FileKind,
    pub replaced: usize,
    /// False when nothing matched and the file was left alone.
    pub written: bool,
}

#[derive(Debug, Default)]
pub struct RewriteSummary {
    /// HTML files whose content changed.
    pub html_files: u64,
    pub css_files: u64,
    pub links: u64,
    pub failures: Vec<(SnapshotRecord, RewriteError)>,
}

/// Rewrite one saved file. Ok(None) for files that are neither HTML nor CSS.
pub fn rewrite_file(
    layout: &OutputLayout,
    map: &UrlPathMap,
    record: &SnapshotRecord,
) -> Result<Option<FileOutcome>, RewriteError> {
    let Some(kind) = FileKind::of(record) else {
        return Ok(None);
    };
    let path = layout.site_path(&record.local_path);
    let bytes = fs::read(&path).map_err(|source| RewriteError::Read {
        path: path.clone(),
        source,
    })?;
    if !is_ascii_compatible(&bytes) {
        return Err(RewriteError::Encoding { path });
    }

    let mut page = PageRewriter::new(map, &record.original_url, &record.local_path);
    let out = match kind {
        FileKind::Html => rewrite_html(&mut page, &bytes),
        FileKind::Css => rewrite_css(&mut page, &bytes),
    };
    let written = out != bytes;
    if written {
        storage::write_atomic(&path, &out).map_err(|e| RewriteError::Write {
            path: path.clone(),
            detail: format!("{:#}", e),
        })?;
    }
    tracing::debug!(path = %record.local_path, replaced = page.replaced(), written, "rewrote");
    Ok(Some(FileOutcome {
        kind,
        replaced: page.replaced(),
        written,
    }))
}

/// False for UTF-16/32 text, where ASCII markup is not a byte sequence of
/// its own. Every single-byte charset and UTF-8 passes.
fn is_ascii_compatible(bytes: &[u8]) -> bool {
    let utf16_bom = bytes.starts_with(&[0xfe, 0xff]) || bytes.starts_with(&[0xff, 0xfe]);
    !utf16_bom && !bytes.iter().take(4096).any(|&b| b == 0)
}

/// Rewrite every successful HTML/CSS record. A file shared by several
/// records is rewritten once, relative to the first record's URL.
pub fn rewrite_all(layout: &OutputLayout, map: &UrlPathMap, records: &[SnapshotRecord]) -> RewriteSummary {
    let mut summary = RewriteSummary::default();
    let mut done: HashSet<&str> = HashSet::new();
    for record in records.iter().filter(|r| r.is_ok()) {
        if !done.insert(record.local_path.as_str()) {
            continue;
        }
        match rewrite_file(layout, map, record) {
            Ok(Some(outcome)) => {
                summary.links += outcome.replaced as u64;
                match (outcome.kind, outcome.written) {
                    (FileKind::Html, true) => summary.html_files += 1,
                    (FileKind::Css, true) => summary.css_files += 1,
                    (_, false) => {}
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(path = %record.local_path, error = %e, "rewrite failed");
                summary.failures.push((record.clone(), e));
            }
        }
    }
    tracing::info!(
        html = summary.html_files,
        css = summary.css_files,
        links = summary.links,
        failed = summary.failures.len(),
        "rewrite pass done"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::SnapshotStatus;

    fn record(url: &str, local: &str, mime: &str) -> SnapshotRecord {
        SnapshotRecord {
            original_url: url.into(),
            timestamp: "20200101000000".into(),
            archived_url: String::new(),
            local_path: local.into(),
            content_type: mime.into(),
            byte_length: 0,
            status: SnapshotStatus::Ok,
            resumed: false,
        }
    }

    fn site(files: &[(&str, &str)]) -> (tempfile::TempDir, OutputLayout) {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(dir.path());
        layout.prepare().unwrap();
        for (local, body) in files {
            storage::write_atomic(&layout.site_path(local), body.as_bytes()).unwrap();
        }
        (dir, layout)
    }

    #[test]
    fn rewrites_html_and_css_in_place() {
        let (_dir, layout) = site(&[
            ("about/index.html", "<link href=\"/style.css\"><a href=\"/\">home</a>"),
            ("style.css", "body{background:url(/images/a.png)}"),
            ("index.html", "<a href=\"https://example.org/about\">about</a>"),
        ]);
        let records = vec![
            record("https://example.org/", "index.html", "text/html"),
            record("https://example.org/about", "about/index.html", "text/html"),
            record("https://example.org/style.css", "style.css", "text/css"),
        ];
        let map = UrlPathMap::from_records(&records);
        let summary = rewrite_all(&layout, &map, &records);

        assert_eq!(summary.html_files, 2);
        assert_eq!(summary.css_files, 0);
        assert_eq!(summary.links, 3);
        assert!(summary.failures.is_empty());
        assert_eq!(
            fs::read_to_string(layout.site_path("about/index.html")).unwrap(),
            "<link href=\"../style.css\"><a href=\"../index.html\">home</a>"
        );
        assert_eq!(
            fs::read_to_string(layout.site_path("style.css")).unwrap(),
            "body{background:url(/images/a.png)}"
        );
    }

    #[test]
    fn utf16_file_is_a_parse_failure_and_others_continue() {
        let (_dir, layout) = site(&[("good.html", "<a href=\"/\">ok</a>"), ("index.html", "home")]);
        let utf16: Vec<u8> = "\u{feff}<a href=\"/\">x</a>"
            .encode_utf16()
            .flat_map(|u| u.to_le_bytes())
            .collect();
        storage::write_atomic(&layout.site_path("bad.html"), &utf16).unwrap();
        let records = vec![
            record("https://example.org/", "index.html", "text/html"),
            record("https://example.org/bad.html", "bad.html", "text/html"),
            record("https://example.org/good.html", "good.html", "text/html"),
        ];
        let map = UrlPathMap::from_records(&records);
        let summary = rewrite_all(&layout, &map, &records);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].1.kind(), crate::error::FailureKind::Parse);
        assert_eq!(fs::read(layout.site_path("bad.html")).unwrap(), utf16);
        assert_eq!(
            fs::read_to_string(layout.site_path("good.html")).unwrap(),
            "<a href=\"index.html\">ok</a>"
        );
    }

    #[test]
    fn latin1_page_is_rewritten_byte_for_byte() {
        let (_dir, layout) = site(&[("style.css", "body{}")]);
        // "<p>Café</p>" in ISO-8859-1
        let page = b"<p>Caf\xe9</p><link href=\"/style.css\"><img src=\"/missing.png\">";
        storage::write_atomic(&layout.site_path("index.html"), page).unwrap();
        let records = vec![
            record("https://example.org/", "index.html", "text/html"),
            record("https://example.org/style.css", "style.css", "text/css"),
        ];
        let map = UrlPathMap::from_records(&records);
        let summary = rewrite_all(&layout, &map, &records);
        assert!(summary.failures.is_empty());
        assert_eq!(summary.html_files, 1);
        assert_eq!(
            fs::read(layout.site_path("index.html")).unwrap(),
            b"<p>Caf\xe9</p><link href=\"style.css\"><img src=\"/missing.png\">".to_vec()
        );
    }

    #[test]
    fn ascii_compatibility() {
        assert!(is_ascii_compatible(b"<p>\xcf\xf0\xe8</p>"));
        assert!(is_ascii_compatible("<p>привет</p>".as_bytes()));
        assert!(!is_ascii_compatible(b"\xff\xfe<\x00p\x00"));
        assert!(!is_ascii_compatible(b"<\x00p\x00>\x00"));
    }

    #[test]
    fn skips_binary_and_failed_records() {
        let (_dir, layout) = site(&[("a.png", "PNG")]);
        let mut failed = record("https://example.org/b.html", "b.html", "text/html");
        failed.status = SnapshotStatus::Failed;
        let records = vec![record("https://example.org/a.png", "a.png", "image/png"), failed];
        let summary = rewrite_all(&layout, &UrlPathMap::new(), &records);
        assert!(summary.failures.is_empty());
        assert_eq!(summary.html_files + summary.css_files, 0);
    }

    #[test]
    fn kind_falls_back_to_extension() {
        assert_eq!(FileKind::of(&record("u", "a/index.html", "")), Some(FileKind::Html));
        assert_eq!(FileKind::of(&record("u", "a.css", "")), Some(FileKind::Css));
        assert_eq!(FileKind::of(&record("u", "a.js", "")), None);
    }
}
