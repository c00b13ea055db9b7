//! Deterministic mapping from archived URLs to paths in the output tree.
//!
//! The same (URL, MIME hint) always yields the same relative path. Both the
//! resume check and the link rewriter depend on that.

mod mime;
mod plan;
mod sanitize;

pub use mime::{ext_for_mime, is_css, is_html, mime_from_path, normalize_mime, sniff_mime, SNIFF_LEN};
pub use plan::{plan_captures, PlannedCapture};
pub use sanitize::sanitize_segment;

use sha2::{Digest, Sha256};

/// Local path (relative, `/`-separated) for a capture of `original_url`.
///
/// - `/` and extensionless HTML paths become `<path>/index.html`
///   (an empty MIME hint counts as HTML for those)
/// - other trailing-slash paths become `index<ext>` with the extension
///   taken from the MIME hint
/// - a query string adds `.q<hash8>` before the extension so distinct
///   captures like `?page=1` and `?page=2` get distinct files
///
/// # Examples
///
/// - `https://example.org/` → `index.html`
/// - `https://example.org/about` (text/html) → `about/index.html`
/// - `https://example.org/css/site.css` → `css/site.css`
pub fn local_path_for(original_url: &str, mimetype: &str) -> String {
    let (raw_path, query) = split_path_query(original_url);
    let decoded = urlencoding::decode(&raw_path)
        .map(|c| c.into_owned())
        .unwrap_or_else(|_| raw_path.clone());
    let trailing_slash = decoded.is_empty() || decoded.ends_with('/');

    let mut segments: Vec<String> = Vec::new();
    for seg in decoded.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(sanitize_segment(s)),
        }
    }

    let mime = normalize_mime(mimetype);
    let htmlish = mime.is_empty() || is_html(&mime);
    let discriminator = query
        .filter(|q| !q.is_empty())
        .map(|q| format!(".q{}", short_hash(&q)))
        .unwrap_or_default();

    let names_a_file = !trailing_slash
        && segments
            .last()
            .map_or(false, |last| has_extension(last) || !htmlish);

    let file_name = match segments.pop() {
        Some(last) if names_a_file => insert_before_extension(&last, &discriminator),
        popped => {
            segments.extend(popped);
            let ext = if htmlish {
                ".html".to_string()
            } else {
                ext_for_mime(&mime)
            };
            format!("index{}{}", discriminator, ext)
        }
    };
    segments.push(file_name);
    segments.join("/")
}

/// First 8 hex chars of SHA-256; stable discriminator for names.
pub fn short_hash(s: &str) -> String {
    let digest = Sha256::digest(s.as_bytes());
    let mut hex = hex::encode(digest);
    hex.truncate(8);
    hex
}

/// Path and query of a URL, without the fragment. Falls back to string
/// splitting for inputs the URL parser rejects.
fn split_path_query(original_url: &str) -> (String, Option<String>) {
    if let Ok(u) = url::Url::parse(original_url) {
        return (u.path().to_string(), u.query().map(str::to_string));
    }
    let rest = original_url
        .split_once("://")
        .map(|(_, r)| r)
        .unwrap_or(original_url);
    let rest = rest.split('#').next().unwrap_or("");
    let path_and_query = rest.find('/').map(|i| &rest[i..]).unwrap_or("/");
    match path_and_query.split_once('?') {
        Some((p, q)) => (p.to_string(), Some(q.to_string())),
        None => (path_and_query.to_string(), None),
    }
}

fn has_extension(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((_, ext)) => {
            !ext.is_empty() && ext.len() <= 8 && ext.bytes().all(|b| b.is_ascii_alphanumeric())
        }
        None => false,
    }
}

fn insert_before_extension(name: &str, tag: &str) -> String {
    if tag.is_empty() {
        return name.to_string();
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && has_extension(name) => {
            format!("{}{}.{}", stem, tag, ext)
        }
        _ => format!("{}{}", name, tag),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_and_pretty_urls_become_index_html() {
        assert_eq!(local_path_for("https://example.org/", "text/html"), "index.html");
        assert_eq!(local_path_for("https://example.org", ""), "index.html");
        assert_eq!(
            local_path_for("https://example.org/about", "text/html"),
            "about/index.html"
        );
        assert_eq!(
            local_path_for("https://example.org/blog/post/", ""),
            "blog/post/index.html"
        );
    }

    #[test]
    fn files_keep_their_path() {
        assert_eq!(local_path_for("https://example.org/style.css", ""), "style.css");
        assert_eq!(
            local_path_for("https://example.org/images/a.png", "image/png"),
            "images/a.png"
        );
    }

    #[test]
    fn non_html_trailing_slash_uses_mime_extension() {
        assert_eq!(
            local_path_for("https://example.org/feed/", "application/rss+xml"),
            "feed/index.xml"
        );
        assert_eq!(
            local_path_for("https://example.org/wp-json/", "application/json"),
            "wp-json/index.json"
        );
    }

    #[test]
    fn extensionless_binary_keeps_name() {
        assert_eq!(
            local_path_for("https://example.org/download/file", "application/pdf"),
            "download/file"
        );
    }

    #[test]
    fn query_gets_stable_discriminator() {
        let a = local_path_for("https://example.org/?p=1", "text/html");
        let b = local_path_for("https://example.org/?p=2", "text/html");
        assert_ne!(a, b);
        assert!(a.starts_with("index.q") && a.ends_with(".html"));
        let css = local_path_for("https://example.org/s.css?ver=5.2", "text/css");
        assert!(css.starts_with("s.q") && css.ends_with(".css"));
    }

    #[test]
    fn deterministic() {
        let url = "https://example.org/a%20b/c.php?x=1#frag";
        assert_eq!(local_path_for(url, "text/html"), local_path_for(url, "text/html"));
        assert!(local_path_for(url, "text/html").starts_with("a b/c.q"));
    }

    #[test]
    fn fragment_is_ignored() {
        assert_eq!(
            local_path_for("https://example.org/x.html#top", ""),
            local_path_for("https://example.org/x.html", "")
        );
    }

    #[test]
    fn collapses_duplicate_slashes_and_dot_segments() {
        assert_eq!(
            local_path_for("https://example.org//a///b.js", ""),
            "a/b.js"
        );
    }

    #[test]
    fn unparseable_url_falls_back() {
        assert_eq!(local_path_for("http://[bad/a/b.css", ""), "a/b.css");
    }
}
