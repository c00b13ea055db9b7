//! MIME helpers: normalization, file extensions, and the HTML/CSS test.

/// `text/HTML; charset=UTF-8` → `text/html`.
pub fn normalize_mime(m: &str) -> String {
    m.split(';').next().unwrap_or("").trim().to_ascii_lowercase()
}

pub fn is_html(mime: &str) -> bool {
    let m = normalize_mime(mime);
    m == "text/html" || m == "application/xhtml+xml"
}

pub fn is_css(mime: &str) -> bool {
    normalize_mime(mime) == "text/css"
}

/// Extension (with dot) used when a URL path gives none.
pub fn ext_for_mime(mime: &str) -> String {
    let m = normalize_mime(mime);
    if m.is_empty() {
        return ".bin".to_string();
    }
    let ext = match m.as_str() {
        "text/html" | "application/xhtml+xml" => ".html",
        "text/plain" => ".txt",
        "text/css" => ".css",
        "image/svg+xml" => ".svg",
        "image/jpeg" => ".jpg",
        "image/x-icon" | "image/vnd.microsoft.icon" => ".ico",
        _ if m.ends_with("javascript") => ".js",
        _ if m.contains("json") => ".json",
        _ if m.contains("xml") => ".xml",
        _ => {
            return match m.split_once('/') {
                Some(("image", sub)) | Some(("font", sub)) if is_simple_ext(sub) => {
                    format!(".{}", sub)
                }
                _ => ".bin".to_string(),
            };
        }
    };
    ext.to_string()
}

fn is_simple_ext(s: &str) -> bool {
    !s.is_empty() && s.len() <= 8 && s.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Best-effort MIME type for a file already on disk (resumed entries).
pub fn mime_from_path(path: &str) -> &'static str {
    let ext = path
        .rsplit('/')
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" | "mjs" => "application/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "txt" => "text/plain",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// Bytes of a file read for [`sniff_mime`].
pub const SNIFF_LEN: usize = 512;

/// HTML recognized from the start of a body, for server-side pages
/// (`.php`, `.asp`) whose extension says nothing.
pub fn sniff_mime(head: &[u8]) -> Option<&'static str> {
    let head = &head[..head.len().min(SNIFF_LEN)];
    let head = head.strip_prefix(b"\xef\xbb\xbf").unwrap_or(head);
    let start = head.iter().position(|b| !b.is_ascii_whitespace())?;
    let lower = head[start..].to_ascii_lowercase();
    let markers: [&[u8]; 3] = [b"<!doctype html", b"<html", b"<head"];
    if markers.iter().any(|m| lower.starts_with(m)) {
        return Some("text/html");
    }
    if lower.starts_with(b"<?xml") && lower.windows(5).any(|w| w == b"<html") {
        return Some("application/xhtml+xml");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_params_and_case() {
        assert_eq!(normalize_mime("Text/HTML; charset=UTF-8"), "text/html");
        assert_eq!(normalize_mime(""), "");
    }

    #[test]
    fn extensions() {
        assert_eq!(ext_for_mime("text/css"), ".css");
        assert_eq!(ext_for_mime("application/x-javascript"), ".js");
        assert_eq!(ext_for_mime("application/json; charset=utf-8"), ".json");
        assert_eq!(ext_for_mime("image/png"), ".png");
        assert_eq!(ext_for_mime("image/svg+xml"), ".svg");
        assert_eq!(ext_for_mime("font/woff2"), ".woff2");
        assert_eq!(ext_for_mime("application/octet-stream"), ".bin");
        assert_eq!(ext_for_mime(""), ".bin");
    }

    #[test]
    fn mime_guess_for_resumed_files() {
        assert_eq!(mime_from_path("a/b/index.html"), "text/html");
        assert_eq!(mime_from_path("style.CSS"), "text/css");
        assert_eq!(mime_from_path("LICENSE"), "application/octet-stream");
    }

    #[test]
    fn sniffs_html_documents() {
        assert_eq!(sniff_mime(b"\n  <!DOCTYPE html><html>"), Some("text/html"));
        assert_eq!(sniff_mime(b"\xef\xbb\xbf<html lang=ru>"), Some("text/html"));
        assert_eq!(
            sniff_mime(b"<?xml version=\"1.0\"?>\n<html xmlns=\"http://www.w3.org/1999/xhtml\">"),
            Some("application/xhtml+xml")
        );
        assert_eq!(sniff_mime(b"body{color:red}"), None);
        assert_eq!(sniff_mime(b"\x89PNG\r\n"), None);
        assert_eq!(sniff_mime(b""), None);
    }
}
