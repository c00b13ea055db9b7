//! Parse HTTP response header lines into ResponseMeta.

/// Headers of the final response that the pipeline cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseMeta {
    /// Raw `Content-Type` value (may include parameters such as charset).
    pub content_type: Option<String>,
    /// `Content-Encoding`, lowercased.
    pub content_encoding: Option<String>,
    /// `Content-Length`, if present and numeric.
    pub content_length: Option<u64>,
}

/// Parse collected header lines (status line included) into ResponseMeta.
pub fn parse_headers(lines: &[String]) -> ResponseMeta {
    let mut meta = ResponseMeta::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-type") && !value.is_empty() {
                meta.content_type = Some(value.to_string());
            } else if name.eq_ignore_ascii_case("content-encoding") && !value.is_empty() {
                meta.content_encoding = Some(value.to_ascii_lowercase());
            } else if name.eq_ignore_ascii_case("content-length") {
                meta.content_length = value.parse::<u64>().ok();
            }
        }
    }

    meta
}
