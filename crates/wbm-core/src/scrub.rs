//! WordPress Age Gate removal.
//!
//! Archived WordPress sites often carry the Age Gate plugin, whose overlay
//! blocks the page until a script (and a wp-json endpoint) that no longer
//! exists answers. The mirror drops the overlay markup and the plugin assets.

use regex::bytes::Regex;
use std::sync::LazyLock;

const PLUGIN_PATH: &str = "/wp-content/plugins/age-gate/";
const API_PATH: &str = "/wp-json/age-gate/";

/// True if `original_url` is an Age Gate plugin asset or API endpoint.
pub fn is_age_gate_resource(original_url: &str) -> bool {
    let path = match url::Url::parse(original_url) {
        Ok(u) => u.path().to_ascii_lowercase(),
        Err(_) => return false,
    };
    path.contains(PLUGIN_PATH) || path.contains(API_PATH)
}

// Byte patterns with Unicode off: pages in legacy charsets are scrubbed too.
static PATTERNS: LazyLock<Vec<(Regex, &'static [u8])>> = LazyLock::new(|| {
    let patterns: &[(&str, &'static [u8])] = &[
        (r#"(?is-u)<template\s+id="tmpl-age-gate"\s*>.*?</template>\s*"#, b""),
        (
            r#"(?is-u)<style\b[^>]*\bid=['"]age-gate-[^>]*?['"][^>]*>.*?</style>\s*"#,
            b"",
        ),
        (r#"(?i-u)<link\b[^>]*\bid=['"]age-gate-css['"][^>]*>\s*"#, b""),
        (
            r#"(?is-u)<script\b[^>]*\bid=['"]age-gate-[^>]*?['"][^>]*>.*?</script>\s*"#,
            b"",
        ),
        (
            r#"(?is-u)<script\b[^>]*\bsrc=["'][^"']*wp-content/plugins/age-gate/[^"']*["'][^>]*>.*?</script>\s*"#,
            b"",
        ),
        (
            r#"(?i-u)<link\b[^>]*\bhref=["'][^"']*wp-content/plugins/age-gate/[^"']*["'][^>]*>\s*"#,
            b"",
        ),
        (
            r#"(?is-u)\s*\.age-gate-submit-no\s*,\s*\.age-gate-submit-yes\s*\{.*?\}\s*"#,
            b"\n",
        ),
        (r"(?-u)\n{4,}", b"\n\n\n"),
    ];
    patterns
        .iter()
        .map(|(pat, rep)| (Regex::new(pat).expect("static age gate pattern"), *rep))
        .collect()
});

/// Remove Age Gate overlay markup from a WordPress-rendered page.
/// Works on raw bytes, so the page's charset does not matter.
pub fn strip_age_gate_html(html: &[u8]) -> Vec<u8> {
    let mut out = html.to_vec();
    for (re, rep) in PATTERNS.iter() {
        if re.is_match(&out) {
            out = re.replace_all(&out, *rep).into_owned();
        }
    }
    out
}
