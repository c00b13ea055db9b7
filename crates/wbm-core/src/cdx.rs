//! Capture discovery through the Wayback CDX API.
//!
//! Asks for the latest successful capture of every URL under a domain
//! (`collapse=urlkey`, `sort=reverse`, `statuscode:200`).

use anyhow::{Context, Result};

use crate::capture::CaptureEntry;
use crate::fetch::SnapshotFetcher;
use crate::scrub;

const CDX_FIELDS: &str = "timestamp,original,mimetype,statuscode";

/// Build the CDX query URL for every capture under `domain`.
pub fn cdx_query_url(endpoint: &str, domain: &str) -> String {
    let params = [
        ("url", format!("{}/*", domain)),
        ("output", "txt".to_string()),
        ("fl", CDX_FIELDS.to_string()),
        ("filter", "statuscode:200".to_string()),
        ("collapse", "urlkey".to_string()),
        ("sort", "reverse".to_string()),
    ];
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", endpoint, query)
}

/// Parse the whitespace-separated text output; short lines are skipped.
pub fn parse_cdx(body: &str) -> Vec<CaptureEntry> {
    body.lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            match parts.as_slice() {
                [ts, original, mimetype, status, ..] => Some(CaptureEntry {
                    original_url: original.to_string(),
                    timestamp: ts.to_string(),
                    mimetype: mimetype.to_string(),
                    statuscode: status.to_string(),
                }),
                _ => None,
            }
        })
        .collect()
}

/// Options for [`discover`].
#[derive(Debug, Clone, Default)]
pub struct DiscoverOptions {
    /// Keep only the first N captures.
    pub max: Option<usize>,
    /// Keep Age Gate plugin assets and endpoints.
    pub include_age_gate_resources: bool,
}

/// Query the CDX endpoint for `domain` and return the capture list.
pub fn discover<F: SnapshotFetcher>(
    fetcher: &mut F,
    endpoint: &str,
    domain: &str,
    opts: &DiscoverOptions,
) -> Result<Vec<CaptureEntry>> {
    let url = cdx_query_url(endpoint, domain);
    tracing::info!(%url, "querying CDX");
    let resp = fetcher
        .fetch(&url)
        .with_context(|| format!("CDX query for {}", domain))?;
    let body = String::from_utf8_lossy(&resp.body);

    let mut captures = parse_cdx(&body);
    let found = captures.len();
    if !opts.include_age_gate_resources {
        captures.retain(|c| !scrub::is_age_gate_resource(&c.original_url));
    }
    if let Some(max) = opts.max.filter(|m| *m > 0) {
        captures.truncate(max);
    }
    tracing::info!(found, kept = captures.len(), "CDX discovery finished");
    Ok(captures)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_url_encodes_params() {
        let url = cdx_query_url("https://web.archive.org/cdx/search/cdx", "example.org");
        assert!(url.starts_with("https://web.archive.org/cdx/search/cdx?url=example.org%2F%2A&"));
        assert!(url.contains("fl=timestamp%2Coriginal%2Cmimetype%2Cstatuscode"));
        assert!(url.contains("filter=statuscode%3A200"));
        assert!(url.ends_with("sort=reverse"));
    }

    #[test]
    fn parse_skips_short_lines() {
        let body = "20200101000000 https://example.org/ text/html 200\n\
                    garbage line\n\
                    20190101000000 https://example.org/style.css text/css 200\n";
        let list = parse_cdx(body);
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].mimetype, "text/html");
        assert_eq!(list[1].original_url, "https://example.org/style.css");
        assert_eq!(list[1].statuscode, "200");
    }
}
