//! Snapshot retrieval over HTTP.
//!
//! Uses the curl crate (libcurl) with a single reused easy handle. Bodies are
//! requested with `Accept-Encoding: identity` and never decoded by curl, so
//! the pipeline sees the wire bytes and decides about decompression itself.

mod parse;

pub use parse::{parse_headers, ResponseMeta};

use anyhow::{Context, Result};
use std::str;
use std::time::Duration;

use crate::config::MirrorConfig;
use crate::retry::{run_with_retry, FetchError, RetryPolicy};

/// A completed 2xx response: final status, parsed headers and the raw body.
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    pub status: u32,
    pub meta: ResponseMeta,
    pub body: Vec<u8>,
}

/// Source of snapshot bodies. The pipeline only talks to this trait.
pub trait SnapshotFetcher {
    /// GET `url` (following redirects). Non-2xx final responses are errors.
    fn fetch(&mut self, url: &str) -> Result<FetchedResponse, FetchError>;
}

/// libcurl-backed fetcher with retry/backoff and a politeness delay.
pub struct CurlFetcher {
    easy: curl::easy::Easy,
    policy: RetryPolicy,
    delay: Duration,
}

impl CurlFetcher {
    pub fn new(cfg: &MirrorConfig) -> Result<Self> {
        let mut easy = curl::easy::Easy::new();
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.useragent(&cfg.user_agent)?;
        easy.connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))?;
        easy.timeout(Duration::from_secs(cfg.request_timeout_secs))?;

        let mut list = curl::easy::List::new();
        list.append("Accept: */*")?;
        list.append("Accept-Encoding: identity")?;
        easy.http_headers(list).context("set request headers")?;

        Ok(Self {
            easy,
            policy: cfg.retry_policy(),
            delay: cfg.delay(),
        })
    }

    /// Override the retry policy (tests use a single attempt).
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn fetch_once(&mut self, url: &str) -> Result<FetchedResponse, FetchError> {
        let mut headers: Vec<String> = Vec::new();
        let mut body: Vec<u8> = Vec::new();

        self.easy.url(url)?;
        {
            let mut transfer = self.easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    let line = s.trim_end();
                    // A new status line starts a new response (redirect hop).
                    if line.starts_with("HTTP/") {
                        headers.clear();
                    }
                    headers.push(line.to_string());
                }
                true
            })?;
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = self.easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Http(code));
        }

        Ok(FetchedResponse {
            status: code,
            meta: parse_headers(&headers),
            body,
        })
    }
}

impl SnapshotFetcher for CurlFetcher {
    fn fetch(&mut self, url: &str) -> Result<FetchedResponse, FetchError> {
        let policy = self.policy;
        let result = run_with_retry(&policy, || self.fetch_once(url));
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        result
    }
}
