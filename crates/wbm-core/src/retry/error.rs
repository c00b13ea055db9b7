//! Request error type for retry classification.

use std::fmt;

/// Error returned by a single snapshot request (curl failure or HTTP error).
/// Kept separate from anyhow so the retry loop can classify it first.
#[derive(Debug)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, bad URL, etc.).
    Curl(curl::Error),
    /// The final response after redirects had a non-2xx status.
    Http(u32),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Curl(e) => write!(f, "{}", e),
            FetchError::Http(code) => write!(f, "HTTP {}", code),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Curl(e) => Some(e),
            FetchError::Http(_) => None,
        }
    }
}

impl From<curl::Error> for FetchError {
    fn from(e: curl::Error) -> Self {
        FetchError::Curl(e)
    }
}
