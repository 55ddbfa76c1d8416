use thiserror::Error;

/// Failures while downloading the feed document.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("feed request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid feed URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl FetchError {
    /// Returns `true` for failures that may succeed on a later attempt:
    /// connection problems, timeouts, HTTP 429 and 5xx.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            FetchError::Timeout { .. } => true,
            FetchError::UnexpectedStatus { status, .. } => *status == 429 || *status >= 500,
            FetchError::InvalidUrl { .. } => false,
        }
    }
}

/// Failures while turning the feed document into articles.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed feed: {0}")]
    Malformed(String),

    #[error("feed contains no <item> elements")]
    NoItems,
}
