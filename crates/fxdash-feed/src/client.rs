//! HTTP client for the upstream news feed.

use std::time::Duration;

use fxdash_core::AppConfig;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Client, Url};

use crate::error::FetchError;

const ACCEPT_FEED: &str = "application/xml, text/xml, */*";

/// Characters left unescaped by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Build the URL actually requested: the relay prefix followed by the
/// percent-encoded feed URL, or the feed URL itself when no relay is set.
#[must_use]
pub fn relay_url(feed_url: &str, cors_relay: Option<&str>) -> String {
    match cors_relay {
        Some(relay) => format!("{relay}{}", utf8_percent_encode(feed_url, URI_COMPONENT)),
        None => feed_url.to_string(),
    }
}

/// Downloads the raw RSS document.
///
/// One GET per call, bounded by a fixed timeout. Retrying is left to the
/// caller.
pub struct FeedClient {
    client: Client,
    url: Url,
    timeout_secs: u64,
}

impl FeedClient {
    /// Creates a client for `feed_url`, routed through `cors_relay` when given.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] if the resulting request URL does not
    /// parse, or [`FetchError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        feed_url: &str,
        cors_relay: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, FetchError> {
        let raw = relay_url(feed_url, cors_relay);
        let url = Url::parse(&raw).map_err(|e| FetchError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            url,
            timeout_secs,
        })
    }

    /// Creates a client from the feed settings in [`AppConfig`].
    ///
    /// # Errors
    ///
    /// See [`FeedClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, FetchError> {
        Self::new(
            &config.feed_url,
            config.cors_relay.as_deref(),
            config.feed_timeout_secs,
            &config.feed_user_agent,
        )
    }

    /// The URL requested by [`FeedClient::fetch`].
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fetches the feed and returns the response body as text.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Timeout`] if the request exceeds the configured budget.
    /// - [`FetchError::UnexpectedStatus`] for any non-2xx response.
    /// - [`FetchError::Http`] on other network or TLS failures.
    pub async fn fetch(&self) -> Result<String, FetchError> {
        tracing::debug!(url = %self.url, "fetching news feed");

        let response = self
            .client
            .get(self.url.clone())
            .header(reqwest::header::ACCEPT, ACCEPT_FEED)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.url.to_string(),
            });
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        tracing::debug!(url = %self.url, bytes = body.len(), "news feed fetched");
        Ok(body)
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                url: self.url.to_string(),
                timeout_secs: self.timeout_secs,
            }
        } else {
            FetchError::Http(err)
        }
    }
}
