//! HTTP client that downloads raw feed markup.

use std::time::Duration;

use munch_core::AppConfig;
use reqwest::{Client, Url};

use crate::error::FeedError;
use crate::retry::retry_with_backoff;

/// Cap applied when no explicit limit is configured.
pub const DEFAULT_MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

const FEED_ACCEPT: &str =
    "application/rss+xml, application/atom+xml, application/xml;q=0.9, text/xml;q=0.9, */*;q=0.8";

/// Fetches feed documents over HTTP(S).
///
/// Non-2xx responses are typed errors; 429 and 5xx responses and network
/// failures are retried with exponential backoff.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
    max_retries: u32,
    backoff_base_secs: u64,
    max_body_bytes: usize,
}

impl FeedClient {
    /// # Errors
    ///
    /// Returns [`FeedError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_secs,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        })
    }

    /// Refuse response bodies longer than `max_body_bytes`.
    #[must_use]
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// # Errors
    ///
    /// Returns [`FeedError::Http`] if the client cannot be constructed.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, FeedError> {
        Ok(Self::new(
            config.fetch_timeout_secs,
            &config.fetch_user_agent,
            config.fetch_max_retries,
            config.fetch_retry_backoff_base_secs,
        )?
        .with_max_body_bytes(config.fetch_max_body_bytes))
    }

    /// Download the body at `url` as text.
    ///
    /// # Errors
    ///
    /// - [`FeedError::InvalidUrl`] if `url` is not an absolute http(s) URL.
    /// - [`FeedError::RateLimited`] for a 429 after all retries.
    /// - [`FeedError::UnexpectedStatus`] for any other non-2xx status.
    /// - [`FeedError::BodyTooLarge`] if the body exceeds the configured cap.
    /// - [`FeedError::Http`] for network or TLS failures after all retries.
    pub async fn fetch_markup(&self, url: &str) -> Result<String, FeedError> {
        let parsed = validate_url(url)?;

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let parsed = parsed.clone();
            async move {
                let response = self
                    .client
                    .get(parsed.clone())
                    .header(reqwest::header::ACCEPT, FEED_ACCEPT)
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(FeedError::RateLimited {
                        url: parsed.to_string(),
                        retry_after_secs,
                    });
                }

                if !status.is_success() {
                    return Err(FeedError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: parsed.to_string(),
                    });
                }

                read_capped(response, &parsed, self.max_body_bytes).await
            }
        })
        .await
    }
}

/// Read the body as text, bailing out as soon as it passes `limit` bytes.
async fn read_capped(
    mut response: reqwest::Response,
    url: &Url,
    limit: usize,
) -> Result<String, FeedError> {
    let too_large = || FeedError::BodyTooLarge {
        url: url.to_string(),
        limit_bytes: limit,
    };

    let declared_limit = u64::try_from(limit).unwrap_or(u64::MAX);
    if response
        .content_length()
        .is_some_and(|len| len > declared_limit)
    {
        return Err(too_large());
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if body.len().saturating_add(chunk.len()) > limit {
            return Err(too_large());
        }
        body.extend_from_slice(&chunk);
    }

    Ok(String::from_utf8_lossy(&body).into_owned())
}

fn validate_url(url: &str) -> Result<Url, FeedError> {
    let parsed = Url::parse(url.trim()).map_err(|e| FeedError::InvalidUrl {
        url: url.to_owned(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FeedError::InvalidUrl {
            url: url.to_owned(),
            reason: format!("unsupported scheme \"{other}\""),
        }),
    }
}
