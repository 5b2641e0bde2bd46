//! Cache-first feed fetching.

use std::time::Duration;

use munch_core::AppConfig;
use tokio::sync::Mutex;

use crate::cache::{Clock, ExpiringCache, SystemClock};
use crate::client::FeedClient;
use crate::error::FeedError;
use crate::parse::parse_feed;
use crate::types::ParsedFeed;

/// Fetches, parses, and memoizes feeds keyed by URL.
///
/// The cache lock is only held for the lookup and the store, never across
/// the network fetch, so concurrent misses for the same URL may both fetch.
pub struct FeedService<C = SystemClock> {
    client: FeedClient,
    cache: Mutex<ExpiringCache<String, ParsedFeed, C>>,
    ttl: Duration,
}

impl FeedService<SystemClock> {
    #[must_use]
    pub fn new(client: FeedClient, cache_limit: usize, ttl: Duration) -> Self {
        Self::with_clock(client, SystemClock, cache_limit, ttl)
    }

    /// # Errors
    ///
    /// Returns [`FeedError::Http`] if the HTTP client cannot be constructed.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, FeedError> {
        let client = FeedClient::from_app_config(config)?;
        Ok(Self::new(
            client,
            config.feed_cache_limit,
            config.feed_cache_ttl(),
        ))
    }
}

impl<C: Clock> FeedService<C> {
    #[must_use]
    pub fn with_clock(client: FeedClient, clock: C, cache_limit: usize, ttl: Duration) -> Self {
        Self {
            client,
            cache: Mutex::new(ExpiringCache::with_clock(clock, Some(cache_limit))),
            ttl,
        }
    }

    /// Return the normalized feed at `url`, from cache when fresh.
    ///
    /// # Errors
    ///
    /// - [`FeedError::InvalidFeed`] if the body is neither RSS nor Atom.
    /// - Any error from [`FeedClient::fetch_markup`].
    pub async fn fetch(&self, url: &str) -> Result<ParsedFeed, FeedError> {
        let key = url.trim();

        if let Some(feed) = self.cache.lock().await.get(key) {
            tracing::debug!(url = %key, "feed cache hit");
            return Ok(feed.clone());
        }
        tracing::debug!(url = %key, "feed cache miss");

        let markup = self.client.fetch_markup(key).await?;
        let Some(feed) = parse_feed(&markup) else {
            tracing::warn!(url = %key, bytes = markup.len(), "fetched document is not a feed");
            return Err(FeedError::InvalidFeed {
                url: key.to_owned(),
            });
        };

        tracing::info!(url = %key, items = feed.items.len(), "fetched feed");
        self.cache
            .lock()
            .await
            .set_with_ttl(key.to_owned(), feed.clone(), self.ttl);
        Ok(feed)
    }

    /// Number of feeds currently held, stale ones included.
    pub async fn cached_feeds(&self) -> usize {
        self.cache.lock().await.len()
    }
}
