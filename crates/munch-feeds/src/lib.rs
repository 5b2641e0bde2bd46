//! Feed ingestion for munch.
//!
//! Converts RSS 2.0 and Atom documents into one canonical `{source, items}`
//! shape, and memoizes parsed feeds in a TTL/size-bounded cache so popular
//! feeds are not fetched and parsed on every request.

pub mod cache;
pub mod client;
pub mod error;
pub mod parse;
pub mod service;
pub mod types;

mod retry;

pub use cache::{Clock, ExpiringCache, ManualClock, SystemClock};
pub use client::FeedClient;
pub use error::FeedError;
pub use parse::{extract_image_url, parse_atom, parse_feed, parse_rss};
pub use service::FeedService;
pub use types::{FeedItem, FeedSource, ParsedFeed};
