use serde::{Deserialize, Serialize};

/// The publication a feed belongs to.
///
/// Every field serializes as a present key; unknown values are `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub title: Option<String>,
    pub link: Option<String>,
    pub img_url: Option<String>,
}

/// One article in a feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub title: Option<String>,
    pub link: Option<String>,
    /// First `src="..."` found in the article body, if any.
    pub img_url: Option<String>,
}

/// Canonical shape of a parsed RSS or Atom document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedFeed {
    pub source: FeedSource,
    /// Articles in document order. May be empty.
    pub items: Vec<FeedItem>,
}
