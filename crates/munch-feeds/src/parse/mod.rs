//! RSS 2.0 and Atom parsing into [`ParsedFeed`].
//!
//! Every function here is total: bad input comes back as `None`, never as an
//! error or a panic. `None` means "not this format"; a recognized document
//! with no articles is `Some` with an empty `items` list.

mod image;
mod tree;

pub use image::extract_image_url;

use crate::types::{FeedItem, FeedSource, ParsedFeed};
use tree::Element;

/// Parse an Atom document (`<feed>` root).
#[must_use]
pub fn parse_atom(xml: &str) -> Option<ParsedFeed> {
    atom_from_root(&tree::parse_document(xml)?)
}

/// Parse an RSS document (`<rss><channel>` root).
#[must_use]
pub fn parse_rss(xml: &str) -> Option<ParsedFeed> {
    rss_from_root(&tree::parse_document(xml)?)
}

/// Parse a document of either format, picking by root element.
#[must_use]
pub fn parse_feed(xml: &str) -> Option<ParsedFeed> {
    let root = tree::parse_document(xml)?;
    match root.name() {
        "feed" => atom_from_root(&root),
        "rss" => rss_from_root(&root),
        other => {
            tracing::debug!(root = other, "document root is neither feed nor rss");
            None
        }
    }
}

fn atom_from_root(feed: &Element) -> Option<ParsedFeed> {
    if feed.name() != "feed" {
        return None;
    }

    let source = FeedSource {
        title: feed.child_text("title"),
        link: primary_link_href(feed),
        img_url: feed.child_text("icon"),
    };

    let items = feed
        .repeated("entry")
        .into_iter()
        .map(|entry| FeedItem {
            title: entry.child_text("title"),
            link: primary_link_href(entry),
            img_url: extract_image_url(entry.child("content").and_then(Element::text)),
        })
        .collect();

    Some(ParsedFeed { source, items })
}

fn rss_from_root(rss: &Element) -> Option<ParsedFeed> {
    if rss.name() != "rss" {
        return None;
    }
    let channel = rss.child("channel")?;

    let source = FeedSource {
        title: channel.child_text("title"),
        link: channel.child_text("link"),
        img_url: channel
            .child("image")
            .and_then(|image| image.child_text("url")),
    };

    let items = channel
        .repeated("item")
        .into_iter()
        .map(|item| FeedItem {
            title: item.child_text("title"),
            link: item.child_text("link"),
            img_url: extract_image_url(item.child("description").and_then(Element::text)),
        })
        .collect();

    Some(ParsedFeed { source, items })
}

/// `href` of the Atom link that points at the human-readable page.
///
/// Prefers `rel="alternate"`, then a link with no `rel` (which Atom defines
/// as alternate), then whatever link comes first.
fn primary_link_href(parent: &Element) -> Option<String> {
    let links = parent.repeated("link");
    let chosen = links
        .iter()
        .find(|link| link.attr("rel") == Some("alternate"))
        .or_else(|| links.iter().find(|link| link.attr("rel").is_none()))
        .or_else(|| links.first())?;

    chosen
        .attr("href")
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
