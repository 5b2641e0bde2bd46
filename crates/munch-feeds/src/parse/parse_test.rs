use super::*;

const ATOM_FIXTURE: &str = include_str!("../../tests/fixtures/atom.feed.xml");
const RSS_FIXTURE: &str = include_str!("../../tests/fixtures/rss.feed.xml");

const EMPTY_ATOM: &str = r#"<?xml version="1.0" encoding="UTF-8"?><feed xmlns="http://www.w3.org/2005/Atom" xml:lang="en"></feed>"#;

fn item(title: Option<&str>, link: Option<&str>, img_url: Option<&str>) -> FeedItem {
    FeedItem {
        title: title.map(str::to_owned),
        link: link.map(str::to_owned),
        img_url: img_url.map(str::to_owned),
    }
}

// ---------------------------------------------------------------------------
// Atom
// ---------------------------------------------------------------------------

#[test]
fn atom_fixture_maps_source() {
    let feed = parse_atom(ATOM_FIXTURE).expect("valid atom");
    assert_eq!(
        feed.source,
        FeedSource {
            title: Some("Lantern Tech - All Posts".to_string()),
            link: Some("https://lantern.example/".to_string()),
            img_url: Some("https://cdn.lantern.example/logos/lantern-icon.png".to_string()),
        }
    );
}

#[test]
fn atom_fixture_maps_entries_in_order() {
    let feed = parse_atom(ATOM_FIXTURE).expect("valid atom");
    assert_eq!(feed.items.len(), 3);
    assert_eq!(
        feed.items[0],
        item(
            Some("The fastest production car ever to lap the Nürburgring"),
            Some("https://lantern.example/2017/3/6/14837790/fastest-production-car"),
            Some("https://cdn.lantern.example/uploads/image/53570647/performante.0.jpg"),
        )
    );
    assert_eq!(
        feed.items[1],
        item(
            Some("This is a test"),
            Some("https://test.example/hello-test"),
            Some("https://test.example/image.jpg"),
        )
    );
}

#[test]
fn atom_entry_without_link_or_content_is_kept() {
    let feed = parse_atom(ATOM_FIXTURE).expect("valid atom");
    assert_eq!(feed.items[2], item(Some("Link-less note"), None, None));
}

#[test]
fn atom_returns_none_for_invalid_input() {
    assert_eq!(parse_atom(""), None);
    assert_eq!(parse_atom("bad data!"), None);
    assert_eq!(parse_atom("12"), None);
    assert_eq!(parse_atom("{}"), None);
    assert_eq!(parse_atom("<feed><entry></feed>"), None);
}

#[test]
fn atom_returns_none_for_content_outside_root() {
    assert_eq!(parse_atom("<feed><title>A</title></feed>junk text"), None);
    assert_eq!(parse_atom("junk<feed><title>A</title></feed>"), None);
    assert_eq!(parse_atom("<feed><title>A</title></feed><rss/>"), None);
}

#[test]
fn atom_title_decodes_entities_around_html_named_ones() {
    let feed = parse_atom("<feed><title>A &amp; B&nbsp;C</title></feed>").expect("valid atom");
    assert_eq!(feed.source.title.as_deref(), Some("A & B\u{a0}C"));
}

#[test]
fn atom_returns_none_for_rss_document() {
    assert_eq!(parse_atom(RSS_FIXTURE), None);
}

#[test]
fn atom_source_link_is_none_without_link_elements() {
    let xml = ATOM_FIXTURE
        .replace(
            r#"<link type="application/atom+xml" href="https://lantern.example/rss/index.xml" rel="self"/>"#,
            "",
        )
        .replace(
            r#"<link type="text/html" href="https://lantern.example/" rel="alternate"/>"#,
            "",
        );
    let feed = parse_atom(&xml).expect("still valid atom");
    assert_eq!(feed.source.link, None);
    assert_eq!(
        feed.source.title.as_deref(),
        Some("Lantern Tech - All Posts")
    );
}

#[test]
fn atom_link_falls_back_to_first_link_when_no_alternate() {
    let xml = r#"<feed><link rel="self" href="https://a/self"/><link rel="related" href="https://a/rel"/></feed>"#;
    let feed = parse_atom(xml).expect("valid atom");
    assert_eq!(feed.source.link.as_deref(), Some("https://a/self"));
}

#[test]
fn atom_link_prefers_link_without_rel_over_other_rels() {
    let xml = r#"<feed><link rel="self" href="https://a/self"/><link href="https://a/page"/></feed>"#;
    let feed = parse_atom(xml).expect("valid atom");
    assert_eq!(feed.source.link.as_deref(), Some("https://a/page"));
}

#[test]
fn atom_with_no_entries_has_empty_items() {
    let feed = parse_atom(EMPTY_ATOM).expect("empty feed is still a feed");
    assert!(feed.items.is_empty());
    assert_eq!(feed.source, FeedSource::default());
}

#[test]
fn atom_single_entry_has_same_shape_as_many() {
    let single = r#"<feed xmlns="http://www.w3.org/2005/Atom"><entry><title>Test</title></entry></feed>"#;
    let feed = parse_atom(single).expect("valid atom");
    assert_eq!(feed.items, vec![item(Some("Test"), None, None)]);
}

#[test]
fn atom_empty_title_is_none() {
    let xml = r"<feed><title>   </title><entry><title></title></entry></feed>";
    let feed = parse_atom(xml).expect("valid atom");
    assert_eq!(feed.source.title, None);
    assert_eq!(feed.items[0].title, None);
}

#[test]
fn atom_parse_is_deterministic() {
    assert_eq!(parse_atom(ATOM_FIXTURE), parse_atom(ATOM_FIXTURE));
}

// ---------------------------------------------------------------------------
// RSS
// ---------------------------------------------------------------------------

#[test]
fn rss_fixture_maps_source() {
    let feed = parse_rss(RSS_FIXTURE).expect("valid rss");
    assert_eq!(
        feed.source,
        FeedSource {
            title: Some("Harbor Daily".to_string()),
            link: Some("https://harbor.example/".to_string()),
            img_url: Some("https://harbor.example/logo.png".to_string()),
        }
    );
}

#[test]
fn rss_fixture_maps_items() {
    let feed = parse_rss(RSS_FIXTURE).expect("valid rss");
    assert_eq!(
        feed.items,
        vec![
            item(
                Some("Tide tables updated"),
                Some("https://harbor.example/2024/tides"),
                Some("https://harbor.example/img/tides.jpg"),
            ),
            item(
                Some("Fog & ferries"),
                Some("https://harbor.example/2024/fog"),
                None,
            ),
            item(Some("Quiet night"), None, None),
        ]
    );
}

#[test]
fn rss_returns_none_for_invalid_input() {
    assert_eq!(parse_rss(""), None);
    assert_eq!(parse_rss("bad data!"), None);
    assert_eq!(parse_rss("<rss><channel></rss>"), None);
}

#[test]
fn rss_without_channel_is_none() {
    assert_eq!(parse_rss(r#"<rss version="2.0"></rss>"#), None);
}

#[test]
fn rss_returns_none_for_atom_document() {
    assert_eq!(parse_rss(ATOM_FIXTURE), None);
}

#[test]
fn rss_with_no_items_has_empty_items() {
    let feed = parse_rss("<rss><channel><title>T</title></channel></rss>").expect("valid rss");
    assert!(feed.items.is_empty());
    assert_eq!(feed.source.title.as_deref(), Some("T"));
    assert_eq!(feed.source.img_url, None);
}

#[test]
fn rss_single_item_has_same_shape_as_many() {
    let xml = "<rss><channel><item><title>One</title><link>https://a/1</link></item></channel></rss>";
    let feed = parse_rss(xml).expect("valid rss");
    assert_eq!(feed.items, vec![item(Some("One"), Some("https://a/1"), None)]);
}

#[test]
fn rss_atom_self_link_does_not_shadow_channel_link() {
    let xml = r#"<rss><channel><atom:link href="https://a/feed.xml" rel="self"/></channel></rss>"#;
    let feed = parse_rss(xml).expect("valid rss");
    assert_eq!(feed.source.link, None);
}

// ---------------------------------------------------------------------------
// Auto-detection
// ---------------------------------------------------------------------------

#[test]
fn parse_feed_detects_atom() {
    assert_eq!(parse_feed(ATOM_FIXTURE), parse_atom(ATOM_FIXTURE));
}

#[test]
fn parse_feed_detects_rss() {
    assert_eq!(parse_feed(RSS_FIXTURE), parse_rss(RSS_FIXTURE));
}

#[test]
fn parse_feed_rejects_other_documents() {
    assert_eq!(parse_feed("<html><body>hi</body></html>"), None);
    assert_eq!(parse_feed(""), None);
}
