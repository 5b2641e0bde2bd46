use std::sync::LazyLock;

use regex::Regex;

static SRC_ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"src="[\w\W]+?""#).expect("valid src regex"));

/// Pull the first `src="..."` value out of an HTML fragment.
///
/// This is a plain pattern scan, not an HTML parse: the first `src="`
/// anywhere in the fragment wins, whatever tag it sits on. Single-quoted and
/// unquoted attributes are not recognized.
#[must_use]
pub fn extract_image_url(fragment: Option<&str>) -> Option<String> {
    let found = SRC_ATTRIBUTE.find(fragment?)?;
    let value = found.as_str().strip_prefix("src=\"")?;
    Some(value.replacen('"', "", 1))
}
