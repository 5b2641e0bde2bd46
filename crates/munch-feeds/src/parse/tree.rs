//! Minimal element tree built from `quick-xml` events.
//!
//! Feed documents are small, so the whole document is materialized before
//! any field mapping happens. Element names are kept exactly as written,
//! prefix included, so `atom:link` never shadows `link`.

use std::borrow::Cow;

use quick_xml::escape::resolve_html5_entity;
use quick_xml::events::{BytesCData, BytesStart, BytesText, Event};
use quick_xml::Reader;

#[derive(Debug, Default)]
pub(crate) struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Self {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let attributes = start
            .attributes()
            .filter_map(Result::ok)
            .map(|attr| {
                let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                let value = match attr.unescape_value_with(resolve_html5_entity) {
                    Ok(value) => value.into_owned(),
                    Err(_) => unescape_leniently(&String::from_utf8_lossy(&attr.value)),
                };
                (key, value)
            })
            .collect();

        Self {
            name,
            attributes,
            ..Self::default()
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Trimmed text content directly inside this element, CDATA included.
    /// Whitespace-only content counts as absent.
    pub(crate) fn text(&self) -> Option<&str> {
        let trimmed = self.text.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// First direct child called `name`.
    pub(crate) fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub(crate) fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).and_then(Element::text).map(str::to_owned)
    }

    /// Every direct child called `name`, in document order.
    ///
    /// A lone child and a run of siblings come back as the same sequence
    /// type, so callers map entries without caring how many there were.
    pub(crate) fn repeated(&self, name: &str) -> Vec<&Element> {
        self.children.iter().filter(|c| c.name == name).collect()
    }
}

/// Parse `xml` into its root element.
///
/// Returns `None` for anything that is not a single well-formed element
/// tree: empty input, bare text, mismatched or unclosed tags, content
/// before or after the root element.
pub(crate) fn parse_document(xml: &str) -> Option<Element> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if stack.is_empty() && root.is_some() {
                    return reject_outside_root("element");
                }
                stack.push(Element::from_start(&e));
            }
            Ok(Event::Empty(e)) => attach(&mut stack, &mut root, Element::from_start(&e))?,
            Ok(Event::End(_)) => {
                let element = stack.pop()?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(e)) => {
                let text = decode_text(&e);
                match stack.last_mut() {
                    Some(current) => current.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => return reject_outside_root("text"),
                }
            }
            Ok(Event::CData(e)) => match stack.last_mut() {
                Some(current) => current.text.push_str(&decode_cdata(&e)),
                None => return reject_outside_root("CDATA"),
            },
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(
                    error = %e,
                    position = reader.buffer_position(),
                    "malformed feed markup"
                );
                return None;
            }
        }
    }

    if !stack.is_empty() {
        tracing::debug!(open_elements = stack.len(), "feed markup ended inside an element");
        return None;
    }

    root
}

/// Hang `element` off the open parent, or make it the root. A second
/// top-level element is not well-formed and yields `None`.
fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Option<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return reject_outside_root("element"),
    }
    Some(())
}

fn reject_outside_root<T>(what: &str) -> Option<T> {
    tracing::debug!(content = what, "feed markup has content outside the root element");
    None
}

/// Unescape XML and HTML5 named entities plus character references.
/// Anything still unresolvable is kept literally, one reference at a time.
fn decode_text<'a>(text: &'a BytesText<'_>) -> Cow<'a, str> {
    match text.unescape_with(resolve_html5_entity) {
        Ok(decoded) => decoded,
        Err(_) => Cow::Owned(unescape_leniently(&String::from_utf8_lossy(text))),
    }
}

fn unescape_leniently(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let resolved = after
            .find(';')
            .and_then(|end| resolve_reference(&after[..end]).map(|value| (value, end)));

        match resolved {
            Some((value, end)) => {
                out.push_str(&value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

fn resolve_reference(name: &str) -> Option<Cow<'static, str>> {
    let Some(number) = name.strip_prefix('#') else {
        return resolve_html5_entity(name).map(Cow::Borrowed);
    };
    let code = match number.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => number.parse::<u32>().ok()?,
    };
    char::from_u32(code).map(|c| Cow::Owned(c.to_string()))
}

fn decode_cdata<'a>(cdata: &'a BytesCData<'_>) -> Cow<'a, str> {
    String::from_utf8_lossy(cdata)
}
