//! Topic source parsing.
//!
//! Reads a topic XML file into a [`Topic`]. The root element carries the
//! topic metadata:
//!
//! ```xml
//! <topic id="T:Sample.Widget" title="Widget Class" kind="api">
//!   <summary>...</summary>
//!   <remarks>...</remarks>
//! </topic>
//! ```
//!
//! Whitespace-only text containing a line break is treated as indentation
//! and dropped, except between two inline elements where it is collapsed to
//! a single space. Other whitespace is kept as written.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use super::node::{ContentNode, Element, Topic, TopicKind};

/// Elements that flow with the surrounding text.
const INLINE_ELEMENTS: &[&str] = &[
    "a",
    "application",
    "b",
    "c",
    "codeEntityReference",
    "codeInline",
    "command",
    "customElement",
    "em",
    "externalLink",
    "i",
    "languageKeyword",
    "legacyBold",
    "legacyItalic",
    "legacyUnderline",
    "link",
    "literal",
    "math",
    "newTerm",
    "paramref",
    "quoteInline",
    "replaceable",
    "see",
    "span",
    "strong",
    "subscript",
    "superscript",
    "system",
    "token",
    "typeparamref",
    "u",
    "ui",
];

fn is_inline_element(name: &str) -> bool {
    INLINE_ELEMENTS.contains(&name)
}

#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("encoding error: {0}")]
    Encoding(#[from] quick_xml::encoding::EncodingError),

    #[error("document has no root element")]
    MissingRoot,

    #[error("unexpected closing tag </{0}>")]
    UnexpectedEnd(String),

    #[error("unclosed element <{0}>")]
    Unclosed(String),
}

/// Parse a topic document.
///
/// `fallback_id` is used when the root has no `id` attribute (typically the
/// file stem).
pub fn parse_topic(xml: &str, fallback_id: &str) -> Result<Topic, ParseError> {
    let root = parse_element_tree(xml)?;
    let id = root.attribute("id").unwrap_or(fallback_id).to_owned();
    let kind = match root.attribute("kind") {
        Some(kind) if kind.eq_ignore_ascii_case("conceptual") => TopicKind::Conceptual,
        _ => TopicKind::Api,
    };
    Ok(Topic::new(id, kind, root))
}

/// Parse an XML fragment into its root element.
pub fn parse_element_tree(xml: &str) -> Result<Element, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    // Open elements, innermost last.
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                stack.push(start_element(&reader, &e));
            }
            Event::Empty(e) => {
                let element = start_element(&reader, &e);
                close_element(&mut stack, &mut root, element);
            }
            Event::End(e) => {
                let name = decode_bytes(&reader, e.name().as_ref());
                let element = stack
                    .pop()
                    .ok_or_else(|| ParseError::UnexpectedEnd(name.clone()))?;
                if element.name() != name {
                    return Err(ParseError::UnexpectedEnd(name));
                }
                close_element(&mut stack, &mut root, element);
            }
            Event::Text(e) => {
                let text = reader.decoder().decode(&e)?;
                push_text(&mut stack, text);
            }
            Event::GeneralRef(e) => {
                let entity = reader.decoder().decode(&e)?;
                push_text(&mut stack, Cow::Owned(decode_entity(&entity)));
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e).into_owned();
                push_text(&mut stack, Cow::Owned(text));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(ParseError::Unclosed(open.name().to_owned()));
    }
    root.ok_or(ParseError::MissingRoot)
}

fn start_element(reader: &Reader<&[u8]>, e: &BytesStart) -> Element {
    let mut element = Element::new(decode_bytes(reader, e.name().as_ref()));
    for attr in e.attributes().flatten() {
        let key = decode_bytes(reader, attr.key.as_ref());
        if key.starts_with("xmlns") {
            continue;
        }
        let value = attr.unescape_value().map_or_else(
            |_| String::from_utf8_lossy(&attr.value).into_owned(),
            Cow::into_owned,
        );
        element = element.with_attr(key, value);
    }
    element
}

fn close_element(stack: &mut [Element], root: &mut Option<Element>, mut element: Element) {
    element.collapse_layout_whitespace(is_inline_element);
    match stack.last_mut() {
        Some(parent) => parent.push_child(ContentNode::Element(element)),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

fn push_text(stack: &mut [Element], text: Cow<'_, str>) {
    if text.is_empty() {
        return;
    }
    if let Some(parent) = stack.last_mut() {
        parent.push_text(&text);
    }
}

fn decode_bytes(reader: &Reader<&[u8]>, bytes: &[u8]) -> String {
    reader.decoder().decode(bytes).map_or_else(
        |_| String::from_utf8_lossy(bytes).into_owned(),
        Cow::into_owned,
    )
}

/// Decode an XML entity reference to its character value.
fn decode_entity(entity: &str) -> String {
    match entity {
        "lt" => "<".to_owned(),
        "gt" => ">".to_owned(),
        "amp" => "&".to_owned(),
        "apos" => "'".to_owned(),
        "quot" => "\"".to_owned(),
        s if s.starts_with('#') => {
            let code = if s.starts_with("#x") || s.starts_with("#X") {
                u32::from_str_radix(&s[2..], 16).ok()
            } else {
                s[1..].parse::<u32>().ok()
            };
            code.and_then(char::from_u32)
                .map_or_else(|| format!("&{entity};"), |c| c.to_string())
        }
        _ => format!("&{entity};"),
    }
}
