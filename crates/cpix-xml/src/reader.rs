//! Parse bytes into an element tree.

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::FormatError;
use crate::tree::{Attribute, Element, Node};

/// Parse a document.
///
/// DOCTYPE declarations are rejected. Comments and processing instructions
/// are dropped. Text, including whitespace-only text, is kept verbatim after
/// line-ending normalization.
pub fn parse(bytes: &[u8]) -> Result<Element, FormatError> {
    let mut reader = Reader::from_reader(bytes);
    reader.trim_text(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(start_element(&start)?),
            Event::Empty(start) => {
                let element = start_element(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| FormatError::Xml("unmatched end tag".into()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let raw = utf8(&text)?;
                let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");
                let value = unescape(&normalized).map_err(|e| FormatError::Xml(e.to_string()))?;
                push_text(&mut stack, value.into_owned())?;
            }
            Event::CData(data) => {
                let raw = utf8(&data)?;
                push_text(&mut stack, raw.replace("\r\n", "\n").replace('\r', "\n"))?;
            }
            Event::DocType(_) => return Err(FormatError::DocumentType),
            Event::Decl(_) | Event::Comment(_) | Event::PI(_) => {}
            Event::Eof => break,
        }
    }

    if let Some(open) = stack.last() {
        return Err(FormatError::Xml(format!("unclosed element {}", open.name)));
    }
    root.ok_or(FormatError::Empty)
}

fn start_element(start: &BytesStart<'_>) -> Result<Element, FormatError> {
    let mut element = Element::new(utf8(start.name().as_ref())?);
    for attr in start.attributes() {
        let attr = attr?;
        let name = utf8(attr.key.as_ref())?.to_string();
        let raw = utf8(&attr.value)?;
        let normalized = normalize_attr(raw);
        let value = unescape(&normalized).map_err(|e| FormatError::Xml(e.to_string()))?;
        element.attributes.push(Attribute {
            name,
            value: value.into_owned(),
        });
    }
    Ok(element)
}

/// Attribute-value normalization for CDATA-typed attributes: literal
/// whitespace characters become spaces; character references are kept.
fn normalize_attr(raw: &str) -> String {
    raw.replace("\r\n", " ")
        .chars()
        .map(|c| if matches!(c, '\t' | '\n' | '\r') { ' ' } else { c })
        .collect()
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), FormatError> {
    match stack.last_mut() {
        Some(parent) => parent.push_child(element),
        None if root.is_some() => {
            return Err(FormatError::Xml("multiple root elements".into()));
        }
        None => *root = Some(element),
    }
    Ok(())
}

fn push_text(stack: &mut [Element], text: String) -> Result<(), FormatError> {
    match stack.last_mut() {
        Some(parent) => {
            if let Some(Node::Text(previous)) = parent.children.last_mut() {
                previous.push_str(&text);
            } else if !text.is_empty() {
                parent.children.push(Node::Text(text));
            }
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(FormatError::Xml("text outside the root element".into())),
    }
}

fn utf8(bytes: &[u8]) -> Result<&str, FormatError> {
    std::str::from_utf8(bytes).map_err(|e| FormatError::Xml(e.to_string()))
}
