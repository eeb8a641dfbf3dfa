//! Write an element tree as a compact XML document.

use std::io::Write;

use quick_xml::events::attributes::Attribute as XmlAttribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::c14n::{escape_attr, escape_text};
use crate::error::FormatError;
use crate::tree::{Element, Node};

/// Serialize a document: XML declaration followed by the root element.
pub fn write(root: &Element) -> Result<Vec<u8>, FormatError> {
    let mut out = Vec::new();
    write_to(root, &mut out)?;
    Ok(out)
}

/// Serialize a document into `sink`.
pub fn write_to<W: Write>(root: &Element, sink: W) -> Result<(), FormatError> {
    let mut writer = Writer::new(sink);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_element(&mut writer, root)
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &Element) -> Result<(), FormatError> {
    let mut start = BytesStart::new(element.name.as_str());
    for attr in &element.attributes {
        // Values are escaped here so that whitespace survives a reparse.
        let value = escape_attr(&attr.value);
        start.push_attribute(XmlAttribute::from((
            attr.name.as_bytes(),
            value.as_bytes(),
        )));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        match child {
            Node::Element(child) => write_element(writer, child)?,
            Node::Text(text) => {
                let escaped = escape_text(text);
                writer.write_event(Event::Text(BytesText::from_escaped(escaped)))?;
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}
