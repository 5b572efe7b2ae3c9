//
//  tree.rs -- generic XML element tree, built and written with quick-xml.
//
//  Library for serializing and de-serializing data in
//  Linden Lab Structured Data format.
//
//  The LLSD codec works on whole trees: the parser walks one built from
//  text, the serializer builds one and writes it out.
//
//  Animats
//  October, 2026.
//  License: LGPL.
//
use crate::error::{LLSDError, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Write;

/// One XML element: name, optional text, attributes and ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    pub name: String,
    /// None for a self-closing or empty element.
    pub text: Option<String>,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Empty element with no text.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Element holding one text node.
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Append a child element.
    pub fn push(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    /// Value of the named attribute, if present.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Build a tree from XML text and return its root element.
    ///
    /// `max_depth` bounds nesting below the root; the root itself is depth 0.
    /// Declarations, comments, processing instructions and DOCTYPE are skipped.
    pub fn parse_str(xml: &str, max_depth: usize) -> Result<XmlElement> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let element = start_element(&e)?;
                    if stack.len() > max_depth {
                        return Err(LLSDError::DepthLimitExceeded { limit: max_depth });
                    }
                    if stack.is_empty() && root.is_some() {
                        return Err(LLSDError::malformed("more than one root element"));
                    }
                    stack.push(element);
                }
                Event::Empty(e) => {
                    let element = start_element(&e)?;
                    if stack.len() > max_depth {
                        return Err(LLSDError::DepthLimitExceeded { limit: max_depth });
                    }
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    //  quick-xml has already checked that the end tag matches.
                    if let Some(mut element) = stack.pop() {
                        if !element.children.is_empty()
                            && element.text.as_deref().is_some_and(|t| t.trim().is_empty())
                        {
                            element.text = None; // indentation between children
                        }
                        attach(&mut stack, &mut root, element)?;
                    }
                }
                Event::Text(e) => {
                    let text = e.unescape().map_err(quick_xml::Error::from)?;
                    append_text(&mut stack, &text);
                }
                Event::CData(e) => {
                    let bytes = e.into_inner();
                    append_text(&mut stack, std::str::from_utf8(&bytes)?);
                }
                Event::Eof => break,
                _ => {} // declaration, comment, PI, DOCTYPE
            }
        }
        if let Some(open) = stack.last() {
            return Err(LLSDError::malformed(format!(
                "unclosed element <{}>",
                open.name
            )));
        }
        root.ok_or_else(|| LLSDError::malformed("no root element"))
    }

    /// Write this element and its subtree as XML, optionally after a declaration.
    pub fn write_to<W: Write>(&self, writer: W, xml_declaration: bool) -> Result<()> {
        let mut writer = Writer::new(writer);
        if xml_declaration {
            writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        }
        write_element(&mut writer, self)
    }

    /// XML text of this element and its subtree.
    pub fn to_xml_string(&self, xml_declaration: bool) -> Result<String> {
        let mut output: Vec<u8> = Vec::new();
        self.write_to(&mut output, xml_declaration)?;
        String::from_utf8(output).map_err(|e| LLSDError::Utf8(e.utf8_error()))
    }
}

fn start_element(e: &BytesStart) -> Result<XmlElement> {
    let mut element = XmlElement::new(std::str::from_utf8(e.name().as_ref())?);
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
        let value = attr
            .unescape_value()
            .map_err(quick_xml::Error::from)?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

/// Hand a finished element to its parent, or make it the root.
fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.push(element),
        None if root.is_some() => {
            return Err(LLSDError::malformed("more than one root element"))
        }
        None => *root = Some(element),
    }
    Ok(())
}

fn append_text(stack: &mut [XmlElement], text: &str) {
    if text.is_empty() {
        return;
    }
    //  Text outside the root element is dropped.
    if let Some(element) = stack.last_mut() {
        element.text.get_or_insert_with(String::new).push_str(text);
    }
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &XmlElement) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    if element.text.is_none() && element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }
    writer.write_event(Event::Start(start))?;
    if let Some(text) = &element.text {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}
