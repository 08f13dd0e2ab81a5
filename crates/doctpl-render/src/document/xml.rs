//! Minimal owned XML tree for package parts.
//!
//! Parts are parsed once with `quick-xml` into [`Element`] trees, mutated in
//! place and written back. Comments and processing instructions are dropped;
//! WordprocessingML parts produced by word processors do not carry them.

use std::borrow::Cow;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::DocumentError;

/// A node in an element's child list.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element with its qualified name, attributes and children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((key, value)),
        }
    }

    /// Iterates child elements together with their index in `children`.
    pub fn elements(&self) -> impl Iterator<Item = (usize, &Element)> {
        self.children
            .iter()
            .enumerate()
            .filter_map(|(i, node)| match node {
                Node::Element(el) => Some((i, el)),
                Node::Text(_) => None,
            })
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().map(|(_, el)| el).find(|el| el.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|node| match node {
            Node::Element(el) if el.name == name => Some(el),
            _ => None,
        })
    }

    /// Resolves a path of child indices starting at this element.
    pub fn at(&self, path: &[usize]) -> Option<&Element> {
        let mut current = self;
        for &idx in path {
            current = match current.children.get(idx)? {
                Node::Element(el) => el,
                Node::Text(_) => return None,
            };
        }
        Some(current)
    }

    pub fn at_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut current = self;
        for &idx in path {
            current = match current.children.get_mut(idx)? {
                Node::Element(el) => el,
                Node::Text(_) => return None,
            };
        }
        Some(current)
    }

    /// Concatenated character data of this element and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(el: &Element, out: &mut String) {
    for node in &el.children {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(child) => collect_text(child, out),
        }
    }
}

/// A parsed package part.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlPart {
    pub name: String,
    pub root: Element,
}

impl XmlPart {
    pub fn parse(name: &str, bytes: &[u8]) -> Result<Self, DocumentError> {
        let mut reader = Reader::from_reader(bytes);
        let mut buf = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|e| xml_error(name, e))?;
            match event {
                Event::Start(start) => stack.push(element_from_start(name, &start)?),
                Event::Empty(start) => {
                    let el = element_from_start(name, &start)?;
                    attach(&mut stack, &mut root, el);
                }
                Event::End(_) => {
                    let el = stack
                        .pop()
                        .ok_or_else(|| xml_error(name, "unbalanced closing tag"))?;
                    attach(&mut stack, &mut root, el);
                }
                Event::Text(text) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = text.unescape().map_err(|e| xml_error(name, e))?;
                        push_text(parent, text);
                    }
                }
                Event::CData(data) => {
                    if let Some(parent) = stack.last_mut() {
                        let raw = data.into_inner();
                        push_text(parent, String::from_utf8_lossy(&raw));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(xml_error(name, "unexpected end of document"));
        }
        let root = root.ok_or_else(|| xml_error(name, "document has no root element"))?;
        Ok(Self {
            name: name.to_string(),
            root,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DocumentError> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(|e| xml_error(&self.name, e))?;
        write_element(&mut writer, &self.root).map_err(|e| xml_error(&self.name, e))?;
        Ok(writer.into_inner())
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, el: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(el)),
        None => *root = Some(el),
    }
}

fn push_text(parent: &mut Element, text: Cow<'_, str>) {
    if text.is_empty() {
        return;
    }
    if let Some(Node::Text(prev)) = parent.children.last_mut() {
        prev.push_str(&text);
    } else {
        parent.children.push(Node::Text(text.into_owned()));
    }
}

fn element_from_start(part: &str, start: &BytesStart<'_>) -> Result<Element, DocumentError> {
    let mut el = Element::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(|e| xml_error(part, e))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(|e| xml_error(part, e))?;
        el.attrs.push((key, value.into_owned()));
    }
    Ok(el)
}

fn write_element<W: std::io::Write>(writer: &mut Writer<W>, el: &Element) -> Result<(), String> {
    let mut start = BytesStart::new(el.name.as_str());
    for (key, value) in &el.attrs {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    if el.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| e.to_string());
    }
    writer
        .write_event(Event::Start(start))
        .map_err(|e| e.to_string())?;
    for node in &el.children {
        match node {
            Node::Element(child) => write_element(writer, child)?,
            Node::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(|e| e.to_string())?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(el.name.as_str())))
        .map_err(|e| e.to_string())
}

fn xml_error(part: &str, err: impl std::fmt::Display) -> DocumentError {
    DocumentError::Xml {
        part: part.to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_write_preserves_structure() {
        let src = br#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="urn:w"><w:body><w:p><w:r><w:t xml:space="preserve"> a &amp; b </w:t></w:r></w:p></w:body></w:document>"#;
        let part = XmlPart::parse("word/document.xml", src).unwrap();
        assert_eq!(part.root.name, "w:document");
        assert_eq!(part.root.attr("xmlns:w"), Some("urn:w"));
        assert_eq!(part.root.text_content(), " a & b ");

        let written = part.to_bytes().unwrap();
        let reparsed = XmlPart::parse("word/document.xml", &written).unwrap();
        assert_eq!(reparsed.root, part.root);
        assert!(String::from_utf8(written).unwrap().contains("a &amp; b"));
    }

    #[test]
    fn test_path_lookup() {
        let src = b"<a><b/><c><d>x</d></c></a>";
        let part = XmlPart::parse("p.xml", src).unwrap();
        assert_eq!(part.root.at(&[1, 0]).unwrap().name, "d");
        assert!(part.root.at(&[5]).is_none());
    }

    #[test]
    fn test_unbalanced_document_is_error() {
        let err = XmlPart::parse("p.xml", b"<a><b></a>").unwrap_err();
        assert!(matches!(err, DocumentError::Xml { .. }));
    }

    #[test]
    fn test_set_attr_replaces_existing() {
        let mut el = Element::new("w:highlight").with_attr("w:val", "red");
        el.set_attr("w:val", "yellow");
        assert_eq!(el.attrs.len(), 1);
        assert_eq!(el.attr("w:val"), Some("yellow"));
    }
}
