//! Owned XML tree for WordprocessingML parts.
//!
//! Element and attribute names keep their namespace prefix (`w:p`,
//! `xml:space`). Text and attribute values are held unescaped and escaped
//! again on write. Declarations, comments and processing instructions are
//! carried through untouched.

use crate::error::{DocxError, Result};
use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// A node in a part's XML tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    /// Declaration, comment, processing instruction or doctype
    Other(Event<'static>),
}

/// An XML element with its attributes and children
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Builder-style child append
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Direct child elements
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|el| el.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|node| match node {
            Node::Element(el) if el.name == name => Some(el),
            _ => None,
        })
    }

    /// Concatenated character data of all direct text children
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(t) | Node::CData(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Replace all children with a single text node
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.children.clear();
        if !text.is_empty() {
            self.children.push(Node::Text(text));
        }
    }
}

/// A parsed XML part
#[derive(Debug, Clone)]
pub struct XmlDocument {
    pub part: String,
    pub nodes: Vec<Node>,
}

impl XmlDocument {
    /// Parse a part's bytes into an owned tree
    pub fn parse(part: &str, bytes: &[u8]) -> Result<Self> {
        let xml_err = |details: String| DocxError::Xml {
            part: part.to_string(),
            details,
        };

        let source = std::str::from_utf8(bytes).map_err(|e| DocxError::Encoding {
            part: part.to_string(),
            details: e.to_string(),
        })?;
        // Word writes a BOM on some parts
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);

        let mut reader = Reader::from_str(source);
        let mut stack: Vec<Element> = Vec::new();
        let mut roots: Vec<Node> = Vec::new();

        loop {
            let event = reader
                .read_event()
                .map_err(|e| xml_err(format!("at byte {}: {}", reader.buffer_position(), e)))?;

            let node = match event {
                Event::Start(start) => {
                    stack.push(element_from_start(&start).map_err(xml_err)?);
                    continue;
                }
                Event::End(end) => {
                    let Some(element) = stack.pop() else {
                        return Err(xml_err("unexpected closing tag".to_string()).into());
                    };
                    if end.name().as_ref() != element.name.as_bytes() {
                        return Err(xml_err(format!(
                            "closing tag does not match <{}>",
                            element.name
                        ))
                        .into());
                    }
                    Node::Element(element)
                }
                Event::Empty(start) => Node::Element(element_from_start(&start).map_err(xml_err)?),
                Event::Text(text) => {
                    let value = text.unescape().map_err(|e| xml_err(e.to_string()))?;
                    Node::Text(value.into_owned())
                }
                Event::CData(data) => {
                    Node::CData(String::from_utf8_lossy(&data.into_inner()).into_owned())
                }
                Event::Eof => break,
                other => Node::Other(other.into_owned()),
            };

            match stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => roots.push(node),
            }
        }

        if let Some(open) = stack.last() {
            return Err(xml_err(format!("unclosed element <{}>", open.name)).into());
        }

        Ok(Self {
            part: part.to_string(),
            nodes: roots,
        })
    }

    /// Serialize the tree back into bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        for node in &self.nodes {
            write_node(&mut writer, node).map_err(|details| DocxError::Xml {
                part: self.part.clone(),
                details,
            })?;
        }
        Ok(writer.into_inner())
    }

    /// The document element
    pub fn root(&self) -> Option<&Element> {
        self.nodes.iter().find_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    pub fn root_mut(&mut self) -> Option<&mut Element> {
        self.nodes.iter_mut().find_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }
}

fn element_from_start(start: &BytesStart<'_>) -> std::result::Result<Element, String> {
    let name = String::from_utf8(start.name().as_ref().to_vec()).map_err(|e| e.to_string())?;
    let mut element = Element::new(name);

    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let key = String::from_utf8(attr.key.as_ref().to_vec()).map_err(|e| e.to_string())?;
        let value = attr.unescape_value().map_err(|e| e.to_string())?;
        element.attributes.push((key, value.into_owned()));
    }

    Ok(element)
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> std::result::Result<(), String> {
    match node {
        Node::Element(el) => {
            let mut start = BytesStart::new(el.name.as_str());
            for (key, value) in &el.attributes {
                start.push_attribute((key.as_str(), value.as_str()));
            }

            if el.children.is_empty() {
                writer
                    .write_event(Event::Empty(start))
                    .map_err(|e| e.to_string())?;
                return Ok(());
            }

            writer
                .write_event(Event::Start(start))
                .map_err(|e| e.to_string())?;
            for child in &el.children {
                write_node(writer, child)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new(el.name.as_str())))
                .map_err(|e| e.to_string())
        }
        Node::Text(text) => writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(|e| e.to_string()),
        Node::CData(data) => writer
            .write_event(Event::CData(BytesCData::new(data.as_str())))
            .map_err(|e| e.to_string()),
        Node::Other(event) => writer
            .write_event(event.borrow())
            .map_err(|e| e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Profit &amp; loss </w:t></w:r></w:p></w:body></w:document>"#;

    #[test]
    fn test_parse_builds_tree() {
        let doc = XmlDocument::parse("word/document.xml", SAMPLE.as_bytes()).unwrap();
        let root = doc.root().unwrap();

        assert_eq!(root.name, "w:document");
        assert_eq!(
            root.attr("xmlns:w"),
            Some("http://schemas.openxmlformats.org/wordprocessingml/2006/main")
        );

        let t = root
            .child("w:body")
            .and_then(|b| b.child("w:p"))
            .and_then(|p| p.child("w:r"))
            .and_then(|r| r.child("w:t"))
            .unwrap();
        assert_eq!(t.text(), "Profit & loss ");
        assert_eq!(t.attr("xml:space"), Some("preserve"));
    }

    #[test]
    fn test_write_escapes_text_and_keeps_declaration() {
        let doc = XmlDocument::parse("word/document.xml", SAMPLE.as_bytes()).unwrap();
        let out = String::from_utf8(doc.to_bytes().unwrap()).unwrap();

        assert!(out.starts_with("<?xml version=\"1.0\""));
        assert!(out.contains("Profit &amp; loss "));
        assert!(out.contains("<w:b/>"));
    }

    #[test]
    fn test_reparse_is_stable() {
        let doc = XmlDocument::parse("word/document.xml", SAMPLE.as_bytes()).unwrap();
        let once = doc.to_bytes().unwrap();
        let twice = XmlDocument::parse("word/document.xml", &once)
            .unwrap()
            .to_bytes()
            .unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_mismatched_tags_rejected() {
        let err = XmlDocument::parse("word/document.xml", b"<w:p><w:r></w:p>").unwrap_err();
        assert!(err.to_string().contains("word/document.xml"));
    }

    #[test]
    fn test_unclosed_element_rejected() {
        let err = XmlDocument::parse("word/header1.xml", b"<w:hdr><w:p>").unwrap_err();
        assert!(err.to_string().contains("word/header1.xml"));
    }

    #[test]
    fn test_set_text_and_attr() {
        let mut el = Element::new("w:t");
        el.set_text("FY2024");
        el.set_attr("xml:space", "preserve");
        el.set_attr("xml:space", "default");

        assert_eq!(el.text(), "FY2024");
        assert_eq!(el.attributes.len(), 1);
        assert_eq!(el.attr("xml:space"), Some("default"));

        el.set_text("");
        assert!(el.children.is_empty());
    }
}
