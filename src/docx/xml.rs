//! A small owned XML tree, just enough to edit `word/document.xml` in place.
//!
//! Text and attribute values are kept in their escaped form, so everything
//! that is not touched is written back exactly as it was read.

use std::borrow::Cow;
use std::str;

use quick_xml::escape::{escape, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XmlError {
    #[error(transparent)]
    Parse(#[from] quick_xml::Error),
    #[error(transparent)]
    Attribute(#[from] quick_xml::events::attributes::AttrError),
    #[error(transparent)]
    Escape(#[from] quick_xml::escape::EscapeError),
    #[error(transparent)]
    Utf8(#[from] str::Utf8Error),
    #[error("found `</{found}>`, but `{expected}` is still open")]
    MismatchedEnd { expected: String, found: String },
    #[error("found `</{0}>` without a matching start tag")]
    UnexpectedEnd(String),
    #[error("the element `{0}` is never closed")]
    Unclosed(String),
    #[error("the document has more than one root element")]
    MultipleRoots,
    #[error("the document has no root element")]
    MissingRoot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Escaped character data.
    Text(String),
    /// Comments, processing instructions and cdata sections, including their delimiters.
    Markup(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    /// Attribute names with their escaped values.
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

fn to_string(bytes: &[u8]) -> Result<String, XmlError> {
    Ok(str::from_utf8(bytes)?.to_string())
}

impl Element {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self, XmlError> {
        let mut element = Self::new(to_string(start.name().as_ref())?);

        for attribute in start.attributes() {
            let attribute = attribute?;
            element.attributes.push((
                to_string(attribute.key.as_ref())?,
                to_string(&attribute.value)?,
            ));
        }

        Ok(element)
    }

    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.set_text(text);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        self.name
            .split_once(':')
            .map_or(self.name.as_str(), |(_, local)| local)
    }

    /// Returns the unescaped value of an attribute.
    pub fn attribute(&self, name: &str) -> Option<Cow<'_, str>> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| unescape(value).unwrap_or(Cow::Borrowed(value.as_str())))
    }

    /// Sets an attribute, the value is escaped.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        let value = escape(value).into_owned();

        if let Some(entry) = self.attributes.iter_mut().find(|(key, _)| key == name) {
            entry.1 = value;
        } else {
            self.attributes.push((name.to_string(), value));
        }
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Direct child elements with the given local name.
    pub fn elements<'a>(&'a self, local_name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter_map(move |node| match node {
            Node::Element(element) if element.local_name() == local_name => Some(element),
            _ => None,
        })
    }

    pub fn elements_mut<'a>(
        &'a mut self,
        local_name: &'a str,
    ) -> impl Iterator<Item = &'a mut Element> + 'a {
        self.children.iter_mut().filter_map(move |node| match node {
            Node::Element(element) if element.local_name() == local_name => Some(element),
            _ => None,
        })
    }

    pub fn element(&self, local_name: &str) -> Option<&Element> {
        self.children.iter().find_map(|node| match node {
            Node::Element(element) if element.local_name() == local_name => Some(element),
            _ => None,
        })
    }

    pub fn element_mut(&mut self, local_name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|node| match node {
            Node::Element(element) if element.local_name() == local_name => Some(element),
            _ => None,
        })
    }

    /// All descendants with the given local name in document order. Matching
    /// elements are not searched any further.
    #[must_use]
    pub fn descendants<'a>(&'a self, local_name: &str) -> Vec<&'a Element> {
        let mut result = Vec::new();
        self.collect(local_name, &mut result);
        result
    }

    fn collect<'a>(&'a self, local_name: &str, result: &mut Vec<&'a Element>) {
        for node in &self.children {
            if let Node::Element(element) = node {
                if element.local_name() == local_name {
                    result.push(element);
                } else {
                    element.collect(local_name, result);
                }
            }
        }
    }

    #[must_use]
    pub fn descendants_mut<'a>(&'a mut self, local_name: &str) -> Vec<&'a mut Element> {
        let mut result = Vec::new();
        self.collect_mut(local_name, &mut result);
        result
    }

    fn collect_mut<'a>(&'a mut self, local_name: &str, result: &mut Vec<&'a mut Element>) {
        for node in &mut self.children {
            if let Node::Element(element) = node {
                if element.local_name() == local_name {
                    result.push(element);
                } else {
                    element.collect_mut(local_name, result);
                }
            }
        }
    }

    /// The unescaped character data directly inside this element.
    pub fn text(&self) -> Result<String, XmlError> {
        let mut result = String::new();
        for node in &self.children {
            if let Node::Text(text) = node {
                result.push_str(&unescape(text)?);
            }
        }

        Ok(result)
    }

    /// Replaces all children with the given text.
    pub fn set_text(&mut self, text: &str) {
        self.children.clear();
        if !text.is_empty() {
            self.children.push(Node::Text(escape(text).into_owned()));
        }
    }

    fn write(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);

        for (key, value) in &self.attributes {
            let quote = if value.contains('"') { '\'' } else { '"' };
            out.push(' ');
            out.push_str(key);
            out.push('=');
            out.push(quote);
            out.push_str(value);
            out.push(quote);
        }

        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }

        out.push('>');
        for child in &self.children {
            child.write(out);
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

impl Node {
    fn write(&self, out: &mut String) {
        match self {
            Self::Element(element) => element.write(out),
            Self::Text(text) | Self::Markup(text) => out.push_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    /// Everything in front of the root element, e.g. the xml declaration.
    prolog: Vec<Node>,
    root: Element,
}

impl XmlDocument {
    #[must_use]
    pub fn new(root: Element) -> Self {
        Self {
            prolog: vec![Node::Markup(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#.to_string(),
            )],
            root,
        }
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, XmlError> {
        let mut reader = Reader::from_reader(bytes);
        let mut buffer = Vec::new();

        let mut prolog = Vec::new();
        let mut root = None;
        let mut stack: Vec<Element> = Vec::new();

        loop {
            let node = match reader.read_event_into(&mut buffer)? {
                Event::Start(start) => {
                    stack.push(Element::from_start(&start)?);
                    None
                }
                Event::Empty(start) => Some(Node::Element(Element::from_start(&start)?)),
                Event::End(end) => {
                    let found = to_string(end.name().as_ref())?;
                    let element = stack.pop().ok_or_else(|| XmlError::UnexpectedEnd(found.clone()))?;

                    if element.name != found {
                        return Err(XmlError::MismatchedEnd {
                            expected: element.name,
                            found,
                        });
                    }

                    Some(Node::Element(element))
                }
                Event::Text(text) => Some(Node::Text(to_string(&text)?)),
                Event::GeneralRef(reference) => {
                    Some(Node::Text(format!("&{};", to_string(&reference)?)))
                }
                Event::CData(data) => Some(Node::Markup(format!("<![CDATA[{}]]>", to_string(&data)?))),
                Event::Comment(comment) => Some(Node::Markup(format!("<!--{}-->", to_string(&comment)?))),
                Event::Decl(declaration) => Some(Node::Markup(format!("<?{}?>", to_string(&declaration)?))),
                Event::PI(instruction) => Some(Node::Markup(format!("<?{}?>", to_string(&instruction)?))),
                Event::DocType(doc_type) => {
                    Some(Node::Markup(format!("<!DOCTYPE {}>", to_string(&doc_type)?)))
                }
                Event::Eof => break,
            };
            buffer.clear();

            let Some(node) = node else {
                continue;
            };

            if let Some(parent) = stack.last_mut() {
                match (parent.children.last_mut(), node) {
                    // entity references split the text into several events
                    (Some(Node::Text(previous)), Node::Text(text)) => previous.push_str(&text),
                    (_, node) => parent.children.push(node),
                }
            } else {
                match node {
                    Node::Element(element) => {
                        if root.replace(element).is_some() {
                            return Err(XmlError::MultipleRoots);
                        }
                    }
                    // whitespace between the top-level nodes is not preserved
                    Node::Text(_) => {}
                    Node::Markup(markup) if root.is_none() => prolog.push(Node::Markup(markup)),
                    Node::Markup(_) => {}
                }
            }
        }

        if let Some(element) = stack.pop() {
            return Err(XmlError::Unclosed(element.name));
        }

        Ok(Self {
            prolog,
            root: root.ok_or(XmlError::MissingRoot)?,
        })
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    #[must_use]
    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();
        for node in &self.prolog {
            node.write(&mut out);
        }
        self.root.write(&mut out);
        out
    }

    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_xml_string().into_bytes()
    }
}
