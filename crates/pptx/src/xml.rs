//! Minimal owned XML tree for editing package parts in place.
//!
//! Parts are read with quick-xml into [`Element`] trees, edited, and written
//! back. Names keep their namespace prefix; lookups compare local names only.

use deck_core::{Error, Result};
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fmt::Write as FmtWrite;

/// Standard XML declaration written at the top of every part.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// A node inside an element.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
}

/// An XML element with its prefixed name, attributes in document order, and children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// Extract the local name from a potentially namespaced XML element name.
pub fn local_name(name: &str) -> &str {
    match name.find(':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

impl Element {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add an attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Builder: append a child element.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Builder: append a text node.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Local part of the element name.
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Whether the element's local name matches.
    pub fn is(&self, local: &str) -> bool {
        self.local_name() == local
    }

    /// Attribute value by exact (prefixed) name.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set or replace an attribute.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((key, value)),
        }
    }

    /// Remove an attribute, returning its value.
    pub fn remove_attr(&mut self, key: &str) -> Option<String> {
        let pos = self.attrs.iter().position(|(k, _)| k == key)?;
        Some(self.attrs.remove(pos).1)
    }

    /// Child elements in order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Mutable child elements in order.
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// First child element with the given local name.
    pub fn child(&self, local: &str) -> Option<&Element> {
        self.elements().find(|e| e.is(local))
    }

    /// Mutable first child element with the given local name.
    pub fn child_mut(&mut self, local: &str) -> Option<&mut Element> {
        self.elements_mut().find(|e| e.is(local))
    }

    /// Follow a path of local names through first-match children.
    pub fn find(&self, path: &[&str]) -> Option<&Element> {
        path.iter().try_fold(self, |el, local| el.child(local))
    }

    /// Mutable variant of [`Element::find`].
    pub fn find_mut(&mut self, path: &[&str]) -> Option<&mut Element> {
        let mut current = self;
        for local in path {
            current = current.child_mut(local)?;
        }
        Some(current)
    }

    /// All child elements with the given local name.
    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |e| e.is(local))
    }

    /// Append a child element.
    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Remove every child element with the given local name.
    pub fn remove_children(&mut self, local: &str) {
        self.children
            .retain(|node| !matches!(node, Node::Element(e) if e.is(local)));
    }

    /// Remove every descendant element (at any depth) for which `keep`
    /// returns false. Returns how many were removed.
    pub fn retain_descendants<F: FnMut(&Element) -> bool>(&mut self, keep: &mut F) -> usize {
        let before = self.children.len();
        self.children
            .retain(|node| !matches!(node, Node::Element(e) if !keep(e)));
        let mut removed = before - self.children.len();
        for child in self.elements_mut() {
            removed += child.retain_descendants(keep);
        }
        removed
    }

    /// Every element below this one, depth first.
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        for child in self.elements() {
            out.push(child);
            out.extend(child.descendants());
        }
        out
    }

    /// Insert `child` right after the last child whose local name is in
    /// `after`; at the front when none of them is present.
    pub fn insert_after(&mut self, after: &[&str], child: Element) {
        let pos = self
            .children
            .iter()
            .rposition(|node| matches!(node, Node::Element(e) if after.contains(&e.local_name())))
            .map(|p| p + 1)
            .unwrap_or(0);
        self.children.insert(pos, Node::Element(child));
    }

    /// Insert `child` right before the first child whose local name is in
    /// `before`; at the end when none of them is present.
    pub fn insert_before(&mut self, before: &[&str], child: Element) {
        let pos = self
            .children
            .iter()
            .position(|node| matches!(node, Node::Element(e) if before.contains(&e.local_name())))
            .unwrap_or(self.children.len());
        self.children.insert(pos, Node::Element(child));
    }

    /// Concatenated text of this element and all descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(t) | Node::CData(t) => out.push_str(t),
                Node::Element(e) => e.collect_text(out),
                Node::Comment(_) => {}
            }
        }
    }

    /// Serialize this element (without declaration) into `out`.
    pub fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attrs {
            // Writing to a String cannot fail.
            let _ = write!(out, r#" {}="{}""#, key, escape(value));
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for node in &self.children {
            match node {
                Node::Element(e) => e.write_to(out),
                Node::Text(t) => out.push_str(&escape(t)),
                Node::CData(t) => {
                    let _ = write!(out, "<![CDATA[{}]]>", t);
                }
                Node::Comment(t) => {
                    let _ = write!(out, "<!--{}-->", t);
                }
            }
        }
        let _ = write!(out, "</{}>", self.name);
    }

    /// Serialize as a complete part with the standard declaration.
    pub fn to_document(&self) -> String {
        let mut out = String::with_capacity(4096);
        out.push_str(XML_DECLARATION);
        out.push('\n');
        self.write_to(&mut out);
        out
    }
}

/// Build an element from a start tag, decoding attribute values.
fn element_from_start(start: &BytesStart) -> Result<Element> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::XmlError(format!("Invalid attribute: {}", e)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| Error::XmlError(format!("Invalid attribute value: {}", e)))?
            .into_owned();
        element.attrs.push((key, value));
    }
    Ok(element)
}

/// Parse a part's XML into its root element.
///
/// Text is kept verbatim (no trimming) so `xml:space` content survives a
/// round trip. The declaration, doctype and processing instructions are
/// dropped; [`Element::to_document`] writes a standard declaration back.
pub fn parse(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                stack.push(element_from_start(e)?);
            }
            Ok(Event::Empty(ref e)) => {
                let element = element_from_start(e)?;
                match stack.last_mut() {
                    Some(parent) => parent.push(element),
                    None => root = Some(element),
                }
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::XmlError("Unbalanced end tag".to_string()))?;
                match stack.last_mut() {
                    Some(parent) => parent.push(element),
                    None => root = Some(element),
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some(parent) = stack.last_mut() {
                    let text = e
                        .unescape()
                        .map_err(|e| Error::XmlError(format!("Invalid text: {}", e)))?;
                    parent.children.push(Node::Text(text.into_owned()));
                }
            }
            Ok(Event::CData(ref e)) => {
                if let Some(parent) = stack.last_mut() {
                    let bytes: &[u8] = e;
                    parent
                        .children
                        .push(Node::CData(String::from_utf8_lossy(bytes).into_owned()));
                }
            }
            Ok(Event::Comment(ref e)) => {
                if let Some(parent) = stack.last_mut() {
                    let bytes: &[u8] = e;
                    parent
                        .children
                        .push(Node::Comment(String::from_utf8_lossy(bytes).into_owned()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(Error::XmlError("Unclosed element at end of document".to_string()));
    }
    root.ok_or_else(|| Error::XmlError("Document has no root element".to_string()))
}
