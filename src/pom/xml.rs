use crate::error::{PomupError, Result};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::ops::Range;

/// An element of the raw document together with the byte span of its content,
/// i.e. everything between the end of the start tag and the start of the end tag.
///
/// Only structure and offsets are kept. Values are always read back from the
/// source text, so an edit never has to re-serialize anything it did not touch.
#[derive(Debug, Clone)]
pub struct XmlElement {
    pub name: String,
    pub children: Vec<XmlElement>,
    pub content: Range<usize>,
    /// Comments, CDATA or processing instructions inside the content.
    pub has_markup: bool,
}

impl XmlElement {
    fn new(name: String, at: usize) -> Self {
        Self {
            name,
            children: Vec::new(),
            content: at..at,
            has_markup: false,
        }
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Follow a chain of first-matching children, e.g. `["dependencyManagement", "dependencies"]`.
    pub fn descend(&self, path: &[&str]) -> Option<&XmlElement> {
        path.iter().try_fold(self, |element, name| element.child(name))
    }

    /// Span of the trimmed text content, or `None` when the element holds
    /// anything other than plain text.
    pub fn text_span(&self, source: &str) -> Option<Range<usize>> {
        if !self.children.is_empty() || self.has_markup {
            return None;
        }
        let raw = source.get(self.content.clone())?;
        let leading = raw.len() - raw.trim_start().len();
        let start = self.content.start + leading;
        Some(start..start + raw.trim().len())
    }

    pub fn text<'s>(&self, source: &'s str) -> Option<&'s str> {
        self.text_span(source).and_then(|span| source.get(span))
    }

    pub fn child_text<'s>(&self, name: &str, source: &'s str) -> Option<&'s str> {
        self.child(name).and_then(|c| c.text(source))
    }
}

const BOM: char = '\u{feff}';

/// Parse `source` into its root element. Spans index into `source` itself,
/// including a leading byte order mark when there is one.
pub fn parse_document(source: &str) -> Result<XmlElement> {
    let body = source.strip_prefix(BOM).unwrap_or(source);
    let shift = source.len() - body.len();
    let mut reader = Reader::from_str(body);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let before = shift + reader.buffer_position() as usize;
        let event = reader.read_event().map_err(|e| {
            PomupError::ManifestParsing(format!(
                "malformed XML near byte {}: {}",
                shift + reader.error_position() as usize,
                e
            ))
        })?;

        match event {
            Event::Start(start) => {
                let name = element_name(start.local_name().as_ref())?;
                let after = shift + reader.buffer_position() as usize;
                stack.push(XmlElement::new(name, after));
            }
            Event::Empty(empty) => {
                let name = element_name(empty.local_name().as_ref())?;
                let after = shift + reader.buffer_position() as usize;
                attach(&mut stack, &mut root, XmlElement::new(name, after));
            }
            Event::End(_) => {
                let mut element = stack.pop().ok_or_else(|| {
                    PomupError::ManifestParsing(format!("unexpected end tag at byte {before}"))
                })?;
                element.content.end = before;
                attach(&mut stack, &mut root, element);
            }
            Event::Comment(_) | Event::CData(_) | Event::PI(_) => {
                if let Some(open) = stack.last_mut() {
                    open.has_markup = true;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(PomupError::ManifestParsing(format!(
            "element <{}> is never closed",
            open.name
        )));
    }

    root.ok_or_else(|| PomupError::ManifestParsing("document has no root element".to_string()))
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

fn element_name(raw: &[u8]) -> Result<String> {
    std::str::from_utf8(raw)
        .map(str::to_string)
        .map_err(|e| PomupError::ManifestParsing(format!("element name is not UTF-8: {e}")))
}
