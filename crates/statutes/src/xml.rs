//! XML parsing for statute registry responses.
//!
//! Statute bodies arrive in two shapes: sometimes one element carries the
//! whole text, sometimes it is scattered across many leaf elements. Instead
//! of special-casing a tag name, every element's own text is collected in
//! document order, which covers both.
//!
//! "Own text" means the text between an element's start tag and its first
//! child (or end tag). Text following a child element is not attributed to
//! anything, matching how ElementTree-style parsers expose `.text`.

use lawdesk_core::{StatuteError, StatuteSummary};
use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;

/// One non-empty text run found in a registry payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNode {
    /// Slash-separated element names from the root, e.g. `DataRoot/ApplData/LawFullText`
    pub path: String,

    /// The element's own text, trimmed
    pub text: String,
}

/// Parse a `lawlists` response into statute summaries.
///
/// Every `LawNameListInfo` element at any depth contributes one entry. Its
/// `LawId`, `LawName` and `LawNo` children are required.
pub fn parse_law_list(xml: &[u8]) -> Result<Vec<StatuteSummary>, StatuteError> {
    let root = parse_tree(xml)?
        .ok_or_else(|| StatuteError::Parse("statute list response has no root element".into()))?;

    let mut entries = Vec::new();
    root.descendants("LawNameListInfo", &mut entries);

    entries
        .into_iter()
        .map(|info| {
            Ok(StatuteSummary {
                id: info.required_child_text("LawId")?,
                name: info.required_child_text("LawName")?,
                number: info.required_child_text("LawNo")?,
            })
        })
        .collect()
}

/// Collect every element's non-empty own text in pre-order.
///
/// An empty payload yields no nodes rather than an error.
pub fn collect_text_nodes(xml: &[u8]) -> Result<Vec<TextNode>, StatuteError> {
    let mut nodes = Vec::new();
    if let Some(root) = parse_tree(xml)? {
        let mut path = Vec::new();
        root.collect_text(&mut path, &mut nodes);
    }
    Ok(nodes)
}

/// Join collected text with newlines, in the order given.
pub fn join_text_nodes(nodes: &[TextNode]) -> String {
    nodes
        .iter()
        .map(|n| n.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// The flat text of a `lawdata` response.
pub fn extract_statute_text(xml: &[u8]) -> Result<String, StatuteError> {
    Ok(join_text_nodes(&collect_text_nodes(xml)?))
}

// --- Element tree ---

#[derive(Debug, Default)]
struct Element {
    name: String,
    /// Text before the first child, untrimmed
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn new(name: String) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    fn push_text(&mut self, text: &str) {
        if self.children.is_empty() {
            self.text.push_str(text);
        }
    }

    fn descendants<'a>(&'a self, name: &str, out: &mut Vec<&'a Element>) {
        for child in &self.children {
            if child.name == name {
                out.push(child);
            }
            child.descendants(name, out);
        }
    }

    fn required_child_text(&self, name: &str) -> Result<String, StatuteError> {
        self.children
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.text.trim().to_string())
            .ok_or_else(|| StatuteError::Parse(format!("{} is missing {name}", self.name)))
    }

    fn collect_text<'a>(&'a self, path: &mut Vec<&'a str>, out: &mut Vec<TextNode>) {
        path.push(self.name.as_str());
        let text = self.text.trim();
        if !text.is_empty() {
            out.push(TextNode {
                path: path.join("/"),
                text: text.to_string(),
            });
        }
        for child in &self.children {
            child.collect_text(path, out);
        }
        path.pop();
    }
}

fn parse_error(e: impl std::fmt::Display) -> StatuteError {
    StatuteError::Parse(e.to_string())
}

/// Build an element tree. Returns `None` when the input has no root element.
fn parse_tree(xml: &[u8]) -> Result<Option<Element>, StatuteError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            StatuteError::Parse(format!(
                "invalid XML at byte {}: {e}",
                reader.buffer_position()
            ))
        })?;

        match event {
            Event::Start(e) => {
                if root.is_some() {
                    return Err(StatuteError::Parse("content after the root element".into()));
                }
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                stack.push(Element::new(name));
            }
            Event::Empty(e) => {
                if root.is_some() {
                    return Err(StatuteError::Parse("content after the root element".into()));
                }
                let element = Element::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                attach(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| StatuteError::Parse("unexpected closing tag".into()))?;
                attach(&mut stack, &mut root, element);
            }
            Event::Text(e) => {
                if let Some(top) = stack.last_mut() {
                    let text = reader.decoder().decode(&e).map_err(parse_error)?;
                    top.push_text(&text);
                }
            }
            Event::CData(e) => {
                if let Some(top) = stack.last_mut() {
                    let text = reader.decoder().decode(&e).map_err(parse_error)?;
                    top.push_text(&text);
                }
            }
            Event::GeneralRef(e) => {
                if let Some(top) = stack.last_mut() {
                    let name = reader.decoder().decode(&e).map_err(parse_error)?;
                    top.push_text(&resolve_reference(&name)?);
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and doctypes carry no text
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(StatuteError::Parse(format!(
            "unexpected end of document inside <{}>",
            open.name
        )));
    }

    Ok(root)
}

/// Attach a finished element to its parent, or make it the root.
fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

/// Resolve `&name;` or a numeric character reference to its text.
fn resolve_reference(name: &str) -> Result<String, StatuteError> {
    if let Some(code) = name.strip_prefix('#') {
        let value = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => code.parse::<u32>(),
        }
        .map_err(|_| StatuteError::Parse(format!("invalid character reference &{name};")))?;

        return char::from_u32(value)
            .map(String::from)
            .ok_or_else(|| StatuteError::Parse(format!("invalid character reference &{name};")));
    }

    resolve_predefined_entity(name)
        .map(String::from)
        .ok_or_else(|| StatuteError::Parse(format!("undefined entity &{name};")))
}
