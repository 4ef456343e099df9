//! The generic markup tree templates are compiled from, and a small parser
//! producing it from HTML-like text.
//!
//! The parser understands elements, quoted, unquoted and bare attributes,
//! self-closing and void elements, comments, and the basic character
//! entities. Text consisting only of whitespace is dropped.

use thiserror::Error;

use crate::error::{Error, Result};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarkupError {
    #[error("unexpected end of markup, expected {expected}")]
    UnexpectedEof { expected: String },

    #[error("closing tag </{found}> at byte {offset} does not match {expected}")]
    MismatchedClose {
        expected: String,
        found: String,
        offset: usize,
    },

    #[error("malformed tag at byte {offset}")]
    MalformedTag { offset: usize },

    #[error("malformed attribute at byte {offset}")]
    MalformedAttribute { offset: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn element_children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }
}

/// Parse a fragment into its top-level nodes.
pub fn parse_fragment(source: &str) -> Result<Vec<Node>, MarkupError> {
    Parser { src: source, pos: 0 }.nodes(None)
}

/// Parse a template with a single root element.
///
/// Extra root elements are a configuration mistake: they are reported and
/// ignored, and the first root is used.
pub fn parse_template(source: &str) -> Result<Element> {
    let mut roots = parse_fragment(source)?
        .into_iter()
        .filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        });
    let root = roots.next().ok_or(Error::EmptyTemplate)?;
    let extra = roots.count();
    if extra > 0 {
        tracing::warn!(
            tag = %root.tag,
            extra,
            "templates must have only one root element, ignoring the rest"
        );
    }
    Ok(root)
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub(crate) fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|void| void.eq_ignore_ascii_case(tag))
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn nodes(&mut self, parent: Option<&str>) -> Result<Vec<Node>, MarkupError> {
        let mut nodes = Vec::new();
        loop {
            let rest = self.rest();
            if rest.is_empty() {
                return match parent {
                    Some(tag) => Err(MarkupError::UnexpectedEof {
                        expected: format!("</{tag}>"),
                    }),
                    None => Ok(nodes),
                };
            }
            if rest.starts_with("<!--") {
                let end = rest.find("-->").ok_or_else(|| MarkupError::UnexpectedEof {
                    expected: "-->".to_string(),
                })?;
                self.pos += end + 3;
            } else if rest.starts_with("</") {
                let offset = self.pos;
                self.pos += 2;
                let found = self.name();
                self.skip_whitespace();
                self.expect('>')?;
                return match parent {
                    Some(tag) if tag.eq_ignore_ascii_case(&found) => Ok(nodes),
                    _ => Err(MarkupError::MismatchedClose {
                        expected: parent.map_or_else(
                            || "no open element".to_string(),
                            |tag| format!("<{tag}>"),
                        ),
                        found,
                        offset,
                    }),
                };
            } else if self.at_open_tag() {
                nodes.push(Node::Element(self.element()?));
            } else {
                let text = self.text();
                if !text.trim().is_empty() {
                    nodes.push(Node::Text(decode_entities(text)));
                }
            }
        }
    }

    fn element(&mut self) -> Result<Element, MarkupError> {
        let offset = self.pos;
        self.pos += 1;
        let tag = self.name();
        if tag.is_empty() {
            return Err(MarkupError::MalformedTag { offset });
        }
        let mut element = Element::new(tag);
        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.starts_with("/>") {
                self.pos += 2;
                return Ok(element);
            }
            if rest.starts_with('>') {
                self.pos += 1;
                break;
            }
            if rest.is_empty() {
                return Err(MarkupError::UnexpectedEof {
                    expected: ">".to_string(),
                });
            }
            let attribute_offset = self.pos;
            let name = self.attribute_name();
            if name.is_empty() {
                return Err(MarkupError::MalformedAttribute {
                    offset: attribute_offset,
                });
            }
            self.skip_whitespace();
            let value = if self.rest().starts_with('=') {
                self.pos += 1;
                self.skip_whitespace();
                self.attribute_value()?
            } else {
                String::new()
            };
            element.attributes.push(Attribute {
                name: name.to_string(),
                value,
            });
        }
        if !is_void(&element.tag) {
            element.children = self.nodes(Some(&element.tag))?;
        }
        Ok(element)
    }

    fn at_open_tag(&self) -> bool {
        let mut chars = self.rest().chars();
        chars.next() == Some('<') && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
    }

    fn name(&mut self) -> String {
        self.take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
            .to_string()
    }

    fn attribute_name(&mut self) -> &'a str {
        self.take_while(|c| !c.is_whitespace() && !matches!(c, '=' | '>' | '/' | '"' | '\''))
    }

    fn attribute_value(&mut self) -> Result<String, MarkupError> {
        let rest = self.rest();
        match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let end = rest[1..]
                    .find(quote)
                    .ok_or_else(|| MarkupError::UnexpectedEof {
                        expected: format!("closing {quote}"),
                    })?;
                let value = &rest[1..1 + end];
                self.pos += end + 2;
                Ok(decode_entities(value))
            }
            Some(_) => {
                let value = self.take_while(|c| !c.is_whitespace() && c != '>');
                Ok(decode_entities(value.trim_end_matches('/')))
            }
            None => Err(MarkupError::UnexpectedEof {
                expected: "attribute value".to_string(),
            }),
        }
    }

    fn text(&mut self) -> &'a str {
        let start = self.pos;
        // A `<` that does not open a tag is literal text.
        loop {
            self.pos += self.rest().chars().next().map_or(0, char::len_utf8);
            let rest = self.rest();
            if rest.is_empty()
                || self.at_open_tag()
                || rest.starts_with("</")
                || rest.starts_with("<!--")
            {
                break;
            }
        }
        &self.src[start..self.pos]
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest.find(|c: char| !pred(c)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    fn skip_whitespace(&mut self) {
        self.take_while(char::is_whitespace);
    }

    fn expect(&mut self, c: char) -> Result<(), MarkupError> {
        if self.rest().starts_with(c) {
            self.pos += c.len_utf8();
            Ok(())
        } else {
            Err(MarkupError::MalformedTag { offset: self.pos })
        }
    }
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
