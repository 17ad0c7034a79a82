//! Inner markup: element fragments ↔ scene subtrees.
//!
//! Built on `winnow` 0.7. Handles nested elements, quoted attributes,
//! `id`/`style` extraction, void elements, comments and the common
//! character entities. Text directly inside an element becomes that
//! element's own text; its position relative to child elements is not kept.

use crate::id::ElementId;
use crate::model::{ElementRegistry, NodeStyle, PositionMode, SceneGraph};
use petgraph::graph::NodeIndex;
use std::fmt::Write;
use thiserror::Error;
use winnow::ascii::multispace0;
use winnow::combinator::{alt, delimited, preceded};
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::{take_till, take_until, take_while};

/// Elements that never have content or a closing tag.
const VOID_TAGS: &[&str] = &["input", "br", "hr", "img", "link", "meta"];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarkupError {
    #[error("syntax error at byte {offset}: expected {expected}")]
    Syntax { offset: usize, expected: &'static str },
    #[error("closing tag </{found}> does not match <{expected}>")]
    MismatchedClose { expected: String, found: String },
    #[error("closing tag </{0}> without an open element")]
    UnexpectedClose(String),
    #[error("element <{0}> is never closed")]
    Unclosed(String),
    #[error("invalid value for style property `{property}`: {value:?}")]
    InvalidStyle { property: String, value: String },
    #[error("node is not part of the scene")]
    UnknownNode,
}

/// A parsed element, before it is inserted into a scene.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkupElement {
    pub tag: String,
    pub id: Option<String>,
    pub attributes: Vec<(String, String)>,
    pub style: NodeStyle,
    pub text: String,
    pub children: Vec<MarkupElement>,
}

/// The content of one element: its own text and its child elements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkupFragment {
    pub text: String,
    pub elements: Vec<MarkupElement>,
}

/// Parse an inner-markup string.
pub fn parse_fragment(input: &str) -> Result<MarkupFragment, MarkupError> {
    let mut rest = input;
    let (text, elements) = parse_content(input, &mut rest, None)?;
    Ok(MarkupFragment { text, elements })
}

/// Parse an inline `style` attribute value. Unknown properties are ignored.
pub fn parse_style(value: &str) -> Result<NodeStyle, MarkupError> {
    let mut style = NodeStyle::default();
    for decl in value.split(';') {
        let Some((property, raw)) = decl.split_once(':') else {
            continue;
        };
        let property = property.trim().to_ascii_lowercase();
        let raw = raw.trim();
        let invalid = || MarkupError::InvalidStyle {
            property: property.clone(),
            value: raw.to_string(),
        };
        match property.as_str() {
            "position" => style.position = PositionMode::parse(raw).ok_or_else(invalid)?,
            "left" => style.left = Some(parse_length(raw).ok_or_else(invalid)?),
            "top" => style.top = Some(parse_length(raw).ok_or_else(invalid)?),
            "width" => style.width = Some(parse_length(raw).ok_or_else(invalid)?),
            "height" => style.height = Some(parse_length(raw).ok_or_else(invalid)?),
            _ => log::trace!("ignoring style property `{property}`"),
        }
    }
    Ok(style)
}

/// Format the style record as an inline `style` attribute value.
#[must_use]
pub fn format_style(style: &NodeStyle) -> String {
    let mut decls = Vec::new();
    if style.position != PositionMode::Static {
        decls.push(format!("position: {}", style.position.as_str()));
    }
    let lengths = [
        ("left", style.left),
        ("top", style.top),
        ("width", style.width),
        ("height", style.height),
    ];
    for (name, value) in lengths {
        if let Some(v) = value {
            decls.push(format!("{name}: {v}px"));
        }
    }
    decls.join("; ")
}

// ─── Scene integration ──────────────────────────────────────────────────

impl SceneGraph {
    /// Serialize the content of `idx` (own text, then child elements).
    #[must_use]
    pub fn inner_markup(&self, idx: NodeIndex) -> String {
        let mut out = String::with_capacity(256);
        let Some(node) = self.node(idx) else {
            return out;
        };
        escape_into(&mut out, &node.text, false);
        for &child in self.children(idx) {
            emit_element(&mut out, self, child);
        }
        out
    }

    /// Replace the content of `idx` with parsed markup.
    ///
    /// Capabilities of new nodes are resolved through `registry`. On error
    /// the scene is left untouched.
    pub fn set_inner_markup(
        &mut self,
        idx: NodeIndex,
        markup: &str,
        registry: &ElementRegistry,
    ) -> Result<(), MarkupError> {
        if !self.contains(idx) {
            return Err(MarkupError::UnknownNode);
        }
        let fragment = parse_fragment(markup)?;

        for child in self.children(idx).to_vec() {
            self.remove_node(child);
        }
        if let Some(node) = self.node_mut(idx) {
            node.text = fragment.text;
        }
        let count = fragment.elements.len();
        for element in fragment.elements {
            self.insert_element(idx, element, registry);
        }
        log::debug!("replaced content of {idx:?} with {count} top-level elements");
        Ok(())
    }

    fn insert_element(
        &mut self,
        parent: NodeIndex,
        element: MarkupElement,
        registry: &ElementRegistry,
    ) -> NodeIndex {
        let mut node = registry.create(&element.tag);
        node.id = element.id.as_deref().map(ElementId::intern);
        node.text = element.text;
        node.attributes = element.attributes.into_iter().collect();
        node.style = element.style;

        let idx = self.add_node(parent, node);
        for child in element.children {
            self.insert_element(idx, child, registry);
        }
        idx
    }
}

fn emit_element(out: &mut String, graph: &SceneGraph, idx: NodeIndex) {
    let node = &graph.graph[idx];
    let tag = node.tag.as_str();

    let _ = write!(out, "<{tag}");
    if let Some(id) = node.id {
        emit_attribute(out, "id", id.as_str());
    }
    for (name, value) in &node.attributes {
        emit_attribute(out, name, value);
    }
    let style = format_style(&node.style);
    if !style.is_empty() {
        emit_attribute(out, "style", &style);
    }
    out.push('>');

    if VOID_TAGS.contains(&tag) {
        return;
    }
    escape_into(out, &node.text, false);
    for &child in graph.children(idx) {
        emit_element(out, graph, child);
    }
    let _ = write!(out, "</{tag}>");
}

fn emit_attribute(out: &mut String, name: &str, value: &str) {
    let _ = write!(out, " {name}=\"");
    escape_into(out, value, true);
    out.push('"');
}

fn escape_into(out: &mut String, s: &str, attribute: bool) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

// ─── Content parser ─────────────────────────────────────────────────────

fn parse_content(
    source: &str,
    rest: &mut &str,
    parent: Option<&str>,
) -> Result<(String, Vec<MarkupElement>), MarkupError> {
    let mut text = String::new();
    let mut elements = Vec::new();

    loop {
        let chunk = text_run(rest).trim();
        if !chunk.is_empty() {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(&decode_entities(chunk));
        }

        if rest.is_empty() {
            return match parent {
                Some(tag) => Err(MarkupError::Unclosed(tag.to_string())),
                None => Ok((text, elements)),
            };
        }

        let offset = source.len() - rest.len();

        if rest.starts_with("<!--") {
            comment
                .parse_next(rest)
                .map_err(|_| MarkupError::Syntax {
                    offset,
                    expected: "end of comment",
                })?;
            continue;
        }

        if rest.starts_with("</") {
            let found = close_tag.parse_next(rest).map_err(|_| MarkupError::Syntax {
                offset,
                expected: "closing tag",
            })?;
            return match parent {
                Some(expected) if expected.eq_ignore_ascii_case(found) => Ok((text, elements)),
                Some(expected) => Err(MarkupError::MismatchedClose {
                    expected: expected.to_string(),
                    found: found.to_string(),
                }),
                None => Err(MarkupError::UnexpectedClose(found.to_string())),
            };
        }

        let open = open_tag.parse_next(rest).map_err(|_| MarkupError::Syntax {
            offset,
            expected: "element",
        })?;

        let mut element = MarkupElement {
            tag: open.name.to_ascii_lowercase(),
            ..Default::default()
        };
        for (name, value) in open.attributes {
            if name.eq_ignore_ascii_case("id") {
                element.id = Some(value);
            } else if name.eq_ignore_ascii_case("style") {
                element.style = parse_style(&value)?;
            } else {
                element.attributes.push((name, value));
            }
        }

        if !open.self_closing && !VOID_TAGS.contains(&element.tag.as_str()) {
            let (inner_text, children) = parse_content(source, rest, Some(element.tag.as_str()))?;
            element.text = inner_text;
            element.children = children;
        }
        elements.push(element);
    }
}

struct OpenTag<'a> {
    name: &'a str,
    attributes: Vec<(String, String)>,
    self_closing: bool,
}

fn text_run<'a>(input: &mut &'a str) -> &'a str {
    let run: Result<&str, ContextError> = take_till(0.., '<').parse_next(input);
    run.unwrap_or_default()
}

fn skip_space(input: &mut &str) {
    let _: Result<&str, ContextError> = multispace0.parse_next(input);
}

fn tag_name<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_').parse_next(input)
}

fn attribute_name<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., |c: char| {
        !c.is_whitespace() && !matches!(c, '=' | '>' | '<' | '/' | '"' | '\'')
    })
    .parse_next(input)
}

fn attribute_value<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    alt((
        delimited('"', take_till(0.., '"'), '"'),
        delimited('\'', take_till(0.., '\''), '\''),
    ))
    .parse_next(input)
}

fn attribute(input: &mut &str) -> ModalResult<(String, String)> {
    let name = attribute_name.parse_next(input)?;
    skip_space(input);
    if !input.starts_with('=') {
        return Ok((name.to_string(), String::new()));
    }
    let _ = '='.parse_next(input)?;
    skip_space(input);
    let value = attribute_value.parse_next(input)?;
    Ok((name.to_string(), decode_entities(value)))
}

fn open_tag<'a>(input: &mut &'a str) -> ModalResult<OpenTag<'a>> {
    let name = preceded('<', tag_name).parse_next(input)?;
    let mut attributes = Vec::new();
    loop {
        skip_space(input);
        if input.starts_with("/>") {
            let _ = "/>".parse_next(input)?;
            return Ok(OpenTag {
                name,
                attributes,
                self_closing: true,
            });
        }
        if input.starts_with('>') {
            let _ = '>'.parse_next(input)?;
            return Ok(OpenTag {
                name,
                attributes,
                self_closing: false,
            });
        }
        attributes.push(attribute.parse_next(input)?);
    }
}

fn close_tag<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    let name = preceded("</", tag_name).parse_next(input)?;
    skip_space(input);
    let _ = '>'.parse_next(input)?;
    Ok(name)
}

fn comment(input: &mut &str) -> ModalResult<()> {
    delimited("<!--", take_until(0.., "-->"), "-->")
        .void()
        .parse_next(input)
}

fn parse_length(raw: &str) -> Option<f64> {
    let number = raw.strip_suffix("px").unwrap_or(raw).trim();
    number.parse::<f64>().ok().filter(|n| n.is_finite())
}
