// crates/rich-text/src/parser.rs
//! Allow-list parser for stored rich text

use crate::document::{ElementKind, Node, RichDocument};
use crate::error::{RichTextError, RichTextResult};
use crate::style::StyleClass;
use log::warn;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Elements that never have content, with or without a closing slash
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Image sources that may be rendered
const IMAGE_SCHEMES: &[&str] = &["http://", "https://", "data:image/"];

/// How an open element contributes to the tree
enum Slot {
    Keep(ElementKind, Vec<Node>),
    /// Element dropped, content kept in the parent
    Unwrap,
    /// Element and content dropped
    Discard,
}

struct Frame {
    tag: String,
    slot: Slot,
}

#[derive(Default)]
struct TreeBuilder {
    root: Vec<Node>,
    stack: Vec<Frame>,
}

impl TreeBuilder {
    fn append(&mut self, node: Node) {
        if self
            .stack
            .iter()
            .any(|frame| matches!(frame.slot, Slot::Discard))
        {
            return;
        }

        for frame in self.stack.iter_mut().rev() {
            if let Slot::Keep(_, children) = &mut frame.slot {
                children.push(node);
                return;
            }
        }
        self.root.push(node);
    }

    fn close(&mut self, frame: Frame) {
        if let Slot::Keep(kind, children) = frame.slot {
            self.append(Node::Element { kind, children });
        }
    }

    /// Closes `tag` and every element left open inside it.
    /// A closing tag with no open counterpart is ignored.
    fn end(&mut self, tag: &str) {
        if let Some(pos) = self.stack.iter().rposition(|frame| frame.tag == tag) {
            self.close_above(pos);
        }
    }

    /// Closes open elements innermost first, so each lands in its parent
    fn close_above(&mut self, depth: usize) {
        while self.stack.len() > depth {
            if let Some(frame) = self.stack.pop() {
                self.close(frame);
            }
        }
    }

    fn start(&mut self, element: &BytesStart<'_>, self_closing: bool) {
        let tag = tag_name(element.name().as_ref());

        match tag.as_str() {
            "br" => self.append(Node::LineBreak),
            "img" => {
                if let Some(src) = attribute(element, "src").filter(|src| is_allowed_image(src)) {
                    let alt = attribute(element, "alt").filter(|alt| !alt.is_empty());
                    self.append(Node::Image { src, alt });
                }
            }
            t if VOID_ELEMENTS.contains(&t) => {}
            _ => {
                let slot = classify(&tag, element);
                if self_closing {
                    self.close(Frame { tag, slot });
                } else {
                    self.stack.push(Frame { tag, slot });
                }
            }
        }
    }

    fn finish(mut self) -> RichDocument {
        self.close_above(0);
        RichDocument { nodes: self.root }
    }
}

fn classify(tag: &str, element: &BytesStart<'_>) -> Slot {
    if let Some(kind) = ElementKind::from_tag(tag) {
        return Slot::Keep(kind, Vec::new());
    }

    match tag {
        "script" | "style" => Slot::Discard,
        "div" | "span" => match single_style(element) {
            Some(style) => Slot::Keep(ElementKind::Styled(style), Vec::new()),
            None => Slot::Unwrap,
        },
        _ => Slot::Unwrap,
    }
}

/// The element's style when its class list names exactly one known class
fn single_style(element: &BytesStart<'_>) -> Option<StyleClass> {
    let classes = attribute(element, "class")?;
    let mut known = classes.split_whitespace().filter_map(StyleClass::from_class_name);
    match (known.next(), known.next()) {
        (Some(style), None) => Some(style),
        _ => None,
    }
}

fn is_allowed_image(src: &str) -> bool {
    let src = src.trim().to_ascii_lowercase();
    IMAGE_SCHEMES.iter().any(|scheme| src.starts_with(scheme))
}

fn tag_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).to_ascii_lowercase()
}

fn attribute(element: &BytesStart<'_>, name: &str) -> Option<String> {
    element
        .html_attributes()
        .with_checks(false)
        .flatten()
        .find(|attr| attr.key.as_ref().eq_ignore_ascii_case(name.as_bytes()))
        .map(|attr| match attr.unescape_value_with(resolve_entity) {
            Ok(value) => value.into_owned(),
            Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
        })
}

/// Named entities that appear in hand-written content but are not XML
fn html_entity(name: &str) -> Option<&'static str> {
    match name {
        "nbsp" => Some("\u{a0}"),
        "copy" => Some("©"),
        "hellip" => Some("…"),
        "mdash" => Some("—"),
        "ndash" => Some("–"),
        _ => None,
    }
}

/// XML's predefined entities first, then the HTML extras
fn resolve_entity(name: &str) -> Option<&'static str> {
    resolve_predefined_entity(name).or_else(|| html_entity(name))
}

/// Tokenizes `input` into `builder`, stopping at the first syntax error
fn build(input: &str, builder: &mut TreeBuilder) -> RichTextResult<()> {
    let mut reader = Reader::from_str(input);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    loop {
        let position = reader.buffer_position() as u64;
        match reader.read_event() {
            Ok(Event::Start(e)) => builder.start(&e, false),
            Ok(Event::Empty(e)) => builder.start(&e, true),
            Ok(Event::End(e)) => builder.end(&tag_name(e.name().as_ref())),
            Ok(Event::Text(e)) => {
                let text = match e.unescape_with(resolve_entity) {
                    Ok(text) => text.into_owned(),
                    Err(_) => String::from_utf8_lossy(&e).into_owned(),
                };
                if !text.is_empty() {
                    builder.append(Node::Text(text));
                }
            }
            Ok(Event::CData(e)) => {
                builder.append(Node::Text(String::from_utf8_lossy(&e).into_owned()));
            }
            Ok(Event::Eof) => return Ok(()),
            Err(e) => return Err(RichTextError::malformed(position, e)),
            // comments, declarations, processing instructions
            _ => {}
        }
    }
}

impl RichDocument {
    /// Parses stored rich text. Markup after a syntax error is dropped and
    /// everything before it is kept.
    pub fn parse(input: &str) -> Self {
        let mut builder = TreeBuilder::default();
        if let Err(e) = build(input, &mut builder) {
            warn!("Dropping malformed rich text tail: {}", e);
        }
        builder.finish()
    }

    /// Like [`RichDocument::parse`] but fails instead of truncating
    pub fn parse_strict(input: &str) -> RichTextResult<Self> {
        let mut builder = TreeBuilder::default();
        build(input, &mut builder)?;
        Ok(builder.finish())
    }
}

/// Parses and re-renders `input` through the allow-list
pub fn sanitize(input: &str) -> String {
    RichDocument::parse(input).render()
}
