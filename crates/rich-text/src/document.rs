// crates/rich-text/src/document.rs
//! Parsed rich text tree and its safe rendering

use crate::style::StyleClass;

/// An element kept by the allow-list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Paragraph,
    BulletList,
    OrderedList,
    ListItem,
    Strong,
    Emphasis,
    /// `div` or `span` carrying one known `rt-*` class
    Styled(StyleClass),
}

impl ElementKind {
    pub(crate) fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "p" => Some(Self::Paragraph),
            "ul" => Some(Self::BulletList),
            "ol" => Some(Self::OrderedList),
            "li" => Some(Self::ListItem),
            "strong" => Some(Self::Strong),
            "em" => Some(Self::Emphasis),
            _ => None,
        }
    }

    fn tag_name(&self) -> &'static str {
        match self {
            Self::Paragraph => "p",
            Self::BulletList => "ul",
            Self::OrderedList => "ol",
            Self::ListItem => "li",
            Self::Strong => "strong",
            Self::Emphasis => "em",
            Self::Styled(style) => style.tag_name(),
        }
    }

    fn is_block(&self) -> bool {
        match self {
            Self::Strong | Self::Emphasis => false,
            Self::Styled(style) => style.is_block(),
            _ => true,
        }
    }
}

/// A node of the rich text tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    LineBreak,
    Image { src: String, alt: Option<String> },
    Element { kind: ElementKind, children: Vec<Node> },
}

impl Node {
    fn render_into(&self, out: &mut String) {
        match self {
            Node::Text(text) => escape_into(text, out),
            Node::LineBreak => out.push_str("<br />"),
            Node::Image { src, alt } => {
                out.push_str("<img src=\"");
                escape_into(src, out);
                out.push('"');
                if let Some(alt) = alt {
                    out.push_str(" alt=\"");
                    escape_into(alt, out);
                    out.push('"');
                }
                out.push_str(" />");
            }
            Node::Element { kind, children } => {
                let tag = kind.tag_name();
                out.push('<');
                out.push_str(tag);
                if let ElementKind::Styled(style) = kind {
                    out.push_str(" class=\"");
                    out.push_str(style.class_name());
                    out.push('"');
                }
                out.push('>');
                for child in children {
                    child.render_into(out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    fn text_into(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::LineBreak => out.push('\n'),
            Node::Image { .. } => {}
            Node::Element { kind, children } => {
                let block = kind.is_block();
                if block {
                    out.push('\n');
                }
                for child in children {
                    child.text_into(out);
                }
                if block {
                    out.push('\n');
                }
            }
        }
    }
}

/// Rich text after allow-listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichDocument {
    pub(crate) nodes: Vec<Node>,
}

impl RichDocument {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Renders the tree back to markup. Text and attribute values are escaped;
    /// only allow-listed elements and attributes are emitted.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.render_into(&mut out);
        }
        out
    }

    /// Text content only, one line per block, blank lines removed
    pub fn plain_text(&self) -> String {
        let mut raw = String::new();
        for node in &self.nodes {
            node.text_into(&mut raw);
        }

        raw.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Single-line plain text cut to at most `max_chars` characters
    pub fn excerpt(&self, max_chars: usize) -> String {
        let flat = self.plain_text().split_whitespace().collect::<Vec<_>>().join(" ");
        if flat.chars().count() <= max_chars {
            return flat;
        }
        let mut cut: String = flat.chars().take(max_chars).collect();
        cut.push('…');
        cut
    }
}

fn escape_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}
