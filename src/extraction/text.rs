//! Text rendering and normalization

use ego_tree::iter::Edge;
use scraper::{ElementRef, Node};

/// Elements that start a new line in rendered text
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "caption", "dd", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table",
    "tbody", "tfoot", "thead", "tr", "ul",
];

/// Elements whose contents are never rendered
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Collapse every whitespace run to a single space and trim both ends.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep at most `max_chars` characters of `s`.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Rendered text of one element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockText {
    /// Non-empty normalized lines, in document order
    pub lines: Vec<String>,
    /// Whole rendering, normalized to one line
    pub normalized: String,
}

impl BlockText {
    /// Normalized length in characters
    pub fn char_len(&self) -> usize {
        self.normalized.chars().count()
    }
}

/// Render the visible text of `element`, breaking lines at block boundaries.
pub fn render_block(element: ElementRef<'_>) -> BlockText {
    let raw = render_raw(element);

    let lines: Vec<String> = raw
        .split('\n')
        .map(normalize_text)
        .filter(|line| !line.is_empty())
        .collect();
    let normalized = normalize_text(&raw);

    BlockText { lines, normalized }
}

fn render_raw(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    let mut hidden_depth = 0usize;

    for edge in element.traverse() {
        match edge {
            Edge::Open(node) => match node.value() {
                Node::Element(elem) => {
                    let name = elem.name();
                    if HIDDEN_ELEMENTS.contains(&name) {
                        hidden_depth += 1;
                    } else if hidden_depth == 0 && (name == "br" || BLOCK_ELEMENTS.contains(&name)) {
                        out.push('\n');
                    }
                }
                Node::Text(text) if hidden_depth == 0 => out.push_str(text),
                _ => {}
            },
            Edge::Close(node) => {
                if let Node::Element(elem) = node.value() {
                    let name = elem.name();
                    if HIDDEN_ELEMENTS.contains(&name) {
                        hidden_depth = hidden_depth.saturating_sub(1);
                    } else if hidden_depth == 0 {
                        if BLOCK_ELEMENTS.contains(&name) {
                            out.push('\n');
                        } else if name == "td" || name == "th" {
                            out.push(' ');
                        }
                    }
                }
            }
        }
    }

    out
}
