//! Callout boxes → labelled block quotes.

use crate::config::{CalloutKind, TransformConfig};
use crate::dom::{Element, Node};

use super::NodeTransformer;

/// Elements that force a line break inside callout text.
const LINE_BREAKING: &[&str] = &[
    "p", "div", "br", "li", "ul", "ol", "pre", "h1", "h2", "h3", "h4", "h5", "h6", "section",
    "blockquote", "table", "tr",
];

#[derive(Debug, Clone)]
pub struct CalloutTransformer {
    tags: Vec<String>,
    kinds: Vec<CalloutKind>,
    default_label: String,
}

impl CalloutTransformer {
    pub fn new(config: &TransformConfig) -> Self {
        Self {
            tags: config.callout_tags.clone(),
            kinds: config.callout_kinds.clone(),
            default_label: config.default_callout_label.clone(),
        }
    }

    fn class_string(el: &Element) -> String {
        el.classes()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Label for a callout; the first keyword found in the class names wins.
    pub fn label(&self, el: &Element) -> &str {
        let classes = Self::class_string(el);
        self.kinds
            .iter()
            .find(|kind| classes.contains(kind.keyword.as_str()))
            .map_or(self.default_label.as_str(), |kind| kind.label.as_str())
    }

    /// Build the block quote that replaces a callout element.
    pub fn quote(&self, el: &Element) -> Node {
        let mut quote =
            Element::new("blockquote").with_child(Element::new("strong").with_text(self.label(el)));
        for line in text_lines(el) {
            quote = quote.with_child(Element::new("br")).with_text(line);
        }
        quote.into()
    }
}

impl Default for CalloutTransformer {
    fn default() -> Self {
        Self::new(&TransformConfig::default())
    }
}

impl NodeTransformer for CalloutTransformer {
    fn name(&self) -> &'static str {
        "callout"
    }

    fn applies_to(&self, el: &Element) -> bool {
        if !self.tags.iter().any(|t| *t == el.tag) {
            return false;
        }
        let classes = Self::class_string(el);
        self.kinds
            .iter()
            .any(|kind| classes.contains(kind.keyword.as_str()))
    }

    fn transform(&self, el: &Element, _preceding: Option<&Node>) -> Vec<Node> {
        vec![self.quote(el)]
    }
}

/// Non-empty text lines of an element, with whitespace inside each line collapsed.
fn text_lines(el: &Element) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    collect_lines(el, &mut lines, &mut current);
    flush(&mut lines, &mut current);
    lines
}

fn flush(lines: &mut Vec<String>, current: &mut String) {
    let line = current.split_whitespace().collect::<Vec<_>>().join(" ");
    if !line.is_empty() {
        lines.push(line);
    }
    current.clear();
}

fn collect_lines(el: &Element, lines: &mut Vec<String>, current: &mut String) {
    for child in &el.children {
        match child {
            Node::Text(text) => current.push_str(text),
            Node::Element(child) if child.tag == "pre" => {
                flush(lines, current);
                for line in child.text_content().lines() {
                    current.push_str(line);
                    flush(lines, current);
                }
            }
            Node::Element(child) => {
                let breaks = LINE_BREAKING.contains(&child.tag.as_str());
                if breaks {
                    flush(lines, current);
                }
                collect_lines(child, lines, current);
                if breaks {
                    flush(lines, current);
                }
            }
        }
    }
}
