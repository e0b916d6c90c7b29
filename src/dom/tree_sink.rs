//! html5ever TreeSink implementation for ArenaDom.

use std::borrow::Cow;
use std::cell::RefCell;

use html5ever::driver::ParseOpts;
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute, QualName, parse_document};

use super::arena::{ArenaDom, ArenaNodeData, ArenaNodeId};
use super::node::PageTree;

/// Handle the tree builder uses to reference arena nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeHandle(pub ArenaNodeId);

/// Tree sink building an [`ArenaDom`].
///
/// `TreeSink` methods take `&self`, so the arena sits behind a `RefCell`.
pub struct ArenaSink {
    dom: RefCell<ArenaDom>,
    quirks_mode: RefCell<QuirksMode>,
    parse_errors: RefCell<usize>,
}

impl Default for ArenaSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ArenaSink {
    pub fn new() -> Self {
        Self {
            dom: RefCell::new(ArenaDom::new()),
            quirks_mode: RefCell::new(QuirksMode::NoQuirks),
            parse_errors: RefCell::new(0),
        }
    }

    pub fn quirks_mode(&self) -> QuirksMode {
        *self.quirks_mode.borrow()
    }

    /// Number of recoverable parse errors html5ever reported.
    pub fn parse_errors(&self) -> usize {
        *self.parse_errors.borrow()
    }

    /// Consume the sink and return the DOM.
    pub fn into_dom(self) -> ArenaDom {
        self.dom.into_inner()
    }
}

/// Parse HTML markup into an owned page tree.
///
/// Parsing never fails: malformed markup is repaired the way browsers do.
pub fn parse_html(html: &str) -> PageTree {
    let sink = parse_document(ArenaSink::new(), ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes());
    let errors = sink.parse_errors();
    if errors > 0 {
        tracing::debug!(errors, quirks = ?sink.quirks_mode(), "recovered from malformed markup");
    }
    sink.into_dom().into_tree()
}

impl TreeSink for ArenaSink {
    type Handle = NodeHandle;
    type Output = Self;
    type ElemName<'a>
        = &'a QualName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        self
    }

    fn parse_error(&self, _msg: Cow<'static, str>) {
        *self.parse_errors.borrow_mut() += 1;
    }

    fn get_document(&self) -> Self::Handle {
        NodeHandle(self.dom.borrow().document())
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        static EMPTY: QualName = QualName {
            prefix: None,
            ns: html5ever::ns!(),
            local: html5ever::local_name!(""),
        };

        let dom = self.dom.borrow();
        match dom.get(target.0).map(|n| &n.data) {
            Some(ArenaNodeData::Element { name, .. }) => {
                let name: &QualName = name;
                // SAFETY: names are boxed, never mutated and never freed while
                // the sink is alive, so the heap address outlives the RefCell
                // guard.
                unsafe { std::mem::transmute::<&QualName, &'a QualName>(name) }
            }
            _ => &EMPTY,
        }
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        let attrs = attrs
            .into_iter()
            .map(|a| (a.name.local.as_ref().to_string(), a.value.to_string()))
            .collect();
        NodeHandle(self.dom.borrow_mut().create_element(name, attrs))
    }

    fn create_comment(&self, _text: StrTendril) -> Self::Handle {
        NodeHandle(self.dom.borrow_mut().create_other())
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> Self::Handle {
        NodeHandle(self.dom.borrow_mut().create_other())
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        let mut dom = self.dom.borrow_mut();
        match child {
            NodeOrText::AppendNode(node) => dom.append(parent.0, node.0),
            NodeOrText::AppendText(text) => dom.append_text(parent.0, &text),
        }
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        let parent = self.dom.borrow().get(element.0).and_then(|n| n.parent);
        match parent {
            Some(parent) => self.append(&NodeHandle(parent), child),
            None => self.append(prev_element, child),
        }
    }

    fn append_doctype_to_document(
        &self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
        let mut dom = self.dom.borrow_mut();
        let doc = dom.document();
        let doctype = dom.create_other();
        dom.append(doc, doctype);
    }

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        *target
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        x.0 == y.0
    }

    fn set_quirks_mode(&self, mode: QuirksMode) {
        *self.quirks_mode.borrow_mut() = mode;
    }

    fn append_before_sibling(&self, sibling: &Self::Handle, new_node: NodeOrText<Self::Handle>) {
        let mut dom = self.dom.borrow_mut();
        let node = match new_node {
            NodeOrText::AppendNode(node) => node.0,
            NodeOrText::AppendText(text) => {
                // Merge into a text node directly before the sibling.
                let parent = dom.get(sibling.0).and_then(|n| n.parent);
                let prev = parent.and_then(|p| {
                    let siblings = dom.children(p);
                    let at = siblings.iter().position(|&c| c == sibling.0)?;
                    at.checked_sub(1).map(|i| siblings[i])
                });
                if let Some(prev) = prev
                    && let Some(node) = dom.get_mut(prev)
                    && let ArenaNodeData::Text(existing) = &mut node.data
                {
                    existing.push_str(&text);
                    return;
                }
                dom.create_text(text.to_string())
            }
        };
        dom.insert_before(sibling.0, node);
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<Attribute>) {
        let mut dom = self.dom.borrow_mut();
        if let Some(node) = dom.get_mut(target.0)
            && let ArenaNodeData::Element {
                attrs: existing, ..
            } = &mut node.data
        {
            for attr in attrs {
                let name = attr.name.local.as_ref();
                if !existing.iter().any(|(n, _)| n == name) {
                    existing.push((name.to_string(), attr.value.to_string()));
                }
            }
        }
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        self.dom.borrow_mut().detach(target.0);
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        let mut dom = self.dom.borrow_mut();
        let children = dom.children(node.0).to_vec();
        for child in children {
            dom.append(new_parent.0, child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Node;

    fn find<'a>(node: &'a Node, tag: &str) -> Option<&'a Node> {
        if node.is_tag(tag) {
            return Some(node);
        }
        node.as_element()?
            .children
            .iter()
            .find_map(|child| find(child, tag))
    }

    #[test]
    fn test_basic_parse() {
        let tree = parse_html("<html><body><p>Hello</p></body></html>");
        let p = find(&tree.root, "p").expect("should find p");
        assert_eq!(p.text_content(), "Hello");
    }

    #[test]
    fn test_attributes() {
        let tree = parse_html(r#"<div id="main" class="container header">Content</div>"#);
        let div = find(&tree.root, "div").and_then(Node::as_element).unwrap();
        assert_eq!(div.attr("id"), Some("main"));
        assert!(div.has_class("container"));
        assert!(div.has_class("header"));
    }

    #[test]
    fn test_comments_dropped() {
        let tree = parse_html("<body><!-- hidden --><p>shown</p></body>");
        let body = find(&tree.root, "body").and_then(Node::as_element).unwrap();
        assert_eq!(body.children.len(), 1);
    }

    #[test]
    fn test_misnested_markup_recovers() {
        let tree = parse_html("<p><b>bold<i>both</b>italic</i></p>");
        let p = find(&tree.root, "p").unwrap();
        assert_eq!(p.text_content(), "boldbothitalic");
    }
}
