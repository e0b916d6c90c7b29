//! Build-time DOM that html5ever parses into.
//!
//! The tree builder needs stable handles, insertion before a sibling and
//! re-parenting, so parsing targets this index arena. Once parsing finishes
//! the arena is folded into the owned [`PageTree`](super::PageTree).

use html5ever::QualName;

use super::node::{Element, Node, PageTree};

/// Deepest element nesting kept when folding into a [`PageTree`]. Children
/// of elements beyond this depth are hoisted into the deepest kept ancestor,
/// so every later tree walk stays within a bounded stack.
pub const MAX_NESTING: usize = 256;

/// Index of a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaNodeId(usize);

#[derive(Debug, Clone)]
pub enum ArenaNodeData {
    Document,
    Element {
        /// Boxed so references handed to the tree builder survive arena growth.
        name: Box<QualName>,
        attrs: Vec<(String, String)>,
    },
    Text(String),
    /// Comments, doctypes and processing instructions; dropped on conversion.
    Other,
}

#[derive(Debug)]
pub struct ArenaNode {
    pub data: ArenaNodeData,
    pub parent: Option<ArenaNodeId>,
    pub children: Vec<ArenaNodeId>,
}

#[derive(Debug)]
pub struct ArenaDom {
    nodes: Vec<ArenaNode>,
}

impl ArenaDom {
    /// An arena holding only the document root.
    pub fn new() -> Self {
        let mut dom = Self { nodes: Vec::new() };
        dom.alloc(ArenaNodeData::Document);
        dom
    }

    fn alloc(&mut self, data: ArenaNodeData) -> ArenaNodeId {
        self.nodes.push(ArenaNode {
            data,
            parent: None,
            children: Vec::new(),
        });
        ArenaNodeId(self.nodes.len() - 1)
    }

    pub fn document(&self) -> ArenaNodeId {
        ArenaNodeId(0)
    }

    pub fn get(&self, id: ArenaNodeId) -> Option<&ArenaNode> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: ArenaNodeId) -> Option<&mut ArenaNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn create_element(&mut self, name: QualName, attrs: Vec<(String, String)>) -> ArenaNodeId {
        self.alloc(ArenaNodeData::Element {
            name: Box::new(name),
            attrs,
        })
    }

    pub fn create_text(&mut self, text: String) -> ArenaNodeId {
        self.alloc(ArenaNodeData::Text(text))
    }

    pub fn create_other(&mut self) -> ArenaNodeId {
        self.alloc(ArenaNodeData::Other)
    }

    /// Make `child` the last child of `parent`, moving it if already attached.
    pub fn append(&mut self, parent: ArenaNodeId, child: ArenaNodeId) {
        self.detach(child);
        if let Some(node) = self.get_mut(parent) {
            node.children.push(child);
        }
        if let Some(node) = self.get_mut(child) {
            node.parent = Some(parent);
        }
    }

    /// Place `node` directly before `sibling` under the sibling's parent.
    pub fn insert_before(&mut self, sibling: ArenaNodeId, node: ArenaNodeId) {
        self.detach(node);
        let Some(parent) = self.get(sibling).and_then(|n| n.parent) else {
            return;
        };
        if let Some(parent_node) = self.get_mut(parent) {
            let at = parent_node
                .children
                .iter()
                .position(|&c| c == sibling)
                .unwrap_or(parent_node.children.len());
            parent_node.children.insert(at, node);
        }
        if let Some(n) = self.get_mut(node) {
            n.parent = Some(parent);
        }
    }

    /// Extend a trailing text child, or add a new one.
    pub fn append_text(&mut self, parent: ArenaNodeId, text: &str) {
        let last = self.get(parent).and_then(|n| n.children.last().copied());
        if let Some(last) = last
            && let Some(ArenaNode {
                data: ArenaNodeData::Text(existing),
                ..
            }) = self.get_mut(last)
        {
            existing.push_str(text);
            return;
        }

        let node = self.create_text(text.to_string());
        self.append(parent, node);
    }

    /// Remove `target` from its parent's children.
    pub fn detach(&mut self, target: ArenaNodeId) {
        let Some(parent) = self.get_mut(target).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(node) = self.get_mut(parent) {
            node.children.retain(|&c| c != target);
        }
    }

    pub fn children(&self, parent: ArenaNodeId) -> &[ArenaNodeId] {
        self.get(parent)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    /// Fold the arena into an owned page tree, capping nesting at
    /// [`MAX_NESTING`].
    pub fn into_tree(self) -> PageTree {
        enum Step {
            Visit(ArenaNodeId),
            Close,
        }

        let mut roots = Vec::new();
        let mut open: Vec<Element> = Vec::new();
        let mut steps: Vec<Step> = self
            .children(self.document())
            .iter()
            .rev()
            .map(|&id| Step::Visit(id))
            .collect();
        let mut flattened = 0usize;

        while let Some(step) = steps.pop() {
            let id = match step {
                Step::Close => {
                    if let Some(el) = open.pop() {
                        push_node(&mut open, &mut roots, Node::Element(el));
                    }
                    continue;
                }
                Step::Visit(id) => id,
            };
            let Some(node) = self.get(id) else {
                continue;
            };
            match &node.data {
                ArenaNodeData::Element { name, attrs } => {
                    if open.len() < MAX_NESTING {
                        open.push(Element {
                            tag: name.local.as_ref().to_ascii_lowercase(),
                            attrs: attrs.clone(),
                            children: Vec::new(),
                        });
                        steps.push(Step::Close);
                    } else {
                        flattened += 1;
                    }
                    steps.extend(node.children.iter().rev().map(|&c| Step::Visit(c)));
                }
                ArenaNodeData::Text(text) => {
                    push_node(&mut open, &mut roots, Node::Text(text.clone()));
                }
                ArenaNodeData::Document | ArenaNodeData::Other => {}
            }
        }

        if flattened > 0 {
            tracing::debug!(flattened, max = MAX_NESTING, "flattened deeply nested elements");
        }
        PageTree::new(roots)
    }
}

/// Append to the innermost open element, merging adjacent text.
fn push_node(open: &mut [Element], roots: &mut Vec<Node>, node: Node) {
    let siblings = match open.last_mut() {
        Some(parent) => &mut parent.children,
        None => roots,
    };
    if let (Some(Node::Text(prev)), Node::Text(text)) = (siblings.last_mut(), &node) {
        prev.push_str(text);
        return;
    }
    siblings.push(node);
}

impl Default for ArenaDom {
    fn default() -> Self {
        Self::new()
    }
}
