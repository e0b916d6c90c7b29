//! Page tree model and HTML parsing.
//!
//! html5ever parses into an index arena ([`arena`]), which is then folded into
//! the owned [`PageTree`] that extraction and transformation operate on.

mod arena;
mod node;
mod selector;
mod tree_sink;

pub use arena::MAX_NESTING;
pub use node::{DOCUMENT_TAG, Element, Node, PageTree};
pub use selector::Selector;
pub use tree_sink::parse_html;
