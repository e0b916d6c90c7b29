//! Node transformers and the document transformation pipeline.
//!
//! Each [`NodeTransformer`] rewrites one kind of element into replacement
//! nodes. The [`DocumentTransformer`] runs them as successive depth-first
//! passes over the content region (images, then code blocks, then callouts),
//! splicing each replacement into its parent's child list at the position of
//! the node it replaces.

mod callout;
mod code;
mod image;

pub use callout::CalloutTransformer;
pub use code::CodeTransformer;
pub use image::{IMAGE_MARKER, ImageTransformer};

use crate::classify::{CodeClassifier, ImageClassifier};
use crate::config::Config;
use crate::dom::{Element, Node, PageTree};
use crate::extract::ContentExtractor;
use crate::markdown::render_markdown;
use crate::metadata::AnnotatedDocument;

/// A rewrite of one kind of element.
///
/// Implementations must be total: malformed input (missing attributes,
/// empty text) still yields a replacement.
pub trait NodeTransformer: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn applies_to(&self, el: &Element) -> bool;

    /// Produce the nodes that replace `el`. `preceding` is the closest
    /// previous sibling that is not whitespace-only text.
    fn transform(&self, el: &Element, preceding: Option<&Node>) -> Vec<Node>;
}

/// Apply one transformer over a subtree. Returns the number of rewrites.
///
/// Replacement nodes are not revisited by the same pass.
pub fn apply_transformer(node: &mut Node, transformer: &dyn NodeTransformer) -> usize {
    let Some(el) = node.as_element_mut() else {
        return 0;
    };

    let mut rewrites = 0;
    let old_children = std::mem::take(&mut el.children);
    let mut children = Vec::with_capacity(old_children.len());

    for mut child in old_children {
        let replacement = match child.as_element() {
            Some(child_el) if transformer.applies_to(child_el) => {
                let preceding = children.iter().rev().find(|n: &&Node| !n.is_blank_text());
                Some(transformer.transform(child_el, preceding))
            }
            _ => None,
        };

        match replacement {
            Some(nodes) => {
                rewrites += 1;
                children.extend(nodes);
            }
            None => {
                rewrites += apply_transformer(&mut child, transformer);
                children.push(child);
            }
        }
    }

    el.children = children;
    rewrites
}

/// Extract → rewrite → serialize.
pub struct DocumentTransformer {
    extractor: ContentExtractor,
    transformers: Vec<Box<dyn NodeTransformer>>,
}

impl DocumentTransformer {
    pub fn new(config: &Config) -> Self {
        let transformers: Vec<Box<dyn NodeTransformer>> = vec![
            Box::new(ImageTransformer::new(ImageClassifier::new(&config.classify))),
            Box::new(CodeTransformer::new(
                CodeClassifier::new(&config.classify),
                config.transform.filename_extensions.clone(),
            )),
            Box::new(CalloutTransformer::new(&config.transform)),
        ];
        Self {
            extractor: ContentExtractor::new(&config.extract),
            transformers,
        }
    }

    /// Run every transformer pass over `root`.
    pub fn rewrite(&self, mut root: Node) -> Node {
        for transformer in &self.transformers {
            let rewrites = apply_transformer(&mut root, transformer.as_ref());
            tracing::debug!(pass = transformer.name(), rewrites, "node transformer pass");
        }
        root
    }

    /// Convert a page into Markdown with derived statistics.
    ///
    /// If the region cannot be serialized, its plain text is used instead.
    pub fn transform(&self, tree: PageTree, source_url: &str) -> AnnotatedDocument {
        let region = self.extractor.extract(tree);
        let root = self.rewrite(region.root);

        let markdown = match render_markdown(&root) {
            Ok(markdown) => markdown,
            Err(err) => {
                tracing::warn!(source_url, error = %err, "markdown conversion failed, using plain text");
                plain_text(&root)
            }
        };

        AnnotatedDocument::new(markdown)
    }
}

impl Default for DocumentTransformer {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

/// Text of a subtree with blank-line runs collapsed.
fn plain_text(root: &Node) -> String {
    let text = root.text_content();
    let mut out = String::with_capacity(text.len());
    let mut blank = true;
    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            if !blank {
                out.push('\n');
            }
            blank = true;
            continue;
        }
        out.push_str(line);
        out.push('\n');
        blank = false;
    }
    out.truncate(out.trim_end().len());
    if !out.is_empty() {
        out.push('\n');
    }
    out
}
