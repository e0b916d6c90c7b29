//! Image → description paragraph.

use crate::classify::ImageClassifier;
use crate::dom::{Element, Node};

use super::NodeTransformer;

/// Text that introduces every image annotation.
pub const IMAGE_MARKER: &str = "[IMAGE:";

/// Replaces `<img>` with a bold `[IMAGE: ...]` paragraph.
#[derive(Debug, Clone, Default)]
pub struct ImageTransformer {
    classifier: ImageClassifier,
}

impl ImageTransformer {
    pub fn new(classifier: ImageClassifier) -> Self {
        Self { classifier }
    }

    /// Build the annotation paragraph for an image element.
    pub fn annotate(&self, img: &Element) -> Node {
        let src = img.attr("src").unwrap_or("");
        let alt = img.attr("alt").unwrap_or("");
        let description = self.classifier.classify(src, alt);
        Element::new("p")
            .with_child(Element::new("strong").with_text(format!("{IMAGE_MARKER} {description}]")))
            .into()
    }
}

impl NodeTransformer for ImageTransformer {
    fn name(&self) -> &'static str {
        "image"
    }

    fn applies_to(&self, el: &Element) -> bool {
        el.tag == "img"
    }

    fn transform(&self, el: &Element, _preceding: Option<&Node>) -> Vec<Node> {
        vec![self.annotate(el)]
    }
}
