//! Preformatted block → fenced code with language and filename hints.

use crate::classify::CodeClassifier;
use crate::dom::{Element, Node};

use super::NodeTransformer;

/// Characters trimmed from a filename token taken from prose.
const TOKEN_PUNCTUATION: &[char] = &[
    ':', ',', ';', '(', ')', '"', '\'', '`', '*', '[', ']', '<', '>',
];

#[derive(Debug, Clone)]
pub struct CodeTransformer {
    classifier: CodeClassifier,
    extensions: Vec<String>,
}

impl CodeTransformer {
    pub fn new(classifier: CodeClassifier, extensions: Vec<String>) -> Self {
        Self {
            classifier,
            extensions,
        }
    }

    /// Filename named by the text of a preceding sibling, if any.
    ///
    /// The hint applies when the text contains one of the configured
    /// extensions; the whitespace-delimited token carrying the extension is
    /// used, falling back to the whole trimmed text.
    pub fn filename_hint(&self, preceding: &Node) -> Option<String> {
        if preceding.is_tag("pre") {
            return None;
        }
        let text = preceding.text_content();
        let text = text.trim();
        if !self.extensions.iter().any(|ext| text.contains(ext.as_str())) {
            return None;
        }

        let token = text
            .split_whitespace()
            .find(|word| self.extensions.iter().any(|ext| word.contains(ext.as_str())))
            .map(|word| word.trim_matches(TOKEN_PUNCTUATION).trim_end_matches('.'))
            .filter(|word| !word.is_empty())
            .unwrap_or(text);
        Some(token.to_string())
    }

    /// Rewrite a `<pre>` into an optional filename paragraph plus a
    /// language-tagged `<pre><code>` block.
    pub fn enhance(&self, pre: &Element, preceding: Option<&Node>) -> Vec<Node> {
        let code = pre.text_content();
        let language = self.classifier.classify(&code);
        let filename = preceding.and_then(|p| self.filename_hint(p));

        let mut out = Vec::with_capacity(2);
        if let Some(filename) = filename {
            out.push(
                Element::new("p")
                    .with_child(
                        Element::new("strong")
                            .with_text("File: ")
                            .with_child(Element::new("code").with_text(filename)),
                    )
                    .into(),
            );
        }

        let mut block = Element::new("pre");
        if let Some(language) = language {
            block = block.with_attr("class", format!("language-{language}"));
        }
        out.push(block.with_child(Element::new("code").with_text(code)).into());
        out
    }
}

impl Default for CodeTransformer {
    fn default() -> Self {
        let config = crate::config::TransformConfig::default();
        Self::new(CodeClassifier::default(), config.filename_extensions)
    }
}

impl NodeTransformer for CodeTransformer {
    fn name(&self) -> &'static str {
        "code"
    }

    fn applies_to(&self, el: &Element) -> bool {
        el.tag == "pre"
    }

    fn transform(&self, el: &Element, preceding: Option<&Node>) -> Vec<Node> {
        self.enhance(el, preceding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::render_markdown;

    fn render(nodes: Vec<Node>) -> String {
        let mut root = Element::new("div");
        root.children = nodes;
        render_markdown(&root.into()).unwrap()
    }

    fn pre(text: &str) -> Element {
        Element::new("pre").with_text(text)
    }

    #[test]
    fn test_shell_without_filename() {
        let out = CodeTransformer::default().enhance(&pre("$ npm install"), None);
        assert_eq!(out.len(), 1);
        assert_eq!(render(out), "```bash\n$ npm install\n```\n");
    }

    #[test]
    fn test_filename_from_preceding_sibling() {
        let hint: Node = Element::new("p").with_text("shopify.app.toml").into();
        let out = CodeTransformer::default().enhance(&pre("name = \"demo\""), Some(&hint));
        assert_eq!(
            render(out),
            "**File: `shopify.app.toml`**\n\n```toml\nname = \"demo\"\n```\n"
        );
    }

    #[test]
    fn test_filename_token_extracted_from_prose() {
        let hint: Node = Element::new("p").with_text("Add this to package.json:").into();
        assert_eq!(
            CodeTransformer::default().filename_hint(&hint).as_deref(),
            Some("package.json")
        );
    }

    #[test]
    fn test_no_hint_without_extension() {
        let hint: Node = Element::new("p").with_text("Run the following").into();
        assert_eq!(CodeTransformer::default().filename_hint(&hint), None);
    }

    #[test]
    fn test_previous_code_block_is_not_a_hint() {
        let prev: Node = pre("import x from './a.js'").into();
        assert_eq!(CodeTransformer::default().filename_hint(&prev), None);
    }

    #[test]
    fn test_untagged_when_unrecognized() {
        let out = CodeTransformer::default().enhance(&pre("hello world"), None);
        assert_eq!(render(out), "```\nhello world\n```\n");
    }

    #[test]
    fn test_nested_markup_flattened() {
        let block = Element::new("pre").with_child(
            Element::new("code")
                .with_child(Element::new("span").with_text("{"))
                .with_text("\"a\": 1}"),
        );
        let out = CodeTransformer::default().enhance(&block, None);
        assert_eq!(render(out), "```json\n{\"a\": 1}\n```\n");
    }
}
