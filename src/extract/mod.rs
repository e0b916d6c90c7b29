//! Content region extraction.
//!
//! Picks the substantive body of a page and strips chrome (navigation,
//! headers, footers, sidebars, scripts) before any node is rewritten.

use crate::config::ExtractConfig;
use crate::dom::{Element, Node, PageTree, Selector};

/// The subtree chosen as a document's body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRegion {
    pub root: Node,
    /// Selector that picked the region; `None` when the whole page was used.
    pub matched: Option<Selector>,
}

impl ContentRegion {
    /// True when no region selector matched and the whole page was used.
    pub fn is_fallback(&self) -> bool {
        self.matched.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContentExtractor {
    config: ExtractConfig,
}

impl ContentExtractor {
    pub fn new(config: &ExtractConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Select the content region of `tree` and remove excluded subtrees from it.
    ///
    /// Never fails: when no selector matches the whole tree becomes the region.
    pub fn extract(&self, tree: PageTree) -> ContentRegion {
        let (mut root, matched) = match self.select_region(tree.root) {
            Ok((node, selector)) => (node, Some(selector)),
            Err(whole) => (whole, None),
        };

        let removed = match root.as_element_mut() {
            Some(el) => self.strip_excluded(el),
            None => 0,
        };

        let region = matched
            .as_ref()
            .map_or_else(|| "<whole page>".to_string(), ToString::to_string);
        tracing::debug!(%region, removed, "extracted content region");

        ContentRegion { root, matched }
    }

    /// Find the first subtree matching the highest-ranked selector, taking
    /// ownership of it. Gives the tree back untouched when nothing matches.
    fn select_region(&self, root: Node) -> Result<(Node, Selector), Node> {
        for selector in &self.config.region_selectors {
            if let Some(path) = find_path(&root, selector) {
                return Ok((take_at(root, &path), selector.clone()));
            }
        }
        Err(root)
    }

    /// Remove every descendant matching an exclusion selector. The element
    /// itself is kept even if it matches. Returns the number of subtrees removed.
    fn strip_excluded(&self, el: &mut Element) -> usize {
        let before = el.children.len();
        el.children.retain(|child| {
            child
                .as_element()
                .is_none_or(|c| !self.config.exclude_selectors.iter().any(|s| s.matches(c)))
        });
        let mut removed = before - el.children.len();

        for child in &mut el.children {
            if let Some(child) = child.as_element_mut() {
                removed += self.strip_excluded(child);
            }
        }
        removed
    }
}

/// Child-index path to the first element in document order matching `selector`.
/// The root itself is not a candidate.
fn find_path(root: &Node, selector: &Selector) -> Option<Vec<usize>> {
    let el = root.as_element()?;
    for (i, child) in el.children.iter().enumerate() {
        if let Some(child_el) = child.as_element() {
            if selector.matches(child_el) {
                return Some(vec![i]);
            }
            if let Some(mut rest) = find_path(child, selector) {
                rest.insert(0, i);
                return Some(rest);
            }
        }
    }
    None
}

fn take_at(mut node: Node, path: &[usize]) -> Node {
    for &i in path {
        node = match node {
            Node::Element(mut el) => el.children.swap_remove(i),
            text => return text,
        };
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(html: &str) -> PageTree {
        PageTree::parse(html)
    }

    fn extract(html: &str) -> ContentRegion {
        ContentExtractor::default().extract(page(html))
    }

    #[test]
    fn test_main_wins_over_article() {
        let region = extract("<body><article>A</article><main>M</main></body>");
        assert_eq!(region.matched, Some(Selector::Tag("main".into())));
        assert_eq!(region.root.text_content(), "M");
    }

    #[test]
    fn test_role_main() {
        let region = extract(r#"<body><div role="main">R</div><div class="content">C</div></body>"#);
        assert_eq!(region.root.text_content(), "R");
    }

    #[test]
    fn test_first_match_in_document_order() {
        let region = extract(r#"<div class="content">one</div><div class="content">two</div>"#);
        assert_eq!(region.root.text_content(), "one");
    }

    #[test]
    fn test_fallback_to_whole_page() {
        let region = extract("<body><div><p>Only text</p></div><nav>menu</nav></body>");
        assert!(region.is_fallback());
        assert_eq!(region.root.text_content(), "Only text");
        assert!(region.root.is_tag(crate::dom::DOCUMENT_TAG));
    }

    #[test]
    fn test_exclusions_removed_at_any_depth() {
        let region = extract(
            r#"<main>
                <header>Top</header>
                <section><p>Keep</p><div class="sidebar"><p>Side</p></div></section>
                <script>var x = 1;</script>
                <footer>Bottom</footer>
            </main>"#,
        );
        let text = region.root.text_content();
        assert!(text.contains("Keep"));
        for gone in ["Top", "Side", "var x", "Bottom"] {
            assert!(!text.contains(gone), "{gone} should be removed");
        }
    }

    #[test]
    fn test_region_root_itself_not_excluded() {
        let config = ExtractConfig {
            region_selectors: vec![Selector::Class("navigation".into())],
            ..ExtractConfig::default()
        };
        let region = ContentExtractor::new(&config)
            .extract(page(r#"<div class="navigation"><p>Kept</p></div>"#));
        assert_eq!(region.root.text_content(), "Kept");
    }

    #[test]
    fn test_sibling_order_preserved() {
        let region = extract("<main><p>1</p><nav>x</nav><p>2</p><aside>y</aside><p>3</p></main>");
        assert_eq!(region.root.text_content(), "123");
    }
}
