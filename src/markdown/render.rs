//! Page tree → Markdown rendering.
//!
//! Conventions: links and images stay inline (`[text](href)`), lines are
//! never wrapped, and blocks are separated by exactly one blank line.
//! No I/O is performed here.

use thiserror::Error;

use crate::dom::{Element, Node};

use super::escape::{calculate_fence_length, calculate_inline_code_ticks, escape_line_start};

/// Deepest element nesting the renderer will recurse into.
pub const MAX_DEPTH: usize = 128;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("element nesting exceeds {0} levels")]
    TooDeep(usize),
}

/// Elements whose content never reaches the output.
const SKIPPED: &[&str] = &[
    "head", "title", "script", "style", "noscript", "template", "svg", "iframe", "button",
];

/// Container elements that start and end a block.
const BLOCKS: &[&str] = &[
    "p",
    "div",
    "section",
    "article",
    "main",
    "header",
    "footer",
    "nav",
    "aside",
    "figure",
    "figcaption",
    "details",
    "summary",
    "form",
    "fieldset",
    "address",
    "center",
];

/// How far the next content must be separated from what came before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Break {
    None,
    Line,
    Blank,
}

#[derive(Debug, Clone)]
struct ListContext {
    is_ordered: bool,
    counter: usize,
}

/// Rendering state (pure string accumulation, no I/O).
pub struct RenderContext {
    output: String,
    line_prefix: String,
    list_stack: Vec<ListContext>,
    at_line_start: bool,
    has_line_content: bool,
    pending_break: Break,
    pending_space: bool,
    /// Set right after a list bullet so the item's first block stays on its line.
    item_open: bool,
    depth: usize,
    max_depth: usize,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderContext {
    pub fn new() -> Self {
        Self::with_max_depth(MAX_DEPTH)
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            output: String::new(),
            line_prefix: String::new(),
            list_stack: Vec::new(),
            at_line_start: true,
            has_line_content: false,
            pending_break: Break::None,
            pending_space: false,
            item_open: false,
            depth: 0,
            max_depth,
        }
    }

    /// Render `root`, consuming the context.
    pub fn render(mut self, root: &Node) -> Result<String, RenderError> {
        self.walk_node(root)?;

        let trimmed = self.output.trim_end().len();
        self.output.truncate(trimmed);
        if !self.output.is_empty() {
            self.output.push('\n');
        }
        Ok(self.output)
    }

    fn request_break(&mut self, kind: Break) {
        if self.item_open || self.output.is_empty() {
            return;
        }
        self.pending_break = self.pending_break.max(kind);
    }

    fn block_break(&self) -> Break {
        if self.list_stack.is_empty() {
            Break::Blank
        } else {
            Break::Line
        }
    }

    fn start_block(&mut self) {
        let kind = self.block_break();
        self.request_break(kind);
    }

    fn end_block(&mut self) {
        let kind = self.block_break();
        self.request_break(kind);
    }

    /// Emit any pending break and the line prefix before writing content.
    fn ensure_line_started(&mut self) {
        match std::mem::replace(&mut self.pending_break, Break::None) {
            Break::None => {}
            Break::Line => {
                if !self.at_line_start {
                    self.write_newline();
                }
            }
            Break::Blank => {
                if !self.at_line_start {
                    self.write_newline();
                }
                self.output.push_str(self.line_prefix.trim_end());
                self.write_newline();
            }
        }
        if self.at_line_start {
            self.output.push_str(&self.line_prefix);
            self.at_line_start = false;
            self.pending_space = false;
        }
        self.item_open = false;
    }

    fn write_newline(&mut self) {
        self.output.push('\n');
        self.at_line_start = true;
        self.has_line_content = false;
        self.pending_space = false;
    }

    /// Write inline content, honoring a pending word separator.
    fn write_inline(&mut self, s: &str) {
        self.ensure_line_started();
        if self.pending_space && self.has_line_content {
            self.output.push(' ');
        }
        self.pending_space = false;
        self.output.push_str(s);
        self.has_line_content = true;
    }

    /// Write a closing marker directly after the preceding content.
    fn write_close(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn write_text(&mut self, text: &str) {
        let has_leading = text.starts_with(char::is_whitespace);
        let has_trailing = text.ends_with(char::is_whitespace);

        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            if !text.is_empty() {
                self.pending_space = true;
            }
            return;
        }

        if has_leading {
            self.pending_space = true;
        }

        let joined = words.join(" ");
        // Pending breaks are flushed first so the line-start test is accurate.
        self.ensure_line_started();
        if self.has_line_content {
            self.write_inline(&joined);
        } else {
            self.write_inline(&escape_line_start(&joined));
        }

        if has_trailing {
            self.pending_space = true;
        }
    }

    fn walk_children(&mut self, el: &Element) -> Result<(), RenderError> {
        for child in &el.children {
            self.walk_node(child)?;
        }
        Ok(())
    }

    fn walk_node(&mut self, node: &Node) -> Result<(), RenderError> {
        match node {
            Node::Text(text) => {
                self.write_text(text);
                Ok(())
            }
            Node::Element(el) => {
                if self.depth >= self.max_depth {
                    return Err(RenderError::TooDeep(self.max_depth));
                }
                self.depth += 1;
                let result = self.walk_element(el);
                self.depth -= 1;
                result
            }
        }
    }

    fn walk_element(&mut self, el: &Element) -> Result<(), RenderError> {
        let tag = el.tag.as_str();
        match tag {
            _ if SKIPPED.contains(&tag) => {}

            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = usize::from(tag.as_bytes()[1] - b'0');
                self.start_block();
                self.write_inline(&"#".repeat(level));
                self.pending_space = true;
                self.walk_children(el)?;
                self.end_block();
            }

            "ul" | "ol" => {
                self.start_block();
                let start = el
                    .attr("start")
                    .and_then(|s| s.trim().parse::<usize>().ok())
                    .unwrap_or(1);
                self.list_stack.push(ListContext {
                    is_ordered: tag == "ol",
                    counter: start.saturating_sub(1),
                });
                self.walk_children(el)?;
                self.list_stack.pop();
                self.end_block();
            }

            "li" => {
                self.request_break(Break::Line);
                let bullet = match self.list_stack.last_mut() {
                    Some(ctx) if ctx.is_ordered => {
                        ctx.counter += 1;
                        format!("{}. ", ctx.counter)
                    }
                    _ => "- ".to_string(),
                };
                self.write_inline(&bullet);
                self.has_line_content = false;
                self.item_open = true;

                let old_prefix = self.line_prefix.clone();
                self.line_prefix.push_str(&" ".repeat(bullet.len()));
                self.walk_children(el)?;
                self.line_prefix = old_prefix;
                self.item_open = false;
            }

            "blockquote" => {
                self.start_block();
                // The break must be emitted with the outer prefix.
                if self.pending_break != Break::None {
                    self.ensure_line_started();
                    self.output.truncate(self.output.len() - self.line_prefix.len());
                    self.at_line_start = true;
                }
                let old_prefix = self.line_prefix.clone();
                self.line_prefix.push_str("> ");
                self.walk_children(el)?;
                self.line_prefix = old_prefix;
                self.end_block();
            }

            "pre" => self.write_code_block(el),

            "code" | "kbd" | "samp" | "tt" => {
                let content = el.text_content();
                let content = content.trim();
                if !content.is_empty() {
                    let ticks = "`".repeat(calculate_inline_code_ticks(content));
                    let spacer = if content.starts_with('`') || content.ends_with('`') {
                        " "
                    } else {
                        ""
                    };
                    self.write_inline(&format!("{ticks}{spacer}{content}{spacer}{ticks}"));
                }
            }

            "strong" | "b" => self.write_wrapped(el, "**")?,
            "em" | "i" => self.write_wrapped(el, "_")?,

            "a" => {
                let href = el.attr("href").unwrap_or("").trim();
                let label = el.text_content();
                let wraps_blocks = el
                    .children
                    .iter()
                    .filter_map(Node::as_element)
                    .any(|c| BLOCKS.contains(&c.tag.as_str()));
                if href.is_empty()
                    || href.starts_with("javascript:")
                    || label.trim().is_empty()
                    || wraps_blocks
                {
                    self.walk_children(el)?;
                } else {
                    self.write_inline("[");
                    self.walk_children(el)?;
                    self.pending_space = false;
                    self.write_close(&format!("]({href})"));
                }
            }

            "img" => {
                let src = el.attr("src").unwrap_or("");
                let alt = el.attr("alt").unwrap_or("").trim();
                if !src.is_empty() {
                    self.write_inline(&format!("![{alt}]({src})"));
                }
            }

            "br" => {
                self.ensure_line_started();
                self.write_newline();
            }

            "hr" => {
                self.start_block();
                self.write_inline("* * *");
                self.end_block();
            }

            "table" => {
                self.start_block();
                self.walk_children(el)?;
                self.end_block();
            }

            "tr" => {
                let cells: Vec<String> = el
                    .children
                    .iter()
                    .filter_map(Node::as_element)
                    .filter(|c| c.tag == "td" || c.tag == "th")
                    .map(|c| c.text_content().split_whitespace().collect::<Vec<_>>().join(" "))
                    .collect();
                if !cells.is_empty() {
                    self.request_break(Break::Line);
                    self.write_inline(&cells.join(" | "));
                    self.request_break(Break::Line);
                }
            }

            "dt" => {
                self.request_break(Break::Line);
                self.write_wrapped(el, "**")?;
            }

            "dd" => {
                self.request_break(Break::Line);
                self.write_inline(":");
                self.pending_space = true;
                self.walk_children(el)?;
            }

            _ if BLOCKS.contains(&tag) || tag == "dl" => {
                self.start_block();
                self.walk_children(el)?;
                self.end_block();
            }

            // html, body, span, the synthetic document root and anything unknown
            _ => self.walk_children(el)?,
        }
        Ok(())
    }

    fn write_wrapped(&mut self, el: &Element, marker: &str) -> Result<(), RenderError> {
        if el.text_content().trim().is_empty() {
            return self.walk_children(el);
        }
        self.write_inline(marker);
        self.walk_children(el)?;
        self.write_close(marker);
        Ok(())
    }

    fn write_code_block(&mut self, el: &Element) {
        let text = el.text_content();
        let text = text.trim_end_matches(['\n', '\r']);
        let lang = code_language(el).unwrap_or_default();
        let fence = "`".repeat(calculate_fence_length(text, '`'));

        self.start_block();
        self.write_inline(&format!("{fence}{lang}"));
        self.write_newline();
        for line in text.lines() {
            if line.is_empty() {
                self.output.push_str(self.line_prefix.trim_end());
                self.write_newline();
            } else {
                self.ensure_line_started();
                self.output.push_str(line);
                self.write_newline();
            }
        }
        self.write_inline(&fence);
        self.end_block();
    }
}

/// Language from a `language-*` / `lang-*` class on `<pre>` or its `<code>`.
fn code_language(pre: &Element) -> Option<String> {
    let from_classes = |el: &Element| {
        el.classes().find_map(|c| {
            c.strip_prefix("language-")
                .or_else(|| c.strip_prefix("lang-"))
                .filter(|l| !l.is_empty())
                .map(str::to_string)
        })
    };
    from_classes(pre).or_else(|| {
        pre.children
            .iter()
            .filter_map(Node::as_element)
            .find(|c| c.tag == "code")
            .and_then(from_classes)
    })
}

/// Render a node to Markdown.
pub fn render_markdown(root: &Node) -> Result<String, RenderError> {
    RenderContext::new().render(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::PageTree;

    fn render_html(html: &str) -> String {
        render_markdown(&PageTree::parse(html).root).unwrap()
    }

    #[test]
    fn test_simple_paragraph() {
        assert_eq!(render_html("<p>Hello,   World!</p>"), "Hello, World!\n");
    }

    #[test]
    fn test_paragraphs_single_blank_line() {
        assert_eq!(
            render_html("<div><p>One</p></div><p>Two</p><div></div><p>Three</p>"),
            "One\n\nTwo\n\nThree\n"
        );
    }

    #[test]
    fn test_heading() {
        assert_eq!(render_html("<h2>Setup  guide</h2><p>x</p>"), "## Setup guide\n\nx\n");
    }

    #[test]
    fn test_lists() {
        assert_eq!(
            render_html("<ul><li>one</li><li>two</li></ul><ol start=\"3\"><li>c</li><li>d</li></ol>"),
            "- one\n- two\n\n3. c\n4. d\n"
        );
    }

    #[test]
    fn test_nested_list_indent() {
        assert_eq!(
            render_html("<ul><li>a<ul><li>b</li></ul></li></ul>"),
            "- a\n  - b\n"
        );
    }

    #[test]
    fn test_list_item_paragraph_stays_on_bullet_line() {
        assert_eq!(render_html("<ul><li><p>para</p></li></ul>"), "- para\n");
    }

    #[test]
    fn test_inline_formatting() {
        assert_eq!(
            render_html("<p>Run <code>npm i</code> then <strong>stop</strong>, <em>now</em>.</p>"),
            "Run `npm i` then **stop**, _now_.\n"
        );
    }

    #[test]
    fn test_links_and_images_inline() {
        assert_eq!(
            render_html(r#"<p>See <a href="/docs/api">the API</a> <img src="/a.png" alt="A"></p>"#),
            "See [the API](/docs/api) ![A](/a.png)\n"
        );
    }

    #[test]
    fn test_long_lines_not_wrapped() {
        let words = "word ".repeat(100);
        let out = render_html(&format!("<p>{words}</p>"));
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn test_code_block_with_language() {
        assert_eq!(
            render_html("<p>Intro</p><pre class=\"language-bash\">npm install\nnpm run dev\n</pre>"),
            "Intro\n\n```bash\nnpm install\nnpm run dev\n```\n"
        );
    }

    #[test]
    fn test_code_block_language_on_code_child() {
        assert_eq!(
            render_html("<pre><code class=\"language-json\">{}</code></pre>"),
            "```json\n{}\n```\n"
        );
    }

    #[test]
    fn test_blockquote_prefixes_every_line() {
        assert_eq!(
            render_html("<p>x</p><blockquote><strong>NOTE</strong><br>first<br>second</blockquote>"),
            "x\n\n> **NOTE**\n> first\n> second\n"
        );
    }

    #[test]
    fn test_line_start_escaping() {
        assert_eq!(render_html("<p># not heading</p>"), "\\# not heading\n");
        assert_eq!(render_html("<p>a # b</p>"), "a # b\n");
    }

    #[test]
    fn test_table_rows() {
        assert_eq!(
            render_html("<table><tr><th>Name</th><th>Type</th></tr><tr><td>id</td><td>ID!</td></tr></table>"),
            "Name | Type\nid | ID!\n"
        );
    }

    #[test]
    fn test_scripts_skipped() {
        assert_eq!(render_html("<p>a</p><script>alert(1)</script><p>b</p>"), "a\n\nb\n");
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(render_html(""), "");
    }

    #[test]
    fn test_too_deep_fails() {
        let mut node = Node::text("deep");
        for _ in 0..10 {
            node = Element::new("div").with_child(node).into();
        }
        let err = RenderContext::with_max_depth(5).render(&node).unwrap_err();
        assert_eq!(err, RenderError::TooDeep(5));
        assert!(RenderContext::with_max_depth(20).render(&node).is_ok());
    }
}
