//! End-to-end conversion tests over a saved documentation page.

use chrono::{NaiveDate, NaiveDateTime};

use docmark::{Config, Converter, DocumentStats, DocumentTransformer, PageTree};

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");
const SOURCE_URL: &str = "https://example.com/docs/themes/build-a-theme-extension";

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("{FIXTURES_DIR}/{name}")).expect("fixture should exist")
}

fn timestamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 3)
        .unwrap()
        .and_hms_opt(14, 0, 9)
        .unwrap()
}

fn convert_fixture() -> String {
    Converter::new(&Config::default())
        .unwrap()
        .convert_html_at(&fixture("docs_page.html"), SOURCE_URL, timestamp())
}

/// Split a document into its frontmatter lines and everything after.
fn split_frontmatter(doc: &str) -> (Vec<&str>, &str) {
    let rest = doc.strip_prefix("---\n").expect("document starts with frontmatter");
    let end = rest.find("\n---\n").expect("frontmatter is closed");
    (rest[..end].lines().collect(), &rest[end + "\n---\n".len()..])
}

/// Body after the analysis block.
fn body(doc: &str) -> &str {
    let (_, after) = split_frontmatter(doc);
    let end = after.find("\n---\n\n").expect("analysis block is closed");
    &after[end + "\n---\n\n".len()..]
}

// ============================================================================
// Frontmatter
// ============================================================================

#[test]
fn test_frontmatter_fields() {
    let doc = convert_fixture();
    let (lines, _) = split_frontmatter(&doc);

    assert_eq!(lines[0], "title: \"Build A Theme Extension\"");
    assert_eq!(lines[1], format!("source: \"{SOURCE_URL}\""));
    assert_eq!(lines[2], "converted_for: \"AI coding assistant\"");
    assert_eq!(lines[3], "conversion_date: \"2024-06-03 14:00:09\"");
    assert_eq!(lines[4], "stats:");
    assert_eq!(lines[6], "  code_blocks: 4");
    assert_eq!(lines[7], "  images: 3");
}

#[test]
fn test_stats_match_body() {
    let doc = convert_fixture();
    let (lines, _) = split_frontmatter(&doc);
    let stats = DocumentStats::compute(body(&doc));

    assert_eq!(lines[5], format!("  words: {}", stats.words));
    assert_eq!(stats.code_blocks, body(&doc).matches("```").count() / 2);
    assert_eq!(stats.images, body(&doc).matches("[IMAGE:").count());
}

#[test]
fn test_analysis_block_follows_frontmatter() {
    let doc = convert_fixture();
    let (_, after) = split_frontmatter(&doc);
    assert!(after.starts_with("\n## 🤖 AI Assistant Analysis\n"));
    assert!(after.contains("- 4 code examples ready for analysis\n"));
    assert!(after.contains("- 3 visual elements converted to descriptions\n"));
}

// ============================================================================
// Body
// ============================================================================

#[test]
fn test_chrome_removed() {
    let doc = convert_fixture();
    for chrome in ["Docs home", "On this page", "Example Inc", "analytics", "width: 240px", "Themes"] {
        assert!(!doc.contains(chrome), "{chrome:?} should be stripped");
    }
}

#[test]
fn test_body_annotations() {
    let doc = convert_fixture();
    let body = body(&doc);

    assert!(body.starts_with("# Build a theme extension\n\n"));
    assert!(body.contains("[app structure guide](/docs/apps/structure)"));
    assert!(body.contains("**app blocks**"));
    assert!(body.contains("```bash\n$ npm run generate extension\n```"));
    assert!(body.contains(
        "**[IMAGE: Terminal/CLI interface showing command execution and output]**"
    ));
    assert!(body.contains("> **⚠️ WARNING**\n> Extension handles can't be changed after deployment.\n"));
    assert!(body.contains("**File: `shopify.extension.toml`**\n\n```toml\nname = \"Product rating\"\n"));
    assert!(body.contains("```graphql\nquery {\n"));
    assert!(body.contains("```\nextensions/\n├── blocks/\n"));
    assert!(body.contains("> **💡 TIP**\n> Run the dev server to preview changes.\n"));
    assert!(body.contains(
        "**[IMAGE: Technical diagram illustrating system architecture or workflow]**"
    ));
    assert!(body.contains("**[IMAGE: Documentation illustration showing relevant UI or workflow]**"));
    assert!(body.contains("1. Deploy the app\n2. Enable the block in the theme editor\n"));
}

#[test]
fn test_document_order_preserved() {
    let doc = convert_fixture();
    let positions: Vec<usize> = [
        "# Build a theme extension",
        "```bash",
        "[IMAGE: Terminal",
        "⚠️ WARNING",
        "File: `shopify.extension.toml`",
        "```graphql",
        "💡 TIP",
        "[IMAGE: Technical diagram",
        "1. Deploy",
    ]
    .iter()
    .map(|needle| doc.find(needle).unwrap_or_else(|| panic!("missing {needle:?}")))
    .collect();

    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
}

#[test]
fn test_repair_output_cleans_tree_characters() {
    let mut config = Config::default();
    config.transform.repair_output = true;
    let doc = Converter::new(&config)
        .unwrap()
        .convert_html_at(&fixture("docs_page.html"), SOURCE_URL, timestamp());

    assert!(doc.contains("```\nextensions/\n|-- blocks/\n|   +-- rating.liquid\n+-- locales/\n```"));
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_npm_install_without_hint() {
    let doc = DocumentTransformer::default().transform(
        PageTree::parse("<main><h2>Install</h2><pre>$ npm install</pre></main>"),
        "https://example.com/docs/install",
    );
    assert_eq!(doc.markdown, "## Install\n\n```bash\n$ npm install\n```\n");
    assert!(!doc.markdown.contains("File:"));
}

#[test]
fn test_no_region_uses_whole_page_with_exclusions() {
    let doc = DocumentTransformer::default().transform(
        PageTree::parse(
            "<body><nav>Menu</nav><div class=\"page\"><p>Only text</p></div><footer>Bye</footer></body>",
        ),
        "https://example.com/docs/x",
    );
    assert_eq!(doc.markdown, "Only text\n");
}

#[test]
fn test_image_then_callout() {
    let doc = DocumentTransformer::default().transform(
        PageTree::parse(
            "<main><img src=\"/admin-panel.png\"><div class=\"note\">Saved automatically.</div></main>",
        ),
        "https://example.com/docs/x",
    );
    assert_eq!(
        doc.markdown,
        "**[IMAGE: Admin dashboard interface showing configuration options]**\n\n\
         > **📝 NOTE**\n> Saved automatically.\n"
    );
    assert_eq!(doc.stats.images, 1);
}

#[test]
fn test_alt_text_fallback() {
    let doc = DocumentTransformer::default().transform(
        PageTree::parse("<main><img src=\"/shot.png\" alt=\"Checkout settings\"></main>"),
        "https://example.com/docs/x",
    );
    assert_eq!(
        doc.markdown,
        "**[IMAGE: Interface screenshot: Checkout settings]**\n"
    );
}

#[test]
fn test_deeply_nested_page_falls_back_to_text() {
    let depth = 20_000;
    let html = format!(
        "<main>{}<p>deep text</p>{}</main>",
        "<div>".repeat(depth),
        "</div>".repeat(depth)
    );
    let doc = Converter::new(&Config::default())
        .unwrap()
        .convert_html_at(&html, SOURCE_URL, timestamp());

    assert!(doc.starts_with("---\ntitle: \"Build A Theme Extension\""));
    assert_eq!(body(&doc), "deep text\n");
}
