//! Batch conversion from saved page snapshots.

use std::path::Path;

use docmark::batch::load_mapping;
use docmark::{Config, ContentChecker, Converter, IntegrityState, SnapshotSource, convert_all};

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

#[test]
fn test_batch_converts_snapshots() {
    let pages = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let page = std::fs::read_to_string(format!("{FIXTURES_DIR}/docs_page.html")).unwrap();

    write(&pages.path().join("themes/theme-extension.html"), &page);
    write(
        &pages.path().join("apps/overview.html"),
        "<main><h1>Apps</h1><p>Apps extend the platform.</p></main>",
    );
    let mapping = pages.path().join("mapping.json");
    write(
        &mapping,
        r#"{
            "themes/theme-extension.md": "https://example.com/docs/themes/theme-extension",
            "apps/overview.md": "https://example.com/docs/apps/overview",
            "apps/missing.md": "https://example.com/docs/apps/missing"
        }"#,
    );

    let entries = load_mapping(&mapping).unwrap();
    let converter = Converter::new(&Config::default()).unwrap();
    let summary = convert_all(&converter, &entries, &SnapshotSource::new(pages.path()), out.path());

    assert_eq!(summary.total(), 3);
    assert_eq!(summary.converted.len(), 2);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].url, "https://example.com/docs/apps/missing");
    assert!(summary.failed[0].error.contains("apps/missing"));

    let overview = std::fs::read_to_string(out.path().join("apps/overview.md")).unwrap();
    assert!(overview.starts_with("---\ntitle: \"Overview\"\n"));
    assert!(overview.ends_with("# Apps\n\nApps extend the platform.\n"));
}

#[test]
fn test_batch_with_repair_produces_clean_documents() {
    let pages = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let page = std::fs::read_to_string(format!("{FIXTURES_DIR}/docs_page.html")).unwrap();
    write(&pages.path().join("layout.html"), &page);
    let mapping = pages.path().join("mapping.json");
    write(&mapping, r#"{"layout.md": "https://example.com/docs/layout"}"#);

    let entries = load_mapping(&mapping).unwrap();
    let checker = ContentChecker::new(&Config::default().integrity).unwrap();

    let plain = Converter::new(&Config::default()).unwrap();
    convert_all(&plain, &entries, &SnapshotSource::new(pages.path()), out.path());
    let outcome = checker.validate_file(out.path().join("layout.md")).unwrap();
    assert_eq!(outcome.state(), IntegrityState::IssuesFound);

    let mut config = Config::default();
    config.transform.repair_output = true;
    let repairing = Converter::new(&config).unwrap();
    let summary = convert_all(&repairing, &entries, &SnapshotSource::new(pages.path()), out.path());
    assert!(summary.is_success());
    let outcome = checker.validate_file(out.path().join("layout.md")).unwrap();
    assert_eq!(outcome.state(), IntegrityState::Clean);
}

#[test]
fn test_windows_1252_snapshot() {
    let pages = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    std::fs::write(pages.path().join("cafe.html"), b"<main><p>Caf\xe9 menu</p></main>").unwrap();
    let mapping = pages.path().join("mapping.json");
    write(&mapping, r#"{"cafe.md": "https://example.com/docs/cafe"}"#);

    let converter = Converter::new(&Config::default()).unwrap();
    convert_all(
        &converter,
        &load_mapping(&mapping).unwrap(),
        &SnapshotSource::new(pages.path()),
        out.path(),
    );
    let doc = std::fs::read_to_string(out.path().join("cafe.md")).unwrap();
    assert!(doc.ends_with("Café menu\n"));
}
