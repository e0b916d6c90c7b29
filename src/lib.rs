//! # docmark
//!
//! Converts documentation pages into annotated Markdown for AI coding
//! assistants, and checks the resulting corpus for encoding corruption.
//!
//! ## Conversion
//!
//! Markup is parsed with html5ever, the main content region is picked and
//! stripped of page chrome, images / code blocks / callouts are rewritten
//! into annotated forms, and the result is serialized to Markdown behind a
//! frontmatter header.
//!
//! ```
//! use docmark::{Config, Converter};
//!
//! let converter = Converter::new(&Config::default()).unwrap();
//! let doc = converter.convert_html(
//!     "<main><h1>Deploy</h1><pre>$ npm run deploy</pre></main>",
//!     "https://example.com/docs/deploy-your-app",
//! );
//! assert!(doc.starts_with("---\ntitle: \"Deploy Your App\""));
//! assert!(doc.contains("```bash\n$ npm run deploy\n```"));
//! ```
//!
//! ## Integrity checking
//!
//! ```
//! use docmark::{Config, ContentChecker};
//!
//! let checker = ContentChecker::new(&Config::default().integrity).unwrap();
//! let broken = "**=\u{FFFD}components**";
//! assert!(checker.check(broken).has_issues());
//! assert_eq!(checker.fix(broken), "**📁 components**");
//! ```

pub mod batch;
pub mod classify;
pub mod config;
pub mod convert;
pub mod dom;
pub mod error;
pub mod extract;
pub mod integrity;
pub mod markdown;
pub mod metadata;
pub mod transform;

pub use batch::{BatchSummary, MappingEntry, PageSource, SnapshotSource, convert_all};
pub use classify::{classify_code, classify_image};
pub use config::Config;
pub use convert::{Converter, decode_html, write_document};
pub use dom::{Element, Node, PageTree, parse_html};
pub use error::{Error, Result};
pub use extract::{ContentExtractor, ContentRegion};
pub use integrity::{ContentChecker, CorruptionReport, IntegrityState, Validation, summarize};
pub use metadata::{AnnotatedDocument, DocumentStats, MetadataGenerator, annotate};
pub use transform::DocumentTransformer;
