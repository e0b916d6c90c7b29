//! docmark - documentation to annotated Markdown

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use docmark::batch::load_mapping;
use docmark::integrity::summarize;
use docmark::{Config, ContentChecker, Converter, SnapshotSource, Validation, convert_all, write_document};

#[derive(Parser)]
#[command(name = "docmark")]
#[command(version, about = "Convert documentation pages into annotated Markdown", long_about = None)]
#[command(after_help = "EXAMPLES:
    docmark convert page.html --url https://example.com/docs/setup -o setup.md
    docmark batch mapping.json --pages snapshots/ --out docs/
    docmark check docs/setup.md --write")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert one saved page
    Convert {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// URL the page was fetched from
        #[arg(long)]
        url: String,

        /// Output file (stdout if omitted)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Run the integrity repair on the result
        #[arg(long)]
        repair: bool,
    },

    /// Convert every entry of a mapping file
    Batch {
        #[arg(value_name = "MAPPING")]
        mapping: PathBuf,

        /// Directory of saved pages mirroring the output layout
        #[arg(long, value_name = "DIR")]
        pages: PathBuf,

        /// Output directory
        #[arg(long, value_name = "DIR")]
        out: PathBuf,

        #[arg(long)]
        repair: bool,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check a converted document for corruption
    Check {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Write the repaired content back to FILE
        #[arg(long)]
        write: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };

    match cli.command {
        Command::Convert {
            input,
            url,
            output,
            repair,
        } => {
            config.transform.repair_output |= repair;
            let converter = Converter::new(&config)?;
            let bytes = std::fs::read(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let document = converter.convert_bytes(&bytes, &url);
            match output {
                Some(path) => {
                    write_document(&path, &document)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    tracing::info!(path = %path.display(), "document written");
                }
                None => print!("{document}"),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Batch {
            mapping,
            pages,
            out,
            repair,
            json,
        } => {
            config.transform.repair_output |= repair;
            let converter = Converter::new(&config)?;
            let entries = load_mapping(&mapping)
                .with_context(|| format!("failed to load mapping {}", mapping.display()))?;
            let summary = convert_all(&converter, &entries, &SnapshotSource::new(pages), &out);

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("Converted {}/{} documents", summary.converted.len(), summary.total());
                for failure in &summary.failed {
                    println!("  failed: {} ({}): {}", failure.output.display(), failure.url, failure.error);
                }
            }
            Ok(if summary.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Check { file, write } => check(&config, &file, write),
    }
}

fn check(config: &Config, file: &Path, write: bool) -> Result<ExitCode> {
    let checker = ContentChecker::new(&config.integrity)?;
    let validation = checker
        .validate_file(file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    print!("{}", summarize(&file.display().to_string(), &validation));

    match validation {
        Validation::Clean { .. } => Ok(ExitCode::SUCCESS),
        Validation::Repairable { fixed, .. } => {
            if write {
                write_document(file, &fixed)
                    .with_context(|| format!("failed to write {}", file.display()))?;
                println!("🔧 Repaired {}", file.display());
            }
            Ok(ExitCode::FAILURE)
        }
        Validation::BinaryCorrupt { .. } => Ok(ExitCode::FAILURE),
    }
}
