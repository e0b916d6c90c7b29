//! content-check - validate one converted document
//!
//! Exit status is 0 when the file is clean and 1 when issues were found or
//! the file could not be decoded. Usage errors also exit with 1.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use docmark::integrity::summarize;
use docmark::{Config, ContentChecker, Validation, write_document};

#[derive(Parser)]
#[command(name = "content-check")]
#[command(version, about = "Check a Markdown document for encoding corruption", long_about = None)]
struct Cli {
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Write the repaired content back to FILE
    #[arg(long)]
    write: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// TOML configuration file
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(usage_status(&err));
        }
    };

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

/// Help and version exit 0, usage errors 1.
fn usage_status(err: &clap::Error) -> u8 {
    if err.use_stderr() { 1 } else { 0 }
}

/// Returns whether the file was clean.
fn run(cli: Cli) -> Result<bool> {
    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    let checker = ContentChecker::new(&config.integrity)?;
    let validation = checker
        .validate_file(&cli.file)
        .with_context(|| format!("failed to read {}", cli.file.display()))?;
    let path = cli.file.display().to_string();

    if cli.json {
        let value = serde_json::json!({
            "file": path,
            "state": validation.state().as_str(),
            "has_issues": !matches!(validation, Validation::Clean { .. }),
            "report": validation.report(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print!("{}", summarize(&path, &validation));
    }

    if cli.write
        && let Validation::Repairable { fixed, .. } = &validation
    {
        write_document(&cli.file, fixed)
            .with_context(|| format!("failed to write {}", cli.file.display()))?;
        if !cli.json {
            println!("🔧 Repaired {path}");
        }
    }

    Ok(matches!(validation, Validation::Clean { .. }))
}
