//! industry-papers - find PubMed papers with industry-affiliated authors
//!
//! ## Usage
//!
//! ```bash
//! industry-papers "CRISPR gene editing" --email me@example.org
//! industry-papers "mRNA vaccine" -f results.csv --debug
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use industry_papers::client::{DEFAULT_BASE_URL, DEFAULT_EMAIL};
use industry_papers::{
    report, AffiliationClassifier, ClientConfig, EutilsClient, Pipeline, PipelineOptions,
};
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Fetch PubMed papers with industry affiliations
#[derive(Parser)]
#[command(name = "industry-papers")]
#[command(version, about, long_about = None)]
struct Cli {
    /// PubMed search query
    query: String,

    /// Output CSV filename (prints a table when omitted)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Contact email sent to PubMed with every request
    #[arg(long, default_value = DEFAULT_EMAIL)]
    email: String,

    /// Maximum number of search results to process
    #[arg(short, long, default_value = "200", value_parser = clap::value_parser!(u32).range(1..))]
    max_results: u32,

    /// Records requested per efetch call
    #[arg(long, default_value = "50", value_parser = clap::value_parser!(u64).range(1..))]
    batch_size: u64,

    /// E-utilities base URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for the table
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig {
        base_url: cli.base_url,
        email: cli.email,
        ..Default::default()
    };
    let client = EutilsClient::new(config).context("Failed to set up PubMed client")?;

    let options = PipelineOptions {
        max_results: cli.max_results,
        batch_size: usize::try_from(cli.batch_size).context("Invalid --batch-size")?,
    };
    let pipeline = Pipeline::new(client, AffiliationClassifier::default(), options);

    let summary = pipeline
        .run(&cli.query)
        .await
        .with_context(|| format!("PubMed search for {:?} failed", cli.query))?;

    if summary.no_results() {
        warn!("No papers found matching query");
        return Ok(());
    }

    if summary.rows.is_empty() {
        warn!("No papers with industry affiliations found");
        return Ok(());
    }

    match cli.file {
        Some(path) => {
            report::save_csv(&path, &summary.rows)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "Results saved");
            println!("Results saved to {}", path.display());
        }
        None => println!("{}", report::render_table(&summary.rows)),
    }

    Ok(())
}
