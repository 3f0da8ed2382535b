//! # industry-papers
//!
//! Searches PubMed and reports papers with at least one author from industry.
//!
//! ## Modules
//!
//! - [`client`] - E-utilities HTTP client and its configuration
//! - [`esearch`] - Query → PMID list
//! - [`efetch`] - PMIDs → record XML
//! - [`parser`] - Record XML → titles, dates, authors
//! - [`affiliation`] - Industry/academic classifier and email extraction
//! - [`pipeline`] - Orchestration and report rows
//! - [`report`] - CSV and console output
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use industry_papers::{AffiliationClassifier, ClientConfig, EutilsClient, Pipeline, PipelineOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = EutilsClient::new(ClientConfig::default())?;
//!     let pipeline = Pipeline::new(client, AffiliationClassifier::default(), PipelineOptions::default());
//!     let summary = pipeline.run("CRISPR").await?;
//!     println!("Found {} industry papers", summary.rows.len());
//!     Ok(())
//! }
//! ```

pub mod affiliation;
pub mod client;
pub mod efetch;
pub mod error;
pub mod esearch;
pub mod parser;
pub mod pipeline;
pub mod report;

pub use affiliation::{AffiliationClass, AffiliationClassifier};
pub use client::{ClientConfig, EutilsClient};
pub use error::{FetchError, Result};
pub use pipeline::{IndustryPaper, Pipeline, PipelineOptions, RunSummary};
