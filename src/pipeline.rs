//! Search → fetch → classify pipeline.
//!
//! The search step runs once and its failure ends the run. Fetching happens
//! in batches. A batch whose body does not parse is fetched again one id at a
//! time so a single bad record only costs itself. A batch that fails with an
//! HTTP status or transport error is not re-requested: all its ids are logged
//! and skipped.

use crate::affiliation::{extract_email, AffiliationClassifier};
use crate::client::EutilsClient;
use crate::error::{FetchError, Result};
use crate::parser::PubmedRecord;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Email column value when no industry author lists one
pub const EMAIL_NOT_AVAILABLE: &str = "N/A";

/// Report column order
pub const REPORT_COLUMNS: &[&str] = &[
    "PubmedID",
    "Title",
    "Publication Date",
    "Non-academic Author(s)",
    "Company Affiliation(s)",
    "Corresponding Author Email",
];

/// One report row: a paper with at least one industry-affiliated author
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndustryPaper {
    #[serde(rename = "PubmedID")]
    pub pmid: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Publication Date")]
    pub pub_date: String,
    /// Industry author names joined with "; "
    #[serde(rename = "Non-academic Author(s)")]
    pub industry_authors: String,
    /// Matching affiliations joined with "; ", same order as the names
    #[serde(rename = "Company Affiliation(s)")]
    pub company_affiliations: String,
    #[serde(rename = "Corresponding Author Email")]
    pub corresponding_email: String,
}

impl IndustryPaper {
    /// Cells in [`REPORT_COLUMNS`] order
    pub fn cells(&self) -> [&str; 6] {
        [
            self.pmid.as_str(),
            self.title.as_str(),
            self.pub_date.as_str(),
            self.industry_authors.as_str(),
            self.company_affiliations.as_str(),
            self.corresponding_email.as_str(),
        ]
    }
}

/// Build the report row for `record`, or `None` if no author has an
/// industry affiliation.
pub fn industry_row(record: &PubmedRecord, classifier: &AffiliationClassifier) -> Option<IndustryPaper> {
    let mut names = Vec::new();
    let mut affiliations = Vec::new();
    let mut email = None;

    for author in &record.authors {
        let Some(affiliation) = author.affiliation.as_deref() else {
            continue;
        };
        if !classifier.is_industry(Some(affiliation)) {
            continue;
        }

        names.push(author.name.as_str());
        affiliations.push(affiliation);
        if email.is_none() {
            email = extract_email(affiliation);
        }
    }

    if names.is_empty() {
        return None;
    }

    Some(IndustryPaper {
        pmid: record.pmid.clone(),
        title: record.title.clone(),
        pub_date: record.pub_date.clone(),
        industry_authors: names.join("; "),
        company_affiliations: affiliations.join("; "),
        corresponding_email: email.unwrap_or_else(|| EMAIL_NOT_AVAILABLE.to_string()),
    })
}

/// Knobs for a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Result cap passed to esearch
    pub max_results: u32,
    /// Ids per efetch request
    pub batch_size: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_results: 200,
            batch_size: 50,
        }
    }
}

/// Outcome of a run
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Ids returned by the search
    pub found_ids: usize,
    /// Records fetched and parsed successfully
    pub parsed_records: usize,
    /// Ids dropped because their fetch or parse failed
    pub skipped_ids: Vec<String>,
    /// Report rows, in search order
    pub rows: Vec<IndustryPaper>,
}

impl RunSummary {
    /// The search itself matched nothing
    pub fn no_results(&self) -> bool {
        self.found_ids == 0
    }
}

/// The search/fetch/classify pipeline
pub struct Pipeline {
    client: EutilsClient,
    classifier: AffiliationClassifier,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(client: EutilsClient, classifier: AffiliationClassifier, options: PipelineOptions) -> Self {
        Self {
            client,
            classifier,
            options,
        }
    }

    /// Run `query` end to end.
    ///
    /// # Errors
    ///
    /// Only a failed search is returned as an error. Fetch and parse failures
    /// skip the affected ids and show up in [`RunSummary::skipped_ids`].
    pub async fn run(&self, query: &str) -> Result<RunSummary> {
        let ids = self.client.search_ids(query, self.options.max_results).await?;

        if ids.is_empty() {
            warn!(query = query, "No papers found matching query");
            return Ok(RunSummary::default());
        }

        let mut summary = RunSummary {
            found_ids: ids.len(),
            ..Default::default()
        };

        let batch_size = self.options.batch_size.max(1);
        let batch_count = ids.len().div_ceil(batch_size);

        for (batch_idx, chunk) in ids.chunks(batch_size).enumerate() {
            info!(
                batch = batch_idx + 1,
                total_batches = batch_count,
                papers = chunk.len(),
                "Processing batch"
            );

            let records = self.fetch_chunk(chunk, &mut summary.skipped_ids).await;
            summary.parsed_records += records.len();
            summary
                .rows
                .extend(records.iter().filter_map(|r| industry_row(r, &self.classifier)));
        }

        info!(
            found = summary.found_ids,
            parsed = summary.parsed_records,
            skipped = summary.skipped_ids.len(),
            rows = summary.rows.len(),
            "Run complete"
        );

        Ok(summary)
    }

    /// Fetch one chunk, falling back to single-id requests if the batch body
    /// is malformed.
    async fn fetch_chunk(&self, ids: &[String], skipped: &mut Vec<String>) -> Vec<PubmedRecord> {
        match self.client.fetch_records(ids).await {
            Ok(records) => match_requested(ids, records, skipped),
            Err(e @ FetchError::MalformedResponse(_)) if ids.len() > 1 => {
                warn!(papers = ids.len(), error = %e, "Batch response malformed, fetching one at a time");

                let mut records = Vec::new();
                for id in ids {
                    let single = std::slice::from_ref(id);
                    match self.client.fetch_records(single).await {
                        Ok(found) => records.extend(match_requested(single, found, skipped)),
                        Err(e) => {
                            warn!(pmid = %id, error = %e, "Skipping record");
                            skipped.push(id.clone());
                        }
                    }
                }
                records
            }
            Err(e) => {
                warn!(pmids = %ids.join(","), error = %e, "Skipping records");
                skipped.extend(ids.iter().cloned());
                Vec::new()
            }
        }
    }
}

/// Line fetched records up with the requested ids, in request order.
///
/// A lone record without a PMID is taken to be the one requested. An id
/// requested twice yields its record twice. Requested ids missing from the
/// response are recorded as skipped.
fn match_requested(
    ids: &[String],
    mut records: Vec<PubmedRecord>,
    skipped: &mut Vec<String>,
) -> Vec<PubmedRecord> {
    if let ([id], [record]) = (ids, records.as_mut_slice()) {
        if record.pmid.is_empty() {
            record.pmid = id.clone();
        }
    }

    let mut by_pmid: HashMap<String, PubmedRecord> = HashMap::new();
    for record in records {
        by_pmid.entry(record.pmid.clone()).or_insert(record);
    }

    let mut ordered = Vec::with_capacity(ids.len());
    for id in ids {
        match by_pmid.get(id) {
            Some(record) => ordered.push(record.clone()),
            None => {
                warn!(pmid = %id, "Record missing from efetch response");
                skipped.push(id.clone());
            }
        }
    }

    for pmid in by_pmid.keys().filter(|pmid| !ids.contains(pmid)) {
        debug!(pmid = %pmid, "Ignoring unrequested record");
    }

    ordered
}
