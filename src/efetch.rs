//! Record retrieval through the efetch endpoint.
//!
//! Ids are sent comma-joined, so one request can return a whole batch of
//! records in a single `PubmedArticleSet`. Batch sizing is up to the caller.

use crate::client::EutilsClient;
use crate::error::{FetchError, Result};
use crate::parser::{parse_records, PubmedRecord};
use tracing::debug;

impl EutilsClient {
    /// Fetch the raw efetch XML for `ids` in one request.
    pub async fn fetch_xml(&self, ids: &[String]) -> Result<String> {
        if ids.is_empty() {
            return Err(FetchError::Config("No PMIDs to fetch".to_string()));
        }

        let joined = ids.join(",");
        debug!(count = ids.len(), ids = %joined, "Fetching PubMed records");

        self.get_text("efetch.fcgi", &[("id", &joined), ("retmode", "xml")])
            .await
    }

    /// Fetch and parse the records for `ids`, in the order upstream returns
    /// them.
    pub async fn fetch_records(&self, ids: &[String]) -> Result<Vec<PubmedRecord>> {
        let xml = self.fetch_xml(ids).await?;
        parse_records(&xml)
    }
}
