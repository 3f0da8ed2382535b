//! ID lookup through the esearch endpoint.

use crate::client::EutilsClient;
use crate::error::{FetchError, Result};
use serde_json::Value;
use tracing::{debug, info, warn};

impl EutilsClient {
    /// Search PubMed and return up to `max_results` PMIDs in relevance order.
    ///
    /// A response without `esearchresult.idlist` yields an empty list rather
    /// than an error. There is no paging past `max_results`.
    pub async fn search_ids(&self, query: &str, max_results: u32) -> Result<Vec<String>> {
        if max_results == 0 {
            return Err(FetchError::Config(
                "max_results must be positive".to_string(),
            ));
        }

        info!(query = query, max_results = max_results, "Searching PubMed");

        let retmax = max_results.to_string();
        let body = self
            .get_text(
                "esearch.fcgi",
                &[("term", query), ("retmode", "json"), ("retmax", &retmax)],
            )
            .await?;

        let ids = parse_search_response(&body)?;
        info!(count = ids.len(), "PubMed search returned PMIDs");
        Ok(ids)
    }
}

/// Pull the id list out of an esearch JSON body.
pub fn parse_search_response(body: &str) -> Result<Vec<String>> {
    let data: Value = serde_json::from_str(body).map_err(|e| {
        FetchError::MalformedResponse(format!("Failed to parse esearch response: {}", e))
    })?;

    let result = &data["esearchresult"];
    if let Some(message) = result.get("ERROR").and_then(Value::as_str) {
        warn!(error = message, "esearch reported an error");
    }

    let Some(idlist) = result.get("idlist").and_then(Value::as_array) else {
        warn!("esearch response has no esearchresult.idlist");
        return Ok(Vec::new());
    };

    if let Some(count) = result.get("count").and_then(Value::as_str) {
        debug!(total = count, returned = idlist.len(), "esearch hit count");
    }

    Ok(idlist
        .iter()
        .filter_map(|v| v.as_str().map(String::from))
        .collect())
}
