//! NCBI E-utilities HTTP client.
//!
//! A single `EutilsClient` owns the HTTP connection for a run. Everything that
//! used to be process-wide (base URL, caller identification, timeout) lives in
//! [`ClientConfig`] and is handed over at construction, so tests can point the
//! client at a mock server.

use crate::error::{FetchError, Result};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// E-utilities base URL
pub const DEFAULT_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/";

/// Caller identification used when none is given on the command line
pub const DEFAULT_EMAIL: &str = "your_email@example.com";

/// Value of the `tool` parameter sent with every request
pub const DEFAULT_TOOL: &str = "industry-papers";

/// Upstream database queried by both endpoints
const DATABASE: &str = "pubmed";

/// Connection settings for the E-utilities endpoints
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL the endpoint names are joined onto
    pub base_url: String,
    /// Contact email sent as `email` and in the user agent
    pub email: String,
    /// Application name sent as `tool`
    pub tool: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            email: DEFAULT_EMAIL.to_string(),
            tool: DEFAULT_TOOL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for the esearch/efetch endpoints
pub struct EutilsClient {
    client: reqwest::Client,
    base_url: Url,
    email: String,
    tool: String,
}

impl EutilsClient {
    /// Create a new client from `config`.
    ///
    /// Fails with [`FetchError::Config`] if the base URL does not parse or the
    /// HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = parse_base_url(&config.base_url)?;

        let client = reqwest::Client::builder()
            .user_agent(format!(
                "{}/{} (mailto:{})",
                config.tool,
                env!("CARGO_PKG_VERSION"),
                config.email
            ))
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            email: config.email,
            tool: config.tool,
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// GET `endpoint` with the shared `db`/`email`/`tool` parameters plus
    /// `params`, returning the body on a success status.
    pub(crate) async fn get_text(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String> {
        let url = self
            .base_url
            .join(endpoint)
            .map_err(|e| FetchError::Config(format!("Invalid endpoint '{}': {}", endpoint, e)))?;

        debug!(url = %url, params = ?params, "Sending E-utilities request");

        let response = self
            .client
            .get(url)
            .query(&[("db", DATABASE)])
            .query(params)
            .query(&[("email", self.email.as_str()), ("tool", self.tool.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UpstreamRequest {
                code: status.as_u16(),
                message: format!("{} returned {}", endpoint, status),
            });
        }

        Ok(response.text().await?)
    }
}

/// Parse the base URL, making sure it ends in `/` so endpoint names join
/// below it instead of replacing its last segment.
fn parse_base_url(raw: &str) -> Result<Url> {
    let mut raw = raw.trim().to_string();
    if !raw.ends_with('/') {
        raw.push('/');
    }

    let url = Url::parse(&raw)
        .map_err(|e| FetchError::Config(format!("Invalid base URL '{}': {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::Config(format!(
            "Unsupported base URL scheme '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_url_adds_trailing_slash() -> Result<()> {
        let url = parse_base_url("http://127.0.0.1:8080/entrez/eutils")?;
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/entrez/eutils/");

        let endpoint = url.join("esearch.fcgi").expect("join failed");
        assert_eq!(endpoint.path(), "/entrez/eutils/esearch.fcgi");
        Ok(())
    }

    #[test]
    fn test_parse_base_url_rejects_garbage() {
        assert!(matches!(parse_base_url("not a url"), Err(FetchError::Config(_))));
        assert!(matches!(
            parse_base_url("ftp://example.com/"),
            Err(FetchError::Config(_))
        ));
    }

    #[test]
    fn test_default_config_points_at_ncbi() -> Result<()> {
        let client = EutilsClient::new(ClientConfig::default())?;
        assert_eq!(client.base_url().host_str(), Some("eutils.ncbi.nlm.nih.gov"));
        Ok(())
    }
}
