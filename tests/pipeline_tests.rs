//! End-to-end pipeline tests against a mock E-utilities server.

use industry_papers::{
    AffiliationClassifier, ClientConfig, EutilsClient, FetchError, Pipeline, PipelineOptions,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn pipeline_for(server: &MockServer, batch_size: usize) -> Pipeline {
    let config = ClientConfig {
        base_url: server.uri(),
        email: "tests@example.org".to_string(),
        ..Default::default()
    };
    let client = EutilsClient::new(config).expect("client builds");
    let options = PipelineOptions {
        max_results: 20,
        batch_size,
    };
    Pipeline::new(client, AffiliationClassifier::default(), options)
}

async fn mount_search(server: &MockServer, term: &str, ids: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("term", term))
        .and(query_param("retmode", "json"))
        .and(query_param("db", "pubmed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "esearchresult": {"count": ids.len().to_string(), "idlist": ids}
        })))
        .mount(server)
        .await;
}

async fn mount_fetch(server: &MockServer, ids: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .and(query_param("id", ids))
        .and(query_param("retmode", "xml"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// `authors` are (fore name, last name, affiliation) triples
fn article(pmid: &str, title: &str, authors: &[(&str, &str, Option<&str>)]) -> String {
    let authors: String = authors
        .iter()
        .map(|(fore, last, affiliation)| {
            let affiliation = affiliation
                .map(|a| format!("<AffiliationInfo><Affiliation>{a}</Affiliation></AffiliationInfo>"))
                .unwrap_or_default();
            format!("<Author><LastName>{last}</LastName><ForeName>{fore}</ForeName>{affiliation}</Author>")
        })
        .collect();

    format!(
        "<PubmedArticle><MedlineCitation><PMID>{pmid}</PMID><Article>\
         <Journal><JournalIssue><PubDate><Year>2023</Year></PubDate></JournalIssue></Journal>\
         <ArticleTitle>{title}</ArticleTitle><AuthorList>{authors}</AuthorList>\
         </Article></MedlineCitation></PubmedArticle>"
    )
}

fn article_set(articles: &[String]) -> String {
    format!(
        "<?xml version=\"1.0\" ?><PubmedArticleSet>{}</PubmedArticleSet>",
        articles.concat()
    )
}

fn industry_article(pmid: &str) -> String {
    article(
        pmid,
        &format!("Paper {pmid}"),
        &[("Kim", "Lee", Some("Acme Pharma Inc, Boston"))],
    )
}

#[tokio::test]
async fn test_crispr_single_industry_author() {
    let server = MockServer::start().await;
    mount_search(&server, "CRISPR", &["37000001"]).await;
    mount_fetch(
        &server,
        "37000001",
        200,
        article_set(&[article(
            "37000001",
            "CRISPR screens in primary T cells",
            &[
                ("Jane", "Doe", Some("Stanford University")),
                ("Raj", "Patel", Some("Moderna Therapeutics, contact@moderna.com")),
            ],
        )]),
    )
    .await;

    let summary = pipeline_for(&server, 50).run("CRISPR").await.expect("run succeeds");

    assert_eq!(summary.found_ids, 1);
    assert_eq!(summary.rows.len(), 1);
    let row = &summary.rows[0];
    assert_eq!(row.pmid, "37000001");
    assert_eq!(row.title, "CRISPR screens in primary T cells");
    assert_eq!(row.pub_date, "2023");
    assert_eq!(row.industry_authors, "Raj Patel");
    assert_eq!(row.company_affiliations, "Moderna Therapeutics, contact@moderna.com");
    assert_eq!(row.corresponding_email, "contact@moderna.com");
}

#[tokio::test]
async fn test_empty_search_is_not_an_error() {
    let server = MockServer::start().await;
    mount_search(&server, "nothing matches this", &[]).await;

    let summary = pipeline_for(&server, 50)
        .run("nothing matches this")
        .await
        .expect("run succeeds");

    assert!(summary.no_results());
    assert!(summary.rows.is_empty());
}

#[tokio::test]
async fn test_missing_idlist_is_no_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"header": {"type": "esearch"}})))
        .mount(&server)
        .await;

    let summary = pipeline_for(&server, 50).run("odd").await.expect("run succeeds");
    assert!(summary.no_results());
}

#[tokio::test]
async fn test_malformed_record_is_skipped() {
    let server = MockServer::start().await;
    mount_search(&server, "kinase", &["101", "102", "103"]).await;

    // The batch fails as a whole, then each id is fetched on its own
    mount_fetch(&server, "101,102,103", 200, "<PubmedArticleSet><PubmedArticle>".to_string()).await;
    mount_fetch(&server, "101", 200, article_set(&[industry_article("101")])).await;
    mount_fetch(
        &server,
        "102",
        200,
        "<PubmedArticleSet><PubmedArticle><PMID>102</Article>".to_string(),
    )
    .await;
    mount_fetch(&server, "103", 200, article_set(&[industry_article("103")])).await;

    let summary = pipeline_for(&server, 50).run("kinase").await.expect("run succeeds");

    let pmids: Vec<&str> = summary.rows.iter().map(|r| r.pmid.as_str()).collect();
    assert_eq!(pmids, vec!["101", "103"]);
    assert_eq!(summary.skipped_ids, vec!["102".to_string()]);
    assert_eq!(summary.parsed_records, 2);
}

#[tokio::test]
async fn test_search_failure_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = pipeline_for(&server, 50).run("CRISPR").await;
    assert!(matches!(
        result,
        Err(FetchError::UpstreamRequest { code: 503, .. })
    ));
}

#[tokio::test]
async fn test_fetch_failure_skips_ids() {
    let server = MockServer::start().await;
    mount_search(&server, "antibody", &["201", "202"]).await;
    mount_fetch(&server, "201", 500, String::new()).await;
    mount_fetch(&server, "202", 200, article_set(&[industry_article("202")])).await;

    let summary = pipeline_for(&server, 1).run("antibody").await.expect("run succeeds");

    assert_eq!(summary.rows.len(), 1);
    assert_eq!(summary.rows[0].pmid, "202");
    assert_eq!(summary.skipped_ids, vec!["201".to_string()]);
}

#[tokio::test]
async fn test_batch_rows_follow_search_order() {
    let server = MockServer::start().await;
    mount_search(&server, "oncology", &["303", "301", "302"]).await;

    // Upstream returns the batch in its own order; 302 has no industry author
    mount_fetch(
        &server,
        "303,301,302",
        200,
        article_set(&[
            industry_article("301"),
            article("302", "Academic only", &[("Ana", "Silva", Some("University of Porto"))]),
            industry_article("303"),
        ]),
    )
    .await;

    let summary = pipeline_for(&server, 50).run("oncology").await.expect("run succeeds");

    let pmids: Vec<&str> = summary.rows.iter().map(|r| r.pmid.as_str()).collect();
    assert_eq!(pmids, vec!["303", "301"]);
    assert_eq!(summary.parsed_records, 3);
    assert!(summary.skipped_ids.is_empty());
    for row in &summary.rows {
        assert_eq!(row.corresponding_email, "N/A");
        assert_eq!(
            row.industry_authors.split("; ").count(),
            row.company_affiliations.split("; ").count()
        );
    }
}

#[tokio::test]
async fn test_batch_status_error_skips_whole_batch() {
    let server = MockServer::start().await;
    mount_search(&server, "vaccine", &["401", "402"]).await;
    mount_fetch(&server, "401,402", 503, String::new()).await;

    // A status error must not turn into one request per id
    for id in ["401", "402"] {
        Mock::given(method("GET"))
            .and(path("/efetch.fcgi"))
            .and(query_param("id", id))
            .respond_with(ResponseTemplate::new(200).set_body_string(article_set(&[industry_article(id)])))
            .expect(0)
            .mount(&server)
            .await;
    }

    let summary = pipeline_for(&server, 50).run("vaccine").await.expect("run succeeds");

    assert!(summary.rows.is_empty());
    assert_eq!(summary.parsed_records, 0);
    assert_eq!(summary.skipped_ids, vec!["401".to_string(), "402".to_string()]);

    let requests = server.received_requests().await.expect("recording enabled");
    let fetches = requests.iter().filter(|r| r.url.path() == "/efetch.fcgi").count();
    assert_eq!(fetches, 1);
}

#[tokio::test]
async fn test_repeated_search_id_gives_repeated_row() {
    let server = MockServer::start().await;
    mount_search(&server, "antibody drug conjugate", &["7", "8", "7"]).await;
    mount_fetch(
        &server,
        "7,8,7",
        200,
        article_set(&[industry_article("7"), industry_article("8")]),
    )
    .await;

    let summary = pipeline_for(&server, 50)
        .run("antibody drug conjugate")
        .await
        .expect("run succeeds");

    let pmids: Vec<&str> = summary.rows.iter().map(|r| r.pmid.as_str()).collect();
    assert_eq!(pmids, vec!["7", "8", "7"]);
    assert_eq!(summary.parsed_records, 3);
    assert!(summary.skipped_ids.is_empty());
}
