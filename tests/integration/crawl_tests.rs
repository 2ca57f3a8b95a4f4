//! Integration tests for the harvester
//!
//! These tests use wiremock to serve listing and detail pages and run the
//! full harvest cycle end-to-end over HTTP.

use qna_harvest::config::parse_config;
use qna_harvest::crawler::run_harvest;
use qna_harvest::output::write_json_document;
use qna_harvest::{Config, HarvestError};
use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LISTING_PATH: &str = "/category/maliki/";

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, json_path: &str) -> Config {
    parse_config(&format!(
        r#"
[site]
listing-url = "{base}{listing}"
category-label = "Maliki"

[crawler]
request-timeout-secs = 5
max-concurrent-details = 2

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"
contact-email = "test@example.com"

[output]
json-path = "{json}"
"#,
        base = base_url,
        listing = LISTING_PATH,
        json = json_path
    ))
    .expect("test config is valid")
}

fn motif(link: &str, title: &str) -> String {
    format!(
        r#"<article><h2><a href="{}" rel="bookmark">{}</a></h2><p>excerpt</p></article>"#,
        link, title
    )
}

fn detail_page(answer_html: &str, source: &str) -> String {
    format!(
        r#"<html><head><title>Detail</title></head><body>
        <div id="qna_only">{}</div>
        <div class="original_source"><a href="{}" target="_blank">Original source</a></div>
        </body></html>"#,
        answer_html, source
    )
}

async fn mount_page(server: &MockServer, route: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_harvest_single_page() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let listing = format!(
        r#"<html><body><div class="pagination">Pg 1 of 1</div>{}{}</body></html>"#,
        motif(&format!("{}/q/fasting/", base_url), "Fasting while travelling?"),
        motif("/q/prayer/", "Combining \"prayers\"")
    );
    mount_page(&mock_server, LISTING_PATH, 200, listing).await;
    mount_page(
        &mock_server,
        "/q/fasting/",
        200,
        detail_page(
            "<p>It is permitted.</p>\n<p>See the discussion.</p>",
            "https://source.example.com/fasting",
        ),
    )
    .await;
    mount_page(
        &mock_server,
        "/q/prayer/",
        200,
        detail_page("<p>Yes, when travelling.</p>", "https://source.example.com/prayer"),
    )
    .await;

    let dir = tempfile::TempDir::new().expect("temp dir");
    let json_path = dir.path().join("maliki_questions.json");
    let config = create_test_config(&base_url, &json_path.display().to_string());

    let outcome = run_harvest(&config).await.expect("harvest succeeds");
    write_json_document(
        &outcome.records,
        &config.site.category_label,
        &json_path,
    )
    .expect("document written");

    let written = std::fs::read_to_string(&json_path).expect("read output");
    let document: Value = serde_json::from_str(&written).expect("output is valid JSON");
    let items = document["Maliki"].as_array().expect("Maliki array");

    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["Question"], "Fasting while travelling?");
    assert_eq!(
        items[0]["Answer"],
        "It is permitted.\nSee the discussion."
    );
    assert_eq!(items[0]["Source"], "https://source.example.com/fasting");
    assert_eq!(items[1]["Question"], "Combining \"prayers\"");
    assert_eq!(items[1]["Answer"], "Yes, when travelling.");
    assert_eq!(items[1]["Source"], "https://source.example.com/prayer");

    for item in items {
        for key in ["Question", "Answer", "Source"] {
            assert!(!item[key].as_str().unwrap_or_default().is_empty());
        }
    }
}

#[tokio::test]
async fn test_multi_page_harvest_skips_failures() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        LISTING_PATH,
        200,
        format!("Pg 1 of 3{}{}", motif("/q/1/", "One"), motif("/q/broken/", "Broken")),
    )
    .await;
    mount_page(
        &mock_server,
        "/category/maliki/page/2/",
        500,
        "server error".to_string(),
    )
    .await;
    mount_page(
        &mock_server,
        "/category/maliki/page/3/",
        200,
        motif("/q/3/", "Three"),
    )
    .await;
    mount_page(&mock_server, "/q/1/", 200, detail_page("first", "/s/1")).await;
    mount_page(&mock_server, "/q/broken/", 404, String::new()).await;
    mount_page(&mock_server, "/q/3/", 200, detail_page("third", "/s/3")).await;

    let config = create_test_config(&base_url, "unused.json");
    let outcome = run_harvest(&config).await.expect("harvest succeeds");

    let titles: Vec<&str> = outcome.records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["One", "Three"]);
    assert_eq!(outcome.stats.total_pages, 3);
    assert_eq!(outcome.stats.pages_visited, 2);
    assert_eq!(outcome.stats.listing_failures, 1);
    assert_eq!(outcome.stats.detail_failures, 1);
    assert_eq!(outcome.stats.entries_discovered, 3);
}

#[tokio::test]
async fn test_missing_source_container_degrades_gracefully() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        LISTING_PATH,
        200,
        format!("Pg 1 of 1{}", motif("/q/nosource/", "No source")),
    )
    .await;
    mount_page(
        &mock_server,
        "/q/nosource/",
        200,
        r#"<html><body><div id="qna_only">Answer without citation"#.to_string(),
    )
    .await;

    let config = create_test_config(&base_url, "unused.json");
    let outcome = run_harvest(&config).await.expect("harvest succeeds");

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].answer, "Answer without citation");
    assert_eq!(outcome.records[0].source_link, "");
}

#[tokio::test]
async fn test_missing_page_count_aborts() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        LISTING_PATH,
        200,
        format!("<html>{}</html>", motif("/q/1/", "One")),
    )
    .await;

    let config = create_test_config(&base_url, "unused.json");
    let result = run_harvest(&config).await;

    assert!(matches!(
        result,
        Err(HarvestError::PageCountNotFound { .. })
    ));
}

#[tokio::test]
async fn test_unreachable_first_page_aborts() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, LISTING_PATH, 503, String::new()).await;

    let config = create_test_config(&base_url, "unused.json");
    let result = run_harvest(&config).await;

    assert!(matches!(result, Err(HarvestError::Fetch(_))));
}

#[tokio::test]
async fn test_zero_pages_yields_empty_document() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, LISTING_PATH, 200, "Pg 1 of 0".to_string()).await;

    let dir = tempfile::TempDir::new().expect("temp dir");
    let json_path = dir.path().join("empty.json");
    let config = create_test_config(&base_url, &json_path.display().to_string());

    let outcome = run_harvest(&config).await.expect("harvest succeeds");
    write_json_document(&outcome.records, "Maliki", &json_path).expect("document written");

    assert_eq!(
        std::fs::read_to_string(&json_path).expect("read output"),
        r#"{"Maliki": []}"#
    );
}
