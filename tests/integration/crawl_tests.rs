//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use batch_crawler::config::{Config, CrawlerConfig, OutputConfig, OutputFormat, UserAgentConfig};
use batch_crawler::crawler::run_crawl;
use batch_crawler::{AssetKind, OutputRecord};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling `seed` into `output`
fn create_test_config(seed: &str, output: &Path, format: OutputFormat) -> Config {
    Config {
        crawler: CrawlerConfig {
            seed: Some(seed.to_string()),
            batch_size: 5,
            batch_retries: 5,
            tick_interval_ms: 20, // Very short for testing
            request_timeout_secs: 5,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: Some("https://example.com/contact".to_string()),
        },
        output: OutputConfig {
            path: output.display().to_string(),
            format,
        },
    }
}

/// An HTML response with the given body
fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html")
}

async fn mount_page(server: &MockServer, page: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html(body))
        .mount(server)
        .await;
}

fn read_json_records(path: &Path) -> Vec<OutputRecord> {
    let content = std::fs::read_to_string(path).expect("Output file missing");
    serde_json::from_str(&content).expect("Output is not a record array")
}

#[tokio::test]
async fn test_full_crawl_writes_json() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // No robots.txt is mounted; wiremock answers 404

    mount_page(
        &mock_server,
        "/",
        format!(
            r#"<html><head><link rel="stylesheet" href="/site.css"></head><body>
            <img src="/logo.png">
            <a href="{}/page1">Page 1</a>
            <a href="/page2#top">Page 2</a>
            <a href="https://elsewhere.example.org/">Elsewhere</a>
            </body></html>"#,
            base_url
        ),
    )
    .await;
    mount_page(
        &mock_server,
        "/page1",
        r#"<html><body><a href="/">Home</a><script src="/app.js"></script></body></html>"#
            .to_string(),
    )
    .await;
    mount_page(
        &mock_server,
        "/page2",
        r#"<html><body>Content 2</body></html>"#.to_string(),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out").join("crawl.json");
    let config = create_test_config(&base_url, &output, OutputFormat::Json);

    let report = run_crawl(&config).await.expect("Crawl failed");

    assert_eq!(report.pages_found, 3);
    assert_eq!(report.pages_crawled, 3);
    assert_eq!(report.records_written, 3);
    assert_eq!(report.stragglers_dropped, 0);
    assert_eq!(report.output_location, output.display().to_string());

    let records = read_json_records(&output);
    let uris: Vec<&str> = records.iter().map(|r| r.uri.as_str()).collect();
    assert_eq!(
        uris,
        vec![
            format!("{}/", base_url),
            format!("{}/page1", base_url),
            format!("{}/page2", base_url)
        ]
    );

    let home = &records[0];
    assert!(home
        .assets
        .iter()
        .any(|a| a.kind == AssetKind::Image && a.url == format!("{}/logo.png", base_url)));
    assert!(home
        .assets
        .iter()
        .any(|a| a.kind == AssetKind::Stylesheet && a.url == format!("{}/site.css", base_url)));
    assert_eq!(records[1].assets[0].kind, AssetKind::Script);

    // No temp file left behind
    assert!(!dir.path().join("out").join("crawl.json.tmp").exists());
}

#[tokio::test]
async fn test_robots_txt_respect() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "User-agent: Googlebot\nDisallow: /allowed\n\nUser-agent: *\nDisallow: /private\n",
        ))
        .mount(&mock_server)
        .await;

    mount_page(
        &mock_server,
        "/",
        format!(
            r#"<html><body>
            <a href="{}/allowed">Allowed Page</a>
            <a href="{}/private/x">Private Page</a>
            <a href="/private">Private Root</a>
            </body></html>"#,
            base_url, base_url
        ),
    )
    .await;
    mount_page(
        &mock_server,
        "/allowed",
        "<html><body>Allowed content</body></html>".to_string(),
    )
    .await;

    // Private pages should never be requested
    Mock::given(method("GET"))
        .and(path("/private/x"))
        .respond_with(html("<html></html>".to_string()))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/private"))
        .respond_with(html("<html></html>".to_string()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("robots.json");
    let config = create_test_config(&base_url, &output, OutputFormat::Json);

    let report = run_crawl(&config).await.expect("Crawl failed");

    assert_eq!(report.pages_found, 2);
    let records = read_json_records(&output);
    assert!(records.iter().all(|r| !r.uri.contains("/private")));

    // Wiremock will automatically verify expectations when mock_server drops
}

#[tokio::test]
async fn test_failing_page_is_dropped_after_retries() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<html><body><a href="/broken">Broken</a><a href="/fine">Fine</a></body></html>"#
            .to_string(),
    )
    .await;
    mount_page(
        &mock_server,
        "/fine",
        "<html><body>ok</body></html>".to_string(),
    )
    .await;

    // Initial attempt plus at most four retry passes
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1..=5)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("failing.json");
    let config = create_test_config(&base_url, &output, OutputFormat::Json);

    let report = run_crawl(&config).await.expect("Crawl failed");

    assert_eq!(report.pages_found, 3);
    assert_eq!(report.pages_crawled, 3);
    assert_eq!(report.records_written, 2);
    assert_eq!(report.stragglers_dropped, 1);

    let records = read_json_records(&output);
    assert!(records.iter().all(|r| !r.uri.ends_with("/broken")));
}

#[tokio::test]
async fn test_trailing_slash_variants_fetched_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<html><body><a href="/docs">Docs</a><a href="/docs/">Docs again</a></body></html>"#
            .to_string(),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(html("<html><body>Docs</body></html>".to_string()))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/docs/"))
        .respond_with(html("<html><body>Docs</body></html>".to_string()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("slash.json");
    let config = create_test_config(&base_url, &output, OutputFormat::Json);

    let report = run_crawl(&config).await.expect("Crawl failed");

    assert_eq!(report.pages_found, 2);
    assert_eq!(read_json_records(&output).len(), 2);
}

#[tokio::test]
async fn test_redirect_recorded_under_final_url() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<html><body><a href="/old">Old</a></body></html>"#.to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(html("<html><body>New</body></html>".to_string()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("redirect.json");
    let config = create_test_config(&base_url, &output, OutputFormat::Json);

    let report = run_crawl(&config).await.expect("Crawl failed");

    assert_eq!(report.pages_crawled, 3);
    let uris: Vec<String> = read_json_records(&output)
        .into_iter()
        .map(|r| r.uri)
        .collect();
    assert_eq!(uris, vec![format!("{}/", base_url), format!("{}/new", base_url)]);
}

#[tokio::test]
async fn test_sqlite_output() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<html><body><a href="/a">A</a><img src="/a.png"></body></html>"#.to_string(),
    )
    .await;
    mount_page(&mock_server, "/a", "<html><body>A</body></html>".to_string()).await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("crawl.db");
    let config = create_test_config(&base_url, &db_path, OutputFormat::Sqlite);

    let report = run_crawl(&config).await.expect("Crawl failed");
    assert_eq!(report.records_written, 2);

    let conn = rusqlite::Connection::open(&db_path).expect("Failed to open DB");

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 2);

    let first: String = conn
        .query_row(
            "SELECT uri FROM records ORDER BY position LIMIT 1",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(first, format!("{}/", base_url));

    let (status, finished_at): (String, Option<String>) = conn
        .query_row("SELECT status, finished_at FROM runs", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .unwrap();
    assert_eq!(status, "completed");
    assert!(finished_at.is_some());
}

#[tokio::test]
async fn test_missing_seed_is_an_error() {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config("example.com", &dir.path().join("x.json"), OutputFormat::Json);
    config.crawler.seed = None;

    assert!(run_crawl(&config).await.is_err());
}
