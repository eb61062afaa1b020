//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests to fetch page content, following redirects
//! - Error classification into [`FetchError`]
//! - Turning an HTML body into the page data the scheduler consumes

use crate::config::UserAgentConfig;
use crate::crawler::parser::parse_page;
use crate::output::Asset;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Maximum redirect hops before a fetch fails
const MAX_REDIRECTS: usize = 10;

/// What a successful fetch yields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageData {
    /// Canonical URL of the page (after redirects)
    pub uri: String,

    /// Same-host links found on the page, fragments removed
    pub internal_hyperlinks: Vec<String>,

    /// Resources referenced by the page
    pub assets: Vec<Asset>,
}

/// Completion report sent from a fetch task back to the coordinator
#[derive(Debug)]
pub struct FetchOutcome {
    /// The URL the fetch was dispatched for
    pub requested: String,

    pub result: Result<PageData, FetchError>,
}

/// Source of page data
///
/// The coordinator only talks to this trait, so crawls can be driven by an
/// in-memory implementation in tests.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url` and extracts its links and assets
    async fn fetch(&self, url: &str) -> Result<PageData, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Whole-request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use batch_crawler::config::UserAgentConfig;
/// use batch_crawler::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`PageFetcher`] backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    /// Fetches a page and extracts same-host links and assets
    ///
    /// # Request Flow
    ///
    /// 1. GET the URL, following up to 10 redirects
    /// 2. Any non-2xx final status is a failure
    /// 3. Non-HTML responses succeed with no links or assets
    /// 4. HTML bodies are parsed against the final URL
    async fn fetch(&self, url: &str) -> Result<PageData, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase());

        if !is_html(content_type.as_deref()) {
            tracing::debug!(
                "Skipping parse of {} (content type {})",
                final_url,
                content_type.as_deref().unwrap_or("unknown")
            );
            return Ok(PageData {
                uri: final_url.to_string(),
                ..PageData::default()
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

        // Links are kept only when they stay on the host that was requested,
        // so an off-site redirect contributes nothing to the frontier.
        let origin = Url::parse(url).unwrap_or_else(|_| final_url.clone());
        Ok(page_data_from_html(&body, &final_url, &origin))
    }
}

/// Builds page data from an HTML body served at `page_url`
///
/// Relative links resolve against `page_url`; only links on the same host
/// and port as `origin` are kept.
pub fn page_data_from_html(html: &str, page_url: &Url, origin: &Url) -> PageData {
    let parsed = parse_page(html, page_url);
    PageData {
        uri: page_url.to_string(),
        internal_hyperlinks: parsed.internal_links(origin),
        assets: parsed.assets,
    }
}

/// A missing Content-Type is treated as HTML
fn is_html(content_type: Option<&str>) -> bool {
    match content_type {
        None => true,
        Some(ct) => ct.contains("text/html") || ct.contains("application/xhtml+xml"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::AssetKind;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_config() -> UserAgentConfig {
        UserAgentConfig {
            crawler_name: "TestCrawler".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: Some("https://example.com/about".to_string()),
        }
    }

    fn fetcher() -> HttpPageFetcher {
        let client = build_http_client(&create_test_config(), Duration::from_secs(5)).unwrap();
        HttpPageFetcher::new(client)
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&create_test_config(), Duration::from_secs(5));
        assert!(client.is_ok());
    }

    #[test]
    fn test_is_html() {
        assert!(is_html(None));
        assert!(is_html(Some("text/html; charset=utf-8")));
        assert!(is_html(Some("application/xhtml+xml")));
        assert!(!is_html(Some("application/pdf")));
    }

    #[test]
    fn test_page_data_keeps_internal_links_only() {
        let url = Url::parse("https://example.com/").unwrap();
        let html = r#"<a href="/a">a</a><a href="https://elsewhere.org/">x</a><img src="/i.png">"#;
        let data = page_data_from_html(html, &url, &url);
        assert_eq!(data.uri, "https://example.com/");
        assert_eq!(data.internal_hyperlinks, vec!["https://example.com/a"]);
        assert_eq!(data.assets, vec![Asset::new(AssetKind::Image, "https://example.com/i.png")]);
    }

    #[tokio::test]
    async fn test_fetch_html_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(header("user-agent", "TestCrawler/1.0 (+https://example.com/about)"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"<html><body><a href="/docs#top">Docs</a><script src="/app.js"></script></body></html>"#,
                "text/html",
            ))
            .mount(&server)
            .await;

        let url = format!("{}/", server.uri());
        let data = fetcher().fetch(&url).await.unwrap();

        assert_eq!(data.uri, url);
        assert_eq!(data.internal_hyperlinks, vec![format!("{}/docs", server.uri())]);
        assert_eq!(data.assets[0].kind, AssetKind::Script);
    }

    #[tokio::test]
    async fn test_fetch_follows_redirect() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(
                ResponseTemplate::new(301).insert_header("location", "/new"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
            .mount(&server)
            .await;

        let data = fetcher()
            .fetch(&format!("{}/old", server.uri()))
            .await
            .unwrap();
        assert_eq!(data.uri, format!("{}/new", server.uri()));
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = fetcher()
            .fetch(&format!("{}/down", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_fetch_non_html_succeeds_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("%PDF-1.4 <a href=\"/x\">", "application/pdf"),
            )
            .mount(&server)
            .await;

        let data = fetcher()
            .fetch(&format!("{}/doc.pdf", server.uri()))
            .await
            .unwrap();
        assert!(data.internal_hyperlinks.is_empty());
        assert!(data.assets.is_empty());
    }
}
