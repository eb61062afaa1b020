//! HTML parser for extracting links and assets
//!
//! This module handles parsing HTML content to extract:
//! - Hyperlinks to follow (from <a> tags and canonical links)
//! - Assets the page references (images, scripts, stylesheets, media, icons)

use crate::output::{Asset, AssetKind};
use crate::url::same_host;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// All links found on the page (absolute URLs, fragments removed)
    pub links: Vec<String>,

    /// Referenced assets in document order, without duplicates
    pub assets: Vec<Asset>,
}

impl ParsedPage {
    /// Links that stay on the same host as `page_url`, deduplicated
    pub fn internal_links(&self, page_url: &Url) -> Vec<String> {
        let mut seen = HashSet::new();
        self.links
            .iter()
            .filter(|link| {
                Url::parse(link)
                    .map(|u| same_host(page_url, &u))
                    .unwrap_or(false)
            })
            .filter(|link| seen.insert(link.as_str()))
            .cloned()
            .collect()
    }
}

/// Elements that may reference an asset
const ASSET_SELECTOR: &str = "img[src], script[src], link[href], video[src], audio[src], source[src]";

/// Parses HTML content and extracts links and assets
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags
/// - `<link rel="canonical" href="...">`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The base URL for resolving relative links
///
/// # Example
///
/// ```
/// use batch_crawler::crawler::parse_page;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/page">Link</a><img src="logo.png"></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_page(html, &base_url);
/// assert_eq!(parsed.links, vec!["https://example.com/page".to_string()]);
/// assert_eq!(parsed.assets[0].url, "https://example.com/logo.png");
/// ```
pub fn parse_page(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);
    let base_url = document_base(&document, base_url);

    ParsedPage {
        links: extract_links(&document, &base_url),
        assets: extract_assets(&document, &base_url),
    }
}

/// Honors a `<base href>` element when present
fn document_base(document: &Html, page_url: &Url) -> Url {
    Selector::parse("base[href]")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .and_then(|el| el.value().attr("href"))
                .and_then(|href| page_url.join(href.trim()).ok())
        })
        .unwrap_or_else(|| page_url.clone())
}

/// Extracts all valid links from the HTML document
fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            // Skip if it has the download attribute
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    links.push(absolute_url);
                }
            }
        }
    }

    if let Ok(canonical_selector) = Selector::parse("link[rel='canonical'][href]") {
        for element in document.select(&canonical_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// Extracts asset references in document order, without duplicates
fn extract_assets(document: &Html, base_url: &Url) -> Vec<Asset> {
    let mut assets = Vec::new();
    let mut seen = HashSet::new();

    let Ok(selector) = Selector::parse(ASSET_SELECTOR) else {
        return assets;
    };

    for element in document.select(&selector) {
        let value = element.value();
        let Some((kind, attr)) = classify_asset(value) else {
            continue;
        };
        let Some(href) = value.attr(attr) else {
            continue;
        };
        if let Some(url) = resolve_link(href, base_url) {
            if seen.insert((kind, url.clone())) {
                assets.push(Asset::new(kind, url));
            }
        }
    }

    assets
}

/// Maps an element to its asset kind and the attribute carrying its URL
///
/// `<link>` only counts when its `rel` names a stylesheet or an icon.
fn classify_asset(element: &scraper::node::Element) -> Option<(AssetKind, &'static str)> {
    match element.name() {
        "img" => Some((AssetKind::Image, "src")),
        "script" => Some((AssetKind::Script, "src")),
        "video" | "audio" | "source" => Some((AssetKind::Media, "src")),
        "link" => {
            let rel = element.attr("rel")?.to_ascii_lowercase();
            let has_token = |token: &str| rel.split_whitespace().any(|t| t == token);
            if has_token("stylesheet") {
                Some((AssetKind::Stylesheet, "href"))
            } else if has_token("icon") {
                Some((AssetKind::Icon, "href"))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }
    absolute_url.set_fragment(None);
    Some(absolute_url.to_string())
}
