use crate::{UrlError, UrlResult};
use url::Url;

/// Scheme assumed when the user gives a bare domain
const DEFAULT_SCHEME: &str = "https";

/// Normalizes user input into the absolute URL the crawl starts from
///
/// # Normalization Steps
///
/// 1. Prefix `https://` when the input carries no scheme
/// 2. Parse the URL; reject if malformed
/// 3. Only HTTP and HTTPS are accepted
/// 4. Keep scheme, host, port and path; drop credentials, query and fragment
/// 5. Empty path becomes /
///
/// # Arguments
///
/// * `input` - A bare domain (`example.com`) or a full URL
///
/// # Returns
///
/// * `Ok(Url)` - The seed URL
/// * `Err(UrlError)` - The input cannot be turned into a crawlable URL
///
/// # Examples
///
/// ```
/// use batch_crawler::url::normalize_seed;
///
/// let seed = normalize_seed("example.com").unwrap();
/// assert_eq!(seed.as_str(), "https://example.com/");
/// ```
pub fn normalize_seed(input: &str) -> UrlResult<Url> {
    let input = input.trim();
    if input.is_empty() {
        return Err(UrlError::Parse("empty seed".to_string()));
    }

    let with_scheme = if input.contains("://") {
        input.to_string()
    } else {
        format!("{}://{}", DEFAULT_SCHEME, input)
    };

    let mut url = Url::parse(&with_scheme).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    // These setters only fail for cannot-be-a-base URLs, which http(s) never are
    let _ = url.set_username("");
    let _ = url.set_password(None);
    url.set_query(None);
    url.set_fragment(None);

    if url.path().is_empty() {
        url.set_path("/");
    }

    Ok(url)
}

/// Returns the location of the robots.txt file governing `seed`
pub fn robots_url(seed: &Url) -> Url {
    let mut robots = seed.clone();
    robots.set_path("/robots.txt");
    robots.set_query(None);
    robots.set_fragment(None);
    robots
}
