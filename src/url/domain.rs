use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (which shouldn't happen for valid HTTP(S) URLs), it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use batch_crawler::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true if both URLs live on the same host and port
///
/// The scheme is not compared, so `http://` links on an `https://` site
/// still count as internal.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use batch_crawler::url::same_host;
///
/// let page = Url::parse("https://example.com/a").unwrap();
/// let link = Url::parse("https://example.com/b").unwrap();
/// let other = Url::parse("https://other.com/b").unwrap();
/// assert!(same_host(&page, &link));
/// assert!(!same_host(&page, &other));
/// ```
pub fn same_host(a: &Url, b: &Url) -> bool {
    match (extract_domain(a), extract_domain(b)) {
        (Some(host_a), Some(host_b)) => host_a == host_b && a.port() == b.port(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_domain() {
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_extract_with_port() {
        let url = Url::parse("https://example.com:8080/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_same_host_ignores_scheme() {
        let a = Url::parse("https://example.com/").unwrap();
        let b = Url::parse("http://example.com/page").unwrap();
        assert!(same_host(&a, &b));
    }

    #[test]
    fn test_subdomain_is_different_host() {
        let a = Url::parse("https://example.com/").unwrap();
        let b = Url::parse("https://blog.example.com/").unwrap();
        assert!(!same_host(&a, &b));
    }

    #[test]
    fn test_port_mismatch() {
        let a = Url::parse("http://127.0.0.1:4000/").unwrap();
        let b = Url::parse("http://127.0.0.1:4001/").unwrap();
        assert!(!same_host(&a, &b));
    }
}
