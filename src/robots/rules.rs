//! Exclusion rule set and the path-prefix filter

use url::Url;

/// Ordered list of disallowed path prefixes
///
/// Built once at startup from the site's robots.txt and never mutated while
/// the crawl runs. An empty set allows everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionRuleSet {
    prefixes: Vec<String>,
}

impl ExclusionRuleSet {
    /// Creates a rule set from disallowed prefixes, skipping empty ones
    ///
    /// An empty `Disallow:` line means "allow everything" in robots.txt, so
    /// it must never become a prefix that matches every path.
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty())
                .collect(),
        }
    }

    /// Creates a permissive rule set that allows everything
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Returns the disallowed prefixes in file order
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    /// Checks whether a URL may be crawled
    ///
    /// The URL's path is compared against every prefix; the first match
    /// disallows it. URLs that fail to parse are allowed, since the fetch
    /// will surface the problem.
    ///
    /// # Examples
    ///
    /// ```
    /// use batch_crawler::robots::ExclusionRuleSet;
    ///
    /// let rules = ExclusionRuleSet::new(["/private"]);
    /// assert!(!rules.is_allowed("https://example.com/private/x"));
    /// assert!(rules.is_allowed("https://example.com/public"));
    /// ```
    pub fn is_allowed(&self, url: &str) -> bool {
        if self.prefixes.is_empty() {
            return true;
        }

        match Url::parse(url) {
            Ok(parsed) => is_path_allowed(parsed.path(), &self.prefixes),
            Err(_) => true,
        }
    }
}

/// Returns false if `path` starts with any of `prefixes`
pub fn is_path_allowed(path: &str, prefixes: &[String]) -> bool {
    !prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
}
