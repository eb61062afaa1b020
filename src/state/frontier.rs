//! The crawl frontier: every URL the crawl knows about and whether it is done

use crate::robots::ExclusionRuleSet;
use std::collections::HashMap;

/// A single known URL and its crawl status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: String,
    pub crawled: bool,
}

/// Authoritative set of known URLs
///
/// Entries are only ever added or flagged crawled, never removed, so both
/// the size and the crawled count grow monotonically. Iteration follows
/// insertion order.
#[derive(Debug, Default)]
pub struct Frontier {
    entries: Vec<FrontierEntry>,
    index: HashMap<String, usize>,
    crawled: usize,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a frontier holding only the seed
    pub fn with_seed(seed: &str) -> Self {
        let mut frontier = Self::new();
        frontier.insert_if_new(seed);
        frontier
    }

    /// Inserts `url` as pending unless it, or its trailing-slash twin, is known
    ///
    /// `https://example.com/page` and `https://example.com/page/` are treated
    /// as the same page: whichever is seen first is kept.
    ///
    /// # Returns
    ///
    /// `true` if a new entry was created
    pub fn insert_if_new(&mut self, url: &str) -> bool {
        if self.is_known(url) {
            return false;
        }

        self.index.insert(url.to_string(), self.entries.len());
        self.entries.push(FrontierEntry {
            url: url.to_string(),
            crawled: false,
        });
        true
    }

    /// Inserts every link that passes the exclusion rules and is not yet known
    ///
    /// # Returns
    ///
    /// The number of new entries
    pub fn absorb_links<'a, I>(&mut self, links: I, rules: &ExclusionRuleSet) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut added = 0;
        for link in links {
            if !rules.is_allowed(link) {
                tracing::trace!("Excluded by robots.txt: {}", link);
                continue;
            }
            if self.insert_if_new(link) {
                added += 1;
            }
        }
        added
    }

    /// Flags a URL as crawled; no-op for unknown or already-crawled URLs
    ///
    /// # Returns
    ///
    /// `true` if the flag changed
    pub fn mark_crawled(&mut self, url: &str) -> bool {
        let Some(&position) = self.index.get(url) else {
            return false;
        };
        let entry = &mut self.entries[position];
        if entry.crawled {
            return false;
        }
        entry.crawled = true;
        self.crawled += 1;
        true
    }

    /// Lazily yields every pending URL in insertion order
    ///
    /// Each call starts a fresh pass over the frontier.
    pub fn pending_urls(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries
            .iter()
            .filter(|entry| !entry.crawled)
            .map(|entry| entry.url.as_str())
    }

    /// True when no entry is pending
    pub fn is_fully_crawled(&self) -> bool {
        self.crawled == self.entries.len()
    }

    /// True if `url` itself is an entry
    pub fn contains(&self, url: &str) -> bool {
        self.index.contains_key(url)
    }

    /// Returns the crawled flag for `url`, or None if it is unknown
    pub fn is_crawled(&self, url: &str) -> Option<bool> {
        self.index.get(url).map(|&i| self.entries[i].crawled)
    }

    /// Number of known URLs
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of URLs flagged crawled
    pub fn crawled_count(&self) -> usize {
        self.crawled
    }

    /// All entries in insertion order
    pub fn entries(&self) -> &[FrontierEntry] {
        &self.entries
    }

    fn is_known(&self, url: &str) -> bool {
        if self.index.contains_key(url) {
            return true;
        }
        match url.strip_suffix('/') {
            Some(without_slash) => self.index.contains_key(without_slash),
            None => self.index.contains_key(&format!("{}/", url)),
        }
    }
}
