//! Robots.txt parser implementation
//!
//! This module walks robots.txt content with the robotstxt crate's parser and
//! collects the `Disallow` paths that apply to every crawler (`User-agent: *`).

use crate::robots::ExclusionRuleSet;
use robotstxt::{parse_robotstxt, RobotsParseHandler};

/// Collects wildcard-group disallow rules while the robotstxt parser walks a file
#[derive(Debug, Default)]
struct WildcardDisallowCollector {
    /// User agents of the group currently being read
    group_agents: Vec<String>,
    /// Set once a rule line follows the user-agent lines of a group
    in_rules: bool,
    disallowed: Vec<String>,
}

impl WildcardDisallowCollector {
    fn group_is_wildcard(&self) -> bool {
        self.group_agents.iter().any(|agent| agent == "*")
    }
}

impl RobotsParseHandler for WildcardDisallowCollector {
    fn handle_robots_start(&mut self) {
        self.group_agents.clear();
        self.in_rules = false;
        self.disallowed.clear();
    }

    fn handle_robots_end(&mut self) {}

    fn handle_user_agent(&mut self, _line_num: u32, user_agent: &str) {
        // A user-agent line after rules starts a new group
        if self.in_rules {
            self.group_agents.clear();
            self.in_rules = false;
        }
        self.group_agents.push(user_agent.trim().to_string());
    }

    fn handle_allow(&mut self, _line_num: u32, _value: &str) {
        self.in_rules = true;
    }

    fn handle_disallow(&mut self, _line_num: u32, value: &str) {
        self.in_rules = true;
        let value = value.trim();
        if self.group_is_wildcard() && !value.is_empty() {
            self.disallowed.push(value.to_string());
        }
    }

    fn handle_sitemap(&mut self, _line_num: u32, _value: &str) {}

    fn handle_unknown_action(&mut self, _line_num: u32, _action: &str, _value: &str) {}
}

/// Parses robots.txt content into the rule set used by the crawl
///
/// Only groups naming `*` contribute; rules keep their file order. Content
/// that is not robots.txt at all yields an empty rule set.
///
/// # Examples
///
/// ```
/// use batch_crawler::robots::parse_rules;
///
/// let rules = parse_rules("User-agent: *\nDisallow: /private\n");
/// assert_eq!(rules.prefixes(), &["/private".to_string()]);
/// ```
pub fn parse_rules(content: &str) -> ExclusionRuleSet {
    let mut collector = WildcardDisallowCollector::default();
    parse_robotstxt(content, &mut collector);
    ExclusionRuleSet::new(collector.disallowed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_disallow_specific() {
        let rules = parse_rules("User-agent: *\nDisallow: /admin");
        assert_eq!(rules.prefixes(), &["/admin".to_string()]);
    }

    #[test]
    fn test_other_agents_ignored() {
        let content = "User-agent: BadBot\nDisallow: /\n\nUser-agent: *\nDisallow: /tmp";
        let rules = parse_rules(content);
        assert_eq!(rules.prefixes(), &["/tmp".to_string()]);
    }

    #[test]
    fn test_shared_group() {
        let content = "User-agent: GoodBot\nUser-agent: *\nDisallow: /a\nDisallow: /b";
        let rules = parse_rules(content);
        assert_eq!(rules.prefixes(), &["/a".to_string(), "/b".to_string()]);
    }

    #[test]
    fn test_new_group_after_rules() {
        let content = "User-agent: *\nDisallow: /a\nUser-agent: Other\nDisallow: /b";
        let rules = parse_rules(content);
        assert_eq!(rules.prefixes(), &["/a".to_string()]);
    }

    #[test]
    fn test_allow_lines_not_collected() {
        let content = "User-agent: *\nDisallow: /private\nAllow: /private/public";
        let rules = parse_rules(content);
        assert_eq!(rules.prefixes(), &["/private".to_string()]);
    }

    #[test]
    fn test_empty_disallow_allows_all() {
        let rules = parse_rules("User-agent: *\nDisallow:");
        assert!(rules.is_empty());
    }

    #[test]
    fn test_comments_and_case() {
        let content = "# comment\nuser-agent: *\ndisallow: /x # trailing\n";
        let rules = parse_rules(content);
        assert_eq!(rules.prefixes(), &["/x".to_string()]);
    }

    #[test]
    fn test_invalid_robots_txt() {
        let rules = parse_rules("This is not valid robots.txt {{{");
        assert!(rules.is_empty());
    }

    #[test]
    fn test_empty_robots_txt() {
        assert!(parse_rules("").is_empty());
    }
}
