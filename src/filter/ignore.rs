//! Segment-ish ignore rules

/// Whether `path` matches any rule.
///
/// A rule matches when it appears as a whole inner segment, the leading
/// segment, the trailing segment, or the entire path.
pub fn should_ignore<S: AsRef<str>>(path: &str, rules: &[S]) -> bool {
    rules.iter().any(|rule| {
        let rule: &str = rule.as_ref();
        !rule.is_empty() && matches_rule(path, rule)
    })
}

fn matches_rule(path: &str, rule: &str) -> bool {
    path == rule
        || path.contains(&format!("/{}/", rule))
        || path.starts_with(&format!("{}/", rule))
        || path.ends_with(&format!("/{}", rule))
}

/// Ignore rules taken from one settings snapshot
#[derive(Debug, Clone, Default)]
pub struct IgnoreFilter {
    rules: Vec<String>,
}

impl IgnoreFilter {
    pub fn new(rules: Vec<String>) -> Self {
        Self { rules }
    }

    pub fn should_ignore(&self, path: &str) -> bool {
        should_ignore(path, &self.rules)
    }
}
