use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity substituted for records whose author is missing.
pub const UNKNOWN_IDENTITY: &str = "unknown";

/// The kinds of interaction the ingestion rules can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    IssueClosure,
    PullRequestResolution,
    Review,
    Comment,
}

impl InteractionKind {
    pub const ALL: [Self; 4] = [
        Self::IssueClosure,
        Self::PullRequestResolution,
        Self::Review,
        Self::Comment,
    ];

    /// Edge weight contributed by one event of this kind.
    #[must_use]
    pub const fn weight(self) -> u64 {
        match self {
            Self::IssueClosure | Self::PullRequestResolution => 3,
            Self::Review | Self::Comment => 2,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IssueClosure => "issue_closure",
            Self::PullRequestResolution => "pull_request_resolution",
            Self::Review => "review",
            Self::Comment => "comment",
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize a raw author field: trims whitespace and substitutes
/// `unknown` for missing or blank values.
#[must_use]
pub fn normalize_author(raw: Option<&str>, unknown: &str) -> String {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(unknown)
        .to_string()
}

/// Normalize a counterpart field (closer, merger). Unlike authors, a
/// missing counterpart is not substituted: the rule simply does not fire.
#[must_use]
pub fn normalize_counterpart(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_weights() {
        assert_eq!(InteractionKind::IssueClosure.weight(), 3);
        assert_eq!(InteractionKind::PullRequestResolution.weight(), 3);
        assert_eq!(InteractionKind::Review.weight(), 2);
        assert_eq!(InteractionKind::Comment.weight(), 2);
    }

    #[test]
    fn missing_author_becomes_sentinel() {
        assert_eq!(normalize_author(None, UNKNOWN_IDENTITY), "unknown");
        assert_eq!(normalize_author(Some("   "), UNKNOWN_IDENTITY), "unknown");
        assert_eq!(normalize_author(Some(" alice "), UNKNOWN_IDENTITY), "alice");
    }

    #[test]
    fn missing_counterpart_stays_missing() {
        assert_eq!(normalize_counterpart(None), None);
        assert_eq!(normalize_counterpart(Some("")), None);
        assert_eq!(normalize_counterpart(Some("bob")), Some("bob".to_string()));
    }
}
