//! The interaction rule table.
//!
//! | Event | Condition | Edge | Weight |
//! |---|---|---|---|
//! | Issue closed | closer known, ≠ author | author → closer | 3 |
//! | PR merged/closed | merger/closer known, ≠ author | author → resolver | 3 |
//! | Review submitted | PR author known, ≠ reviewer | PR author → reviewer | 2 |
//! | Comment posted | thread author known, ≠ commenter | thread author → commenter | 2 |
//!
//! Each rule turns one record into at most one [`Candidate`]; the pipeline
//! applies candidates to the store. Rules never touch the store themselves.

use std::collections::HashMap;

use crate::error::{Degradation, Stream};
use crate::model::identity::{normalize_author, normalize_counterpart};
use crate::model::{
    CommentRecord, InteractionKind, IssueRecord, PullRequestRecord, ReviewRecord, ReviewState,
};

/// A proposed interaction produced by one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub source: String,
    pub target: String,
    pub kind: InteractionKind,
    pub label: String,
}

/// What a rule decided for a single record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    /// The record yields an interaction.
    Edge(Candidate),
    /// The record is fine but the rule's condition does not hold
    /// (thread still open, no closer recorded).
    NotApplicable,
    /// Author and counterpart resolve to the same identity.
    SelfInteraction,
    /// The record could not be used.
    Degraded(Degradation),
}

impl RuleOutcome {
    fn edge(source: String, target: String, kind: InteractionKind, label: String) -> Self {
        if source == target {
            return Self::SelfInteraction;
        }
        Self::Edge(Candidate {
            source,
            target,
            kind,
            label,
        })
    }
}

/// Where a thread number points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadKind {
    Issue,
    PullRequest,
}

/// Thread number → author, built from issues and pull requests before any
/// rule runs.
#[derive(Debug, Clone, Default)]
pub struct ThreadIndex {
    issues: HashMap<u64, String>,
    pull_requests: HashMap<u64, String>,
}

impl ThreadIndex {
    #[must_use]
    pub fn build(issues: &[IssueRecord], pull_requests: &[PullRequestRecord], unknown: &str) -> Self {
        let mut index = Self::default();
        for issue in issues {
            if let Some(number) = issue.number {
                index
                    .issues
                    .entry(number)
                    .or_insert_with(|| normalize_author(issue.author.as_deref(), unknown));
            }
        }
        for pr in pull_requests {
            if let Some(number) = pr.number {
                index
                    .pull_requests
                    .entry(number)
                    .or_insert_with(|| normalize_author(pr.author.as_deref(), unknown));
            }
        }
        index
    }

    /// Author of any thread, issues first.
    #[must_use]
    pub fn thread_author(&self, number: u64) -> Option<(ThreadKind, &str)> {
        self.issues
            .get(&number)
            .map(|a| (ThreadKind::Issue, a.as_str()))
            .or_else(|| {
                self.pull_requests
                    .get(&number)
                    .map(|a| (ThreadKind::PullRequest, a.as_str()))
            })
    }

    #[must_use]
    pub fn pull_request_author(&self, number: u64) -> Option<&str> {
        self.pull_requests.get(&number).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len() + self.pull_requests.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Rule 1: A opens an issue and B closes it.
#[must_use]
pub fn issue_closure(issue: &IssueRecord, unknown: &str) -> RuleOutcome {
    let Some(number) = issue.number else {
        return RuleOutcome::Degraded(Degradation::MissingColumn {
            stream: Stream::Issues,
            field: "number",
        });
    };
    if !issue.is_closed() {
        return RuleOutcome::NotApplicable;
    }
    let Some(closer) = normalize_counterpart(issue.closed_by.as_deref()) else {
        return RuleOutcome::NotApplicable;
    };
    let author = normalize_author(issue.author.as_deref(), unknown);
    RuleOutcome::edge(
        author,
        closer,
        InteractionKind::IssueClosure,
        format!("Closed issue #{number}"),
    )
}

/// Rule 2: A opens a pull request and B merges or closes it.
#[must_use]
pub fn pull_request_resolution(pr: &PullRequestRecord, unknown: &str) -> RuleOutcome {
    let Some(number) = pr.number else {
        return RuleOutcome::Degraded(Degradation::MissingColumn {
            stream: Stream::PullRequests,
            field: "number",
        });
    };
    let Some(resolver) = normalize_counterpart(pr.resolver()) else {
        return RuleOutcome::NotApplicable;
    };
    let verb = if pr.is_merged() { "Merged" } else { "Closed" };
    let author = normalize_author(pr.author.as_deref(), unknown);
    RuleOutcome::edge(
        author,
        resolver,
        InteractionKind::PullRequestResolution,
        format!("{verb} PR #{number}"),
    )
}

/// Rule 3: B reviews A's pull request.
#[must_use]
pub fn review(review: &ReviewRecord, threads: &ThreadIndex, unknown: &str) -> RuleOutcome {
    let Some(number) = review.pr_number else {
        return RuleOutcome::Degraded(Degradation::MissingColumn {
            stream: Stream::Reviews,
            field: "pr_number",
        });
    };
    let Some(pr_author) = threads.pull_request_author(number) else {
        return RuleOutcome::Degraded(Degradation::UnresolvedReference {
            stream: Stream::Reviews,
            number,
        });
    };
    let reviewer = normalize_author(review.author.as_deref(), unknown);
    let state = review.state.unwrap_or(ReviewState::Other);
    RuleOutcome::edge(
        pr_author.to_string(),
        reviewer,
        InteractionKind::Review,
        format!("Review on PR #{number} ({state})"),
    )
}

/// Rule 4: B comments on A's issue or pull request.
#[must_use]
pub fn comment(comment: &CommentRecord, threads: &ThreadIndex, unknown: &str) -> RuleOutcome {
    let Some(number) = comment.issue_number else {
        return RuleOutcome::Degraded(Degradation::MissingColumn {
            stream: Stream::Comments,
            field: "issue_number",
        });
    };
    let Some((_, thread_author)) = threads.thread_author(number) else {
        return RuleOutcome::Degraded(Degradation::UnresolvedReference {
            stream: Stream::Comments,
            number,
        });
    };
    let commenter = normalize_author(comment.author.as_deref(), unknown);
    RuleOutcome::edge(
        thread_author.to_string(),
        commenter,
        InteractionKind::Comment,
        format!("Comment on #{number}"),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ThreadState, UNKNOWN_IDENTITY};

    fn closed_issue(number: u64, author: Option<&str>, closer: Option<&str>) -> IssueRecord {
        IssueRecord {
            number: Some(number),
            author: author.map(str::to_string),
            state: Some(ThreadState::Closed),
            closed_at: None,
            closed_by: closer.map(str::to_string),
        }
    }

    fn expect_edge(outcome: RuleOutcome) -> Candidate {
        match outcome {
            RuleOutcome::Edge(candidate) => candidate,
            other => panic!("expected edge, got {other:?}"),
        }
    }

    #[test]
    fn closed_issue_points_author_to_closer() {
        let c = expect_edge(issue_closure(
            &closed_issue(1, Some("alice"), Some("bob")),
            UNKNOWN_IDENTITY,
        ));
        assert_eq!(c.source, "alice");
        assert_eq!(c.target, "bob");
        assert_eq!(c.kind, InteractionKind::IssueClosure);
        assert_eq!(c.label, "Closed issue #1");
    }

    #[test]
    fn open_issue_does_not_fire() {
        let mut issue = closed_issue(1, Some("alice"), Some("bob"));
        issue.state = Some(ThreadState::Open);
        assert_eq!(
            issue_closure(&issue, UNKNOWN_IDENTITY),
            RuleOutcome::NotApplicable
        );
    }

    #[test]
    fn issue_without_closer_does_not_fire() {
        let issue = closed_issue(1, Some("alice"), None);
        assert_eq!(
            issue_closure(&issue, UNKNOWN_IDENTITY),
            RuleOutcome::NotApplicable
        );
    }

    #[test]
    fn self_closed_issue_is_discarded() {
        let issue = closed_issue(1, Some("alice"), Some("alice"));
        assert_eq!(
            issue_closure(&issue, UNKNOWN_IDENTITY),
            RuleOutcome::SelfInteraction
        );
    }

    #[test]
    fn missing_author_uses_sentinel() {
        let c = expect_edge(issue_closure(
            &closed_issue(3, None, Some("bob")),
            UNKNOWN_IDENTITY,
        ));
        assert_eq!(c.source, "unknown");
    }

    #[test]
    fn unknown_closing_unknown_is_still_a_self_loop() {
        let issue = closed_issue(3, None, Some("unknown"));
        assert_eq!(
            issue_closure(&issue, UNKNOWN_IDENTITY),
            RuleOutcome::SelfInteraction
        );
    }

    #[test]
    fn issue_without_number_is_missing_column() {
        let mut issue = closed_issue(1, Some("alice"), Some("bob"));
        issue.number = None;
        assert_eq!(
            issue_closure(&issue, UNKNOWN_IDENTITY),
            RuleOutcome::Degraded(Degradation::MissingColumn {
                stream: Stream::Issues,
                field: "number",
            })
        );
    }

    #[test]
    fn merged_pr_labels_merge() {
        let pr = PullRequestRecord {
            number: Some(9),
            author: Some("alice".into()),
            merged: Some(true),
            merged_by: Some("bob".into()),
            ..PullRequestRecord::default()
        };
        let c = expect_edge(pull_request_resolution(&pr, UNKNOWN_IDENTITY));
        assert_eq!((c.source.as_str(), c.target.as_str()), ("alice", "bob"));
        assert_eq!(c.label, "Merged PR #9");
        assert_eq!(c.kind.weight(), 3);
    }

    #[test]
    fn merged_pr_with_only_a_closer_still_fires() {
        let pr = PullRequestRecord {
            number: Some(9),
            author: Some("alice".into()),
            state: Some(ThreadState::Merged),
            merged: Some(true),
            closed_by: Some("bob".into()),
            ..PullRequestRecord::default()
        };
        let c = expect_edge(pull_request_resolution(&pr, UNKNOWN_IDENTITY));
        assert_eq!((c.source.as_str(), c.target.as_str()), ("alice", "bob"));
        assert_eq!(c.label, "Merged PR #9");
    }

    #[test]
    fn closed_pr_labels_close() {
        let pr = PullRequestRecord {
            number: Some(9),
            author: Some("alice".into()),
            state: Some(ThreadState::Closed),
            closed_by: Some("carol".into()),
            ..PullRequestRecord::default()
        };
        let c = expect_edge(pull_request_resolution(&pr, UNKNOWN_IDENTITY));
        assert_eq!(c.target, "carol");
        assert_eq!(c.label, "Closed PR #9");
    }

    #[test]
    fn review_resolves_pr_author() {
        let threads = ThreadIndex::build(
            &[],
            &[PullRequestRecord {
                number: Some(5),
                author: Some("alice".into()),
                ..PullRequestRecord::default()
            }],
            UNKNOWN_IDENTITY,
        );
        let r = ReviewRecord {
            author: Some("bob".into()),
            pr_number: Some(5),
            state: Some(ReviewState::Approved),
        };
        let c = expect_edge(review(&r, &threads, UNKNOWN_IDENTITY));
        assert_eq!((c.source.as_str(), c.target.as_str()), ("alice", "bob"));
        assert_eq!(c.label, "Review on PR #5 (APPROVED)");
    }

    #[test]
    fn review_of_unknown_pr_is_unresolved() {
        let threads = ThreadIndex::default();
        let r = ReviewRecord {
            author: Some("bob".into()),
            pr_number: Some(77),
            state: None,
        };
        assert_eq!(
            review(&r, &threads, UNKNOWN_IDENTITY),
            RuleOutcome::Degraded(Degradation::UnresolvedReference {
                stream: Stream::Reviews,
                number: 77,
            })
        );
    }

    #[test]
    fn reviews_do_not_resolve_against_issues() {
        let threads = ThreadIndex::build(
            &[closed_issue(5, Some("alice"), None)],
            &[],
            UNKNOWN_IDENTITY,
        );
        let r = ReviewRecord {
            author: Some("bob".into()),
            pr_number: Some(5),
            state: None,
        };
        assert!(matches!(
            review(&r, &threads, UNKNOWN_IDENTITY),
            RuleOutcome::Degraded(Degradation::UnresolvedReference { .. })
        ));
    }

    #[test]
    fn comment_prefers_issue_thread() {
        let threads = ThreadIndex::build(
            &[closed_issue(1, Some("alice"), None)],
            &[PullRequestRecord {
                number: Some(1),
                author: Some("zed".into()),
                ..PullRequestRecord::default()
            }],
            UNKNOWN_IDENTITY,
        );
        assert_eq!(threads.thread_author(1), Some((ThreadKind::Issue, "alice")));

        let c = expect_edge(comment(
            &CommentRecord {
                author: Some("carol".into()),
                issue_number: Some(1),
            },
            &threads,
            UNKNOWN_IDENTITY,
        ));
        assert_eq!((c.source.as_str(), c.target.as_str()), ("alice", "carol"));
        assert_eq!(c.label, "Comment on #1");
    }

    #[test]
    fn comment_without_number_is_missing_column() {
        let outcome = comment(
            &CommentRecord {
                author: Some("carol".into()),
                issue_number: None,
            },
            &ThreadIndex::default(),
            UNKNOWN_IDENTITY,
        );
        assert!(matches!(
            outcome,
            RuleOutcome::Degraded(Degradation::MissingColumn {
                field: "issue_number",
                ..
            })
        ));
    }

    #[test]
    fn author_commenting_on_own_thread_is_discarded() {
        let threads = ThreadIndex::build(
            &[closed_issue(1, Some("alice"), None)],
            &[],
            UNKNOWN_IDENTITY,
        );
        let outcome = comment(
            &CommentRecord {
                author: Some("alice".into()),
                issue_number: Some(1),
            },
            &threads,
            UNKNOWN_IDENTITY,
        );
        assert_eq!(outcome, RuleOutcome::SelfInteraction);
    }
}
