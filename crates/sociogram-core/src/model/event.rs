//! Typed collaboration event records.
//!
//! These mirror the rows exported from an issue tracker (issues, pull
//! requests, comments, reviews). Every field the exporter may omit is an
//! `Option` so that a partially-populated row still deserializes; the
//! ingestion pipeline decides what a missing field means.
//!
//! Parsing is lenient at two levels:
//!
//! - **Values**: states match case-insensitively and unknown states become
//!   `Other`; timestamps that are not RFC 3339 are kept verbatim as
//!   [`Timestamp::Unparsed`] and still count as present.
//! - **Rows**: a row that does not fit its record type at all is dropped
//!   into [`EventBatch::rejected`] instead of failing the whole bundle.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Degradation, Stream};

/// Lifecycle state of an issue or pull request as reported by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", from = "String")]
pub enum ThreadState {
    Open,
    Closed,
    Merged,
    /// Any state this version does not know.
    Other,
}

impl ThreadState {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
            Self::Merged => "MERGED",
            Self::Other => "OTHER",
        }
    }
}

impl From<String> for ThreadState {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "OPEN" => Self::Open,
            "CLOSED" => Self::Closed,
            "MERGED" => Self::Merged,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for ThreadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a pull request review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", from = "String")]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    Pending,
    Other,
}

impl ReviewState {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "APPROVED",
            Self::ChangesRequested => "CHANGES_REQUESTED",
            Self::Commented => "COMMENTED",
            Self::Dismissed => "DISMISSED",
            Self::Pending => "PENDING",
            Self::Other => "OTHER",
        }
    }
}

impl From<String> for ReviewState {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "APPROVED" => Self::Approved,
            "CHANGES_REQUESTED" => Self::ChangesRequested,
            "COMMENTED" => Self::Commented,
            "DISMISSED" => Self::Dismissed,
            "PENDING" => Self::Pending,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for ReviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Naive layouts accepted (as UTC) when a timestamp is not RFC 3339.
const NAIVE_LAYOUTS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// A close or merge timestamp as exported.
///
/// Only presence matters to the interaction rules; the parsed instant is
/// informational.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Parsed(DateTime<Utc>),
    Unparsed(String),
}

impl Timestamp {
    /// The instant, if the value is RFC 3339 or one of the naive layouts.
    #[must_use]
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Parsed(at) => Some(*at),
            Self::Unparsed(raw) => NAIVE_LAYOUTS
                .iter()
                .find_map(|layout| NaiveDateTime::parse_from_str(raw.trim(), layout).ok())
                .map(|naive| naive.and_utc()),
        }
    }

    /// `true` when no instant can be read from the value.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        self.instant().is_none()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(at: DateTime<Utc>) -> Self {
        Self::Parsed(at)
    }
}

/// One issue row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub number: Option<u64>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub state: Option<ThreadState>,
    #[serde(default)]
    pub closed_at: Option<Timestamp>,
    /// Actor that closed the issue, when the exporter captured it.
    #[serde(default)]
    pub closed_by: Option<String>,
}

impl IssueRecord {
    /// Fields present with a value that cannot be interpreted.
    #[must_use]
    pub fn unreadable_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.state == Some(ThreadState::Other) {
            fields.push("state");
        }
        if self.closed_at.as_ref().is_some_and(Timestamp::is_malformed) {
            fields.push("closed_at");
        }
        fields
    }

    /// An issue counts as closed when its state says so or a close
    /// timestamp was recorded.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self.state, Some(ThreadState::Closed)) || self.closed_at.is_some()
    }
}

/// One pull request row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRecord {
    pub number: Option<u64>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub state: Option<ThreadState>,
    #[serde(default)]
    pub merged: Option<bool>,
    #[serde(default)]
    pub merged_at: Option<Timestamp>,
    #[serde(default)]
    pub closed_at: Option<Timestamp>,
    #[serde(default)]
    pub merged_by: Option<String>,
    #[serde(default)]
    pub closed_by: Option<String>,
}

impl PullRequestRecord {
    /// Fields present with a value that cannot be interpreted.
    #[must_use]
    pub fn unreadable_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.state == Some(ThreadState::Other) {
            fields.push("state");
        }
        for (field, stamp) in [("merged_at", &self.merged_at), ("closed_at", &self.closed_at)] {
            if stamp.as_ref().is_some_and(Timestamp::is_malformed) {
                fields.push(field);
            }
        }
        fields
    }

    #[must_use]
    pub fn is_merged(&self) -> bool {
        self.merged == Some(true)
            || self.merged_at.is_some()
            || matches!(self.state, Some(ThreadState::Merged))
    }

    /// Closed without (or before) a recorded merge.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self.state, Some(ThreadState::Closed)) || self.closed_at.is_some()
    }

    /// The actor that ended the pull request: the merger when merged
    /// (the closer when no merger was recorded), otherwise the closer.
    #[must_use]
    pub fn resolver(&self) -> Option<&str> {
        if self.is_merged() {
            self.merged_by.as_deref().or(self.closed_by.as_deref())
        } else if self.is_closed() {
            self.closed_by.as_deref()
        } else {
            None
        }
    }
}

/// One comment row. `issue_number` may refer to an issue or a pull request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub issue_number: Option<u64>,
}

/// One review row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub pr_number: Option<u64>,
    #[serde(default)]
    pub state: Option<ReviewState>,
}

/// The four event streams consumed by one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawBatch")]
pub struct EventBatch {
    pub issues: Vec<IssueRecord>,
    pub pull_requests: Vec<PullRequestRecord>,
    pub comments: Vec<CommentRecord>,
    pub reviews: Vec<ReviewRecord>,
    /// Rows that did not fit their record type, in bundle order.
    #[serde(skip)]
    pub rejected: Vec<Degradation>,
}

/// Bundle shape before each row is typed.
#[derive(Deserialize)]
struct RawBatch {
    #[serde(default)]
    issues: Vec<serde_json::Value>,
    #[serde(default)]
    pull_requests: Vec<serde_json::Value>,
    #[serde(default)]
    comments: Vec<serde_json::Value>,
    #[serde(default)]
    reviews: Vec<serde_json::Value>,
}

impl From<RawBatch> for EventBatch {
    fn from(raw: RawBatch) -> Self {
        let mut rejected = Vec::new();
        Self {
            issues: typed_rows(raw.issues, Stream::Issues, &mut rejected),
            pull_requests: typed_rows(raw.pull_requests, Stream::PullRequests, &mut rejected),
            comments: typed_rows(raw.comments, Stream::Comments, &mut rejected),
            reviews: typed_rows(raw.reviews, Stream::Reviews, &mut rejected),
            rejected,
        }
    }
}

fn typed_rows<T: serde::de::DeserializeOwned>(
    rows: Vec<serde_json::Value>,
    stream: Stream,
    rejected: &mut Vec<Degradation>,
) -> Vec<T> {
    let mut typed = Vec::with_capacity(rows.len());
    for (index, row) in rows.into_iter().enumerate() {
        match serde_json::from_value(row) {
            Ok(record) => typed.push(record),
            Err(err) => rejected.push(Degradation::MalformedRecord {
                stream,
                index,
                reason: err.to_string(),
            }),
        }
    }
    typed
}

impl EventBatch {
    /// Total number of rows across all streams, rejected ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
            + self.pull_requests.len()
            + self.comments.len()
            + self.reviews.len()
            + self.rejected.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parse an exported JSON bundle. Absent streams are empty; rows that do
    /// not fit their record type land in [`rejected`](Self::rejected).
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error when the text is not JSON
    /// or a stream is not an array.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Append every record of `other`, stream by stream.
    pub fn extend(&mut self, other: Self) {
        self.issues.extend(other.issues);
        self.pull_requests.extend(other.pull_requests);
        self.comments.extend(other.comments);
        self.reviews.extend(other.reviews);
        self.rejected.extend(other.rejected);
    }
}
