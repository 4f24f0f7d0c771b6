use std::fmt;

use serde::Serialize;

/// Machine-readable error codes surfaced by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    InputNotFound,
    InputParseError,
    IdentityNotFound,
    InvalidArgument,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::InputNotFound => "E1002",
            Self::InputParseError => "E1003",
            Self::IdentityNotFound => "E2001",
            Self::InvalidArgument => "E2002",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::InputNotFound => "Event file not found",
            Self::InputParseError => "Event file parse error",
            Self::IdentityNotFound => "Identity not found in graph",
            Self::InvalidArgument => "Invalid argument",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in sociogram.toml and retry."),
            Self::InputNotFound => Some("Pass an exported event bundle with `--events <FILE>`."),
            Self::InputParseError => Some(
                "The bundle must be a JSON object with issues, pull_requests, comments and reviews arrays.",
            ),
            Self::IdentityNotFound => Some("Run `sg stats` to list the identities in the graph."),
            Self::InvalidArgument => Some("Run the command with `--help` to see accepted values."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Event stream a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stream {
    Issues,
    PullRequests,
    Comments,
    Reviews,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Issues => "issues",
            Self::PullRequests => "pull_requests",
            Self::Comments => "comments",
            Self::Reviews => "reviews",
        })
    }
}

/// Non-fatal conditions met while ingesting or analyzing.
///
/// None of these abort a run. Ingestion records them as diagnostics and
/// moves on; analytics return neutral results for [`Degradation::EmptyGraph`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Degradation {
    /// A required field was absent; the record contributes nothing.
    #[error("{stream} record is missing required field `{field}`")]
    MissingColumn { stream: Stream, field: &'static str },

    /// A comment or review pointed at a thread number nobody opened.
    #[error("{stream} record references unknown thread #{number}")]
    UnresolvedReference { stream: Stream, number: u64 },

    /// A row did not fit its record type and was dropped before ingestion.
    #[error("{stream} row {index} could not be read: {reason}")]
    MalformedRecord {
        stream: Stream,
        index: usize,
        reason: String,
    },

    /// A field held a value that could not be interpreted. The record is
    /// still used; the field counts as present but carries no meaning.
    #[error("{stream} record has an unreadable `{field}` value")]
    MalformedValue { stream: Stream, field: &'static str },

    /// A query ran against a graph with no vertices.
    #[error("graph has no vertices")]
    EmptyGraph,
}

impl Degradation {
    /// The stream the offending record came from, if any.
    #[must_use]
    pub const fn stream(&self) -> Option<Stream> {
        match self {
            Self::MissingColumn { stream, .. }
            | Self::UnresolvedReference { stream, .. }
            | Self::MalformedRecord { stream, .. }
            | Self::MalformedValue { stream, .. } => Some(*stream),
            Self::EmptyGraph => None,
        }
    }

    /// Stable short key used when aggregating counts.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MissingColumn { .. } => "missing_column",
            Self::UnresolvedReference { .. } => "unresolved_reference",
            Self::MalformedRecord { .. } => "malformed_record",
            Self::MalformedValue { .. } => "malformed_value",
            Self::EmptyGraph => "empty_graph",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Degradation, ErrorCode, Stream};
    use std::collections::HashSet;

    #[test]
    fn all_codes_are_unique() {
        let all = [
            ErrorCode::ConfigParseError,
            ErrorCode::InputNotFound,
            ErrorCode::InputParseError,
            ErrorCode::IdentityNotFound,
            ErrorCode::InvalidArgument,
        ];

        let mut seen = HashSet::new();
        for code in all {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        let code = ErrorCode::IdentityNotFound.code();
        assert_eq!(code.len(), 5);
        assert!(code.starts_with('E'));
        assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn degradation_messages_name_the_stream() {
        let missing = Degradation::MissingColumn {
            stream: Stream::Comments,
            field: "issue_number",
        };
        assert_eq!(
            missing.to_string(),
            "comments record is missing required field `issue_number`"
        );
        assert_eq!(missing.kind(), "missing_column");

        let unresolved = Degradation::UnresolvedReference {
            stream: Stream::Reviews,
            number: 42,
        };
        assert_eq!(
            unresolved.to_string(),
            "reviews record references unknown thread #42"
        );

        let value = Degradation::MalformedValue {
            stream: Stream::Issues,
            field: "closed_at",
        };
        assert_eq!(value.to_string(), "issues record has an unreadable `closed_at` value");
        assert_eq!(value.kind(), "malformed_value");
    }
}
