pub mod event;
pub mod identity;

pub use event::{
    CommentRecord, EventBatch, IssueRecord, PullRequestRecord, ReviewRecord, ReviewState,
    ThreadState, Timestamp,
};
pub use identity::{InteractionKind, UNKNOWN_IDENTITY};
