//! Contracts between the comparison side and a notification backend.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compare::ComparisonResult;

/// Identifies the remote repository that receives notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoTarget {
    pub owner: String,
    pub repository: String,
}

impl RepoTarget {
    pub fn new(owner: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repository: repository.into(),
        }
    }

    /// `owner/repository` form, used in logs and as the fallback config id.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repository)
    }
}

/// How repeated notifications manage their pull request comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentBehavior {
    /// One comment per commit; re-notifying the same commit updates it.
    #[default]
    Default,
    /// A single comment per configuration, updated in place.
    Once,
    /// Always post a fresh comment.
    New,
}

impl CommentBehavior {
    pub fn as_str(self) -> &'static str {
        match self {
            CommentBehavior::Default => "default",
            CommentBehavior::Once => "once",
            CommentBehavior::New => "new",
        }
    }
}

/// Delivery policy, fixed when the notifier is built and immutable afterward.
#[derive(Debug, Clone)]
pub struct NotificationPolicy {
    /// Post a pull request comment when an open pull request exists.
    pub post_comment: bool,
    pub comment_behavior: CommentBehavior,
    /// Attach a commit status to the compared commit.
    pub set_commit_status: bool,
    /// Add the short-description note to rendered comments.
    pub short_description: bool,
    /// Stable identity of this notifier configuration, keys comment
    /// ownership across runs.
    pub config_id: String,
}

/// The remote call a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteAction {
    CommitStatus,
    PullRequestLookup,
    Comment,
}

impl RemoteAction {
    pub fn as_str(self) -> &'static str {
        match self {
            RemoteAction::CommitStatus => "commit status",
            RemoteAction::PullRequestLookup => "pull request lookup",
            RemoteAction::Comment => "comment",
        }
    }
}

impl fmt::Display for RemoteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A remote call that failed during a notification run.
///
/// Classified exactly once, where the call was made, and carried back to the
/// caller as data. One failing call never aborts the rest of the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteFailure {
    /// The service answered and rejected the call, with its own message.
    #[error("{action} rejected by the remote API: {message}")]
    Api {
        action: RemoteAction,
        message: String,
    },
    /// Transport breakdowns and responses that could not be interpreted.
    #[error("{action} failed: {detail}")]
    Unknown {
        action: RemoteAction,
        detail: String,
    },
}

impl RemoteFailure {
    pub fn action(&self) -> RemoteAction {
        match self {
            RemoteFailure::Api { action, .. } | RemoteFailure::Unknown { action, .. } => *action,
        }
    }
}

/// A notification backend.
///
/// Implementations receive the pre-computed result exactly once per run and
/// absorb remote breakdowns instead of propagating them: the returned list
/// holds every failed call, and empty means every enabled action succeeded
/// or was legitimately skipped.
pub trait Notifier {
    fn notify(&self, result: &ComparisonResult, report_url: Option<&str>) -> Vec<RemoteFailure>;
}

// ── Tests ──
