//! The hosting-service operations a notification run needs.
//!
//! [`GitHubApi`] is the seam between orchestration and HTTP: the real
//! implementation is [`crate::client::GitHubClient`], and test code
//! substitutes an in-memory fake.

use serde::Deserialize;
use thiserror::Error;

use lookout_core::{CommentBehavior, OutcomeState, RepoTarget};

/// Failure surface shared by every [`GitHubApi`] operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The service answered with a structured error body.
    #[error("remote API error (HTTP {status}): {message}")]
    Remote { status: u16, message: String },
    /// The request never completed: connect, TLS, timeout, IO.
    #[error("transport failure: {detail}")]
    Transport { detail: String },
    /// The response did not have the expected shape.
    #[error("unexpected response: {detail}")]
    Decode { detail: String },
}

/// An open pull request, as listed by the service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequestRef {
    pub number: u64,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Inputs for attaching a status to a commit.
#[derive(Debug, Clone, Copy)]
pub struct StatusRequest<'a> {
    pub commit: &'a str,
    pub state: OutcomeState,
    pub description: &'a str,
    /// Status context label, distinguishes this tool from other CI checks.
    pub context: &'a str,
    pub target_url: Option<&'a str>,
}

/// Inputs for delivering a pull request comment.
///
/// `behavior`, `config_id`, and `commit` control comment identity: whether
/// delivery creates a fresh comment or finds and updates an earlier one.
#[derive(Debug, Clone, Copy)]
pub struct CommentRequest<'a> {
    pub number: u64,
    pub body: &'a str,
    pub behavior: CommentBehavior,
    pub config_id: &'a str,
    pub commit: &'a str,
}

pub trait GitHubApi {
    /// Create (or overwrite) the status attached to a commit.
    fn create_commit_status(
        &self,
        target: &RepoTarget,
        request: &StatusRequest<'_>,
    ) -> Result<(), ApiError>;

    /// List open pull requests whose head branch is `branch` on the target
    /// owner's repository, in the service's default ordering.
    fn list_open_pull_requests(
        &self,
        target: &RepoTarget,
        branch: &str,
    ) -> Result<Vec<PullRequestRef>, ApiError>;

    /// Deliver a comment to a pull request, honoring the behavior tag.
    fn post_comment(
        &self,
        target: &RepoTarget,
        request: &CommentRequest<'_>,
    ) -> Result<(), ApiError>;
}
