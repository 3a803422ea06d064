//! Blocking GitHub REST v3 client.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use lookout_core::{CommentBehavior, RepoTarget};

use crate::api::{ApiError, CommentRequest, GitHubApi, PullRequestRef, StatusRequest};

/// Public GitHub endpoint. Overridable for GitHub Enterprise installs.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("lookout/", env!("CARGO_PKG_VERSION"));
const TIMEOUT: Duration = Duration::from_secs(10);

/// Comment listings are read one page deep; the marked comment is expected
/// within the first hundred.
const COMMENT_PAGE_SIZE: usize = 100;

pub struct GitHubClient {
    agent: ureq::Agent,
    api_base: String,
    token: String,
}

impl GitHubClient {
    /// Build a client against `api_base`. An empty token sends
    /// unauthenticated requests, which is enough for dry runs against
    /// public repositories.
    pub fn new(api_base: impl Into<String>, token: impl Into<String>) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(TIMEOUT))
            .http_status_as_error(false)
            .build()
            .new_agent();
        let api_base = api_base.into();
        Self {
            agent,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn get(&self, path: &str) -> Result<serde_json::Value, ApiError> {
        let url = format!("{}{path}", self.api_base);
        let mut request = self
            .agent
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT);
        if !self.token.is_empty() {
            request = request.header("Authorization", &format!("Bearer {}", self.token));
        }
        let response = request.call().map_err(transport)?;
        read_json(response)
    }

    fn post(&self, path: &str, body: &serde_json::Value) -> Result<serde_json::Value, ApiError> {
        let url = format!("{}{path}", self.api_base);
        let mut request = self
            .agent
            .post(&url)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT)
            .header("Content-Type", "application/json");
        if !self.token.is_empty() {
            request = request.header("Authorization", &format!("Bearer {}", self.token));
        }
        let response = request.send(body.to_string()).map_err(transport)?;
        read_json(response)
    }

    fn patch(&self, path: &str, body: &serde_json::Value) -> Result<serde_json::Value, ApiError> {
        let url = format!("{}{path}", self.api_base);
        let mut request = self
            .agent
            .patch(&url)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT)
            .header("Content-Type", "application/json");
        if !self.token.is_empty() {
            request = request.header("Authorization", &format!("Bearer {}", self.token));
        }
        let response = request.send(body.to_string()).map_err(transport)?;
        read_json(response)
    }

    fn create_comment(&self, target: &RepoTarget, number: u64, body: &str) -> Result<(), ApiError> {
        let path = format!(
            "/repos/{}/{}/issues/{number}/comments",
            target.owner, target.repository
        );
        self.post(&path, &json!({ "body": body }))?;
        Ok(())
    }

    fn update_comment(&self, target: &RepoTarget, id: u64, body: &str) -> Result<(), ApiError> {
        let path = format!(
            "/repos/{}/{}/issues/comments/{id}",
            target.owner, target.repository
        );
        self.patch(&path, &json!({ "body": body }))?;
        Ok(())
    }

    /// Find this configuration's own comment on the pull request.
    fn find_marked_comment(
        &self,
        target: &RepoTarget,
        number: u64,
        marker: &str,
    ) -> Result<Option<u64>, ApiError> {
        let path = format!(
            "/repos/{}/{}/issues/{number}/comments?per_page={COMMENT_PAGE_SIZE}",
            target.owner, target.repository
        );
        let value = self.get(&path)?;
        let comments: Vec<IssueComment> = serde_json::from_value(value).map_err(decode)?;
        Ok(comments
            .into_iter()
            .find(|c| c.body.as_deref().is_some_and(|b| b.contains(marker)))
            .map(|c| c.id))
    }
}

impl GitHubApi for GitHubClient {
    fn create_commit_status(
        &self,
        target: &RepoTarget,
        request: &StatusRequest<'_>,
    ) -> Result<(), ApiError> {
        let path = format!(
            "/repos/{}/{}/statuses/{}",
            target.owner, target.repository, request.commit
        );
        let mut body = json!({
            "state": request.state.as_str(),
            "description": request.description,
            "context": request.context,
        });
        if let Some(url) = request.target_url {
            body["target_url"] = json!(url);
        }
        self.post(&path, &body)?;
        debug!(commit = request.commit, "commit status created");
        Ok(())
    }

    fn list_open_pull_requests(
        &self,
        target: &RepoTarget,
        branch: &str,
    ) -> Result<Vec<PullRequestRef>, ApiError> {
        let path = format!(
            "/repos/{}/{}/pulls?state=open&head={}:{branch}",
            target.owner, target.repository, target.owner
        );
        let value = self.get(&path)?;
        serde_json::from_value(value).map_err(decode)
    }

    fn post_comment(
        &self,
        target: &RepoTarget,
        request: &CommentRequest<'_>,
    ) -> Result<(), ApiError> {
        match comment_marker(request) {
            None => self.create_comment(target, request.number, request.body)?,
            Some(marker) => {
                let body = format!("{}\n\n{marker}", request.body);
                match self.find_marked_comment(target, request.number, &marker)? {
                    Some(id) => {
                        debug!(comment = id, "updating marked comment");
                        self.update_comment(target, id, &body)?;
                    }
                    None => self.create_comment(target, request.number, &body)?,
                }
            }
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct IssueComment {
    id: u64,
    #[serde(default)]
    body: Option<String>,
}

/// Hidden HTML marker keying a comment to this configuration. The default
/// behavior also keys on the commit, so each commit owns one comment and
/// re-notifying the same commit updates it. `new` posts unmarked comments.
fn comment_marker(request: &CommentRequest<'_>) -> Option<String> {
    match request.behavior {
        CommentBehavior::New => None,
        CommentBehavior::Once => Some(format!("<!-- lookout: {} -->", request.config_id)),
        CommentBehavior::Default => Some(format!(
            "<!-- lookout: {}@{} -->",
            request.config_id, request.commit
        )),
    }
}

fn read_json(
    mut response: ureq::http::Response<ureq::Body>,
) -> Result<serde_json::Value, ApiError> {
    let status = response.status().as_u16();
    let text = response.body_mut().read_to_string().map_err(transport)?;
    if !(200..300).contains(&status) {
        return Err(match error_message(&text) {
            Some(message) => ApiError::Remote { status, message },
            None => ApiError::Decode {
                detail: format!("HTTP {status} with an unrecognized body"),
            },
        });
    }
    if text.trim().is_empty() {
        return Ok(serde_json::Value::Null);
    }
    serde_json::from_str(&text).map_err(decode)
}

/// Extract the `message` field GitHub error bodies carry.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("message")?.as_str().map(str::to_string)
}

fn transport(e: ureq::Error) -> ApiError {
    ApiError::Transport {
        detail: e.to_string(),
    }
}

fn decode(e: serde_json::Error) -> ApiError {
    ApiError::Decode {
        detail: e.to_string(),
    }
}

// ── Tests ──
