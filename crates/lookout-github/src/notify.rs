//! One notification run against GitHub.
//!
//! [`GitHubNotifier`] fixes its target, policy, and client at construction,
//! then drives a run: read the repository HEAD, classify the comparison
//! outcome, attach a commit status, and comment on the open pull request for
//! the current branch. Remote breakdowns are collected, never propagated;
//! unreadable local state only narrows what gets delivered.

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use lookout_core::{
    classify, render_comment, CommentBehavior, CommentPayload, ComparisonResult, ItemCounts,
    NotificationPolicy, Notifier, RemoteAction, RemoteFailure, RepoTarget,
};
use lookout_git::{resolve_head, RepositoryHead};

use crate::api::{ApiError, CommentRequest, GitHubApi, PullRequestRef, StatusRequest};
use crate::client::{GitHubClient, DEFAULT_API_BASE};
use crate::credentials::{decode_client_id, CredentialError};

/// Context label attached to every commit status this tool creates.
pub const STATUS_CONTEXT: &str = "lookout";

// ── Options ──

/// Notifier configuration, as it appears under the `github` key of the
/// config file. Every field is optional; absent fields take the defaults
/// below at load time.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubOptions {
    /// Opaque credential naming the target repository.
    #[serde(default)]
    pub client_id: Option<String>,
    /// Explicit target owner; with `repository`, wins over the client id.
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub repository: Option<String>,
    /// REST endpoint override for GitHub Enterprise.
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default = "default_true")]
    pub pr_comment: bool,
    #[serde(default)]
    pub pr_comment_behavior: CommentBehavior,
    #[serde(default = "default_true")]
    pub set_commit_status: bool,
    #[serde(default)]
    pub short_description: bool,
}

fn default_true() -> bool {
    true
}

// Matches the serde load-time defaults above.
impl Default for GitHubOptions {
    fn default() -> Self {
        Self {
            client_id: None,
            owner: None,
            repository: None,
            api_base: None,
            pr_comment: true,
            pr_comment_behavior: CommentBehavior::Default,
            set_commit_status: true,
            short_description: false,
        }
    }
}

/// Configuration that cannot produce a working notifier.
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("no notification target: set owner and repository, or a client_id")]
    MissingTarget,
    #[error(transparent)]
    Credential(#[from] CredentialError),
}

/// Resolve the notification target: the explicit owner/repository pair when
/// both are present, else the decoded client id.
pub fn resolve_target(options: &GitHubOptions) -> Result<RepoTarget, OptionsError> {
    if let (Some(owner), Some(repository)) = (&options.owner, &options.repository) {
        return Ok(RepoTarget::new(owner, repository));
    }
    match &options.client_id {
        Some(client_id) => {
            let decoded = decode_client_id(client_id)?;
            Ok(RepoTarget::new(decoded.owner, decoded.repository))
        }
        None => Err(OptionsError::MissingTarget),
    }
}

/// Fix the delivery policy. The config id keys comment ownership across
/// runs: the client id when one is configured, else the target slug.
pub fn resolve_policy(options: &GitHubOptions, target: &RepoTarget) -> NotificationPolicy {
    let config_id = options
        .client_id
        .clone()
        .unwrap_or_else(|| target.slug());
    NotificationPolicy {
        post_comment: options.pr_comment,
        comment_behavior: options.pr_comment_behavior,
        set_commit_status: options.set_commit_status,
        short_description: options.short_description,
        config_id,
    }
}

// ── Orchestration ──

/// Find the open pull request whose head is `owner:branch`: the first entry
/// in the service's default ordering, or `None` when there is none. Lookup
/// errors propagate so that "no pull request" and "could not check" stay
/// distinct.
pub fn locate_open_pull_request<C: GitHubApi>(
    client: &C,
    target: &RepoTarget,
    branch: &str,
) -> Result<Option<PullRequestRef>, ApiError> {
    let pulls = client.list_open_pull_requests(target, branch)?;
    Ok(pulls.into_iter().next())
}

pub struct GitHubNotifier<C = GitHubClient> {
    client: C,
    target: RepoTarget,
    policy: NotificationPolicy,
    repo_root: PathBuf,
    dry_run: bool,
}

impl GitHubNotifier<GitHubClient> {
    /// Build a notifier from configuration, resolving target and policy in
    /// one step. `token` may be empty for dry runs.
    pub fn from_options(
        options: &GitHubOptions,
        token: impl Into<String>,
        repo_root: impl Into<PathBuf>,
        dry_run: bool,
    ) -> Result<Self, OptionsError> {
        let target = resolve_target(options)?;
        let policy = resolve_policy(options, &target);
        let api_base = options.api_base.as_deref().unwrap_or(DEFAULT_API_BASE);
        let client = GitHubClient::new(api_base, token);
        Ok(Self::with_client(client, target, policy, repo_root, dry_run))
    }
}

impl<C: GitHubApi> GitHubNotifier<C> {
    /// Assemble a notifier around an arbitrary API implementation.
    pub fn with_client(
        client: C,
        target: RepoTarget,
        policy: NotificationPolicy,
        repo_root: impl Into<PathBuf>,
        dry_run: bool,
    ) -> Self {
        Self {
            client,
            target,
            policy,
            repo_root: repo_root.into(),
            dry_run,
        }
    }

    fn comment_on_pull_request(
        &self,
        branch: &str,
        commit: &str,
        counts: ItemCounts,
        report_url: Option<&str>,
        failures: &mut Vec<RemoteFailure>,
    ) {
        let pull = match locate_open_pull_request(&self.client, &self.target, branch) {
            Ok(Some(pull)) => pull,
            Ok(None) => {
                warn!(branch, "no open pull request; skipping the comment");
                return;
            }
            Err(e) => {
                record(failures, RemoteAction::PullRequestLookup, e);
                return;
            }
        };

        let payload = CommentPayload {
            target: &self.target,
            behavior: self.policy.comment_behavior,
            config_id: &self.policy.config_id,
            counts,
            branch: Some(branch),
            commit: Some(commit),
            short_description: self.policy.short_description,
            report_url,
        };
        let body = render_comment(&payload);

        if self.dry_run {
            info!(number = pull.number, "dry run: skipping the comment");
            return;
        }
        let request = CommentRequest {
            number: pull.number,
            body: &body,
            behavior: self.policy.comment_behavior,
            config_id: &self.policy.config_id,
            commit,
        };
        match self.client.post_comment(&self.target, &request) {
            Ok(()) => debug!(number = pull.number, "comment delivered"),
            Err(e) => record(failures, RemoteAction::Comment, e),
        }
    }
}

impl<C: GitHubApi> Notifier for GitHubNotifier<C> {
    fn notify(&self, result: &ComparisonResult, report_url: Option<&str>) -> Vec<RemoteFailure> {
        let head = resolve_head(&self.repo_root);
        let (branch, commit) = match &head {
            RepositoryHead::Branch { name, commit } => (Some(name.as_str()), commit.as_str()),
            RepositoryHead::Detached { commit } => (None, commit.as_str()),
            RepositoryHead::Unresolved => {
                warn!("repository HEAD is unreadable; nothing to notify");
                return Vec::new();
            }
        };

        let counts = result.counts();
        let outcome = classify(&counts);
        info!(
            commit,
            state = outcome.state.as_str(),
            "notifying {}",
            self.target.slug()
        );

        let mut failures = Vec::new();

        if self.policy.set_commit_status {
            if self.dry_run {
                info!(commit, "dry run: skipping the commit status");
            } else {
                let request = StatusRequest {
                    commit,
                    state: outcome.state,
                    description: outcome.description,
                    context: STATUS_CONTEXT,
                    target_url: report_url,
                };
                match self.client.create_commit_status(&self.target, &request) {
                    Ok(()) => debug!(commit, "commit status set"),
                    Err(e) => record(&mut failures, RemoteAction::CommitStatus, e),
                }
            }
        }

        if self.policy.post_comment {
            match branch {
                Some(branch) => {
                    self.comment_on_pull_request(branch, commit, counts, report_url, &mut failures)
                }
                None => warn!("HEAD is detached; no branch to find a pull request for"),
            }
        }

        failures
    }
}

/// Classify a remote error exactly once, log it, and add it to the run's
/// failure list.
fn record(failures: &mut Vec<RemoteFailure>, action: RemoteAction, err: ApiError) {
    let failure = match err {
        ApiError::Remote { message, .. } => RemoteFailure::Api { action, message },
        other => RemoteFailure::Unknown {
            action,
            detail: other.to_string(),
        },
    };
    error!("{failure}");
    failures.push(failure);
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;
    use std::path::Path;
    use std::process::Command;

    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    // ── Fake API host ──

    #[derive(Default)]
    struct FakeHost {
        open_pulls: Vec<PullRequestRef>,
        fail_status: Option<ApiError>,
        fail_lookup: Option<ApiError>,
        fail_comment: Option<ApiError>,
        statuses: RefCell<Vec<(String, String)>>,
        comments: RefCell<Vec<(u64, String)>>,
        lookups: RefCell<usize>,
    }

    impl GitHubApi for FakeHost {
        fn create_commit_status(
            &self,
            _target: &RepoTarget,
            request: &StatusRequest<'_>,
        ) -> Result<(), ApiError> {
            if let Some(e) = &self.fail_status {
                return Err(e.clone());
            }
            self.statuses
                .borrow_mut()
                .push((request.commit.to_string(), request.state.as_str().to_string()));
            Ok(())
        }

        fn list_open_pull_requests(
            &self,
            _target: &RepoTarget,
            _branch: &str,
        ) -> Result<Vec<PullRequestRef>, ApiError> {
            *self.lookups.borrow_mut() += 1;
            if let Some(e) = &self.fail_lookup {
                return Err(e.clone());
            }
            Ok(self.open_pulls.clone())
        }

        fn post_comment(
            &self,
            _target: &RepoTarget,
            request: &CommentRequest<'_>,
        ) -> Result<(), ApiError> {
            if let Some(e) = &self.fail_comment {
                return Err(e.clone());
            }
            self.comments
                .borrow_mut()
                .push((request.number, request.body.to_string()));
            Ok(())
        }
    }

    fn pull(number: u64) -> PullRequestRef {
        PullRequestRef {
            number,
            html_url: None,
        }
    }

    // ── Repository fixtures ──

    fn git(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .args(args)
            .current_dir(dir)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .expect("git runs");
        assert!(status.success(), "git {args:?} failed");
    }

    fn repo_on_branch(branch: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        git(dir.path(), &["init", "-q"]);
        git(dir.path(), &["config", "user.email", "lookout@test"]);
        git(dir.path(), &["config", "user.name", "Lookout Test"]);
        git(dir.path(), &["checkout", "-q", "-b", branch]);
        std::fs::write(dir.path().join("shot.txt"), "pixels\n").unwrap();
        git(dir.path(), &["add", "shot.txt"]);
        git(dir.path(), &["commit", "-q", "-m", "init"]);
        dir
    }

    fn detached_repo() -> tempfile::TempDir {
        let dir = repo_on_branch("work");
        git(dir.path(), &["checkout", "-q", "--detach"]);
        dir
    }

    // ── Notifier fixtures ──

    fn target() -> RepoTarget {
        RepoTarget::new("acme", "shots")
    }

    fn policy(post_comment: bool, set_commit_status: bool) -> NotificationPolicy {
        NotificationPolicy {
            post_comment,
            comment_behavior: CommentBehavior::Default,
            set_commit_status,
            short_description: false,
            config_id: "acme/shots".into(),
        }
    }

    fn failing_result() -> ComparisonResult {
        ComparisonResult {
            failed_items: vec!["header.png".into()],
            ..Default::default()
        }
    }

    fn remote_err(message: &str) -> ApiError {
        ApiError::Remote {
            status: 422,
            message: message.into(),
        }
    }

    // ── Runs ──

    #[test]
    fn disabled_policies_touch_nothing() {
        let dir = repo_on_branch("topic");
        let host = FakeHost {
            open_pulls: vec![pull(3)],
            ..Default::default()
        };
        let notifier =
            GitHubNotifier::with_client(host, target(), policy(false, false), dir.path(), false);

        let failures = notifier.notify(&failing_result(), None);

        assert!(failures.is_empty());
        assert_eq!(notifier.client.statuses.borrow().len(), 0);
        assert_eq!(notifier.client.comments.borrow().len(), 0);
        assert_eq!(*notifier.client.lookups.borrow(), 0);
    }

    #[test]
    fn unresolved_head_delivers_nothing_and_is_not_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let notifier = GitHubNotifier::with_client(
            FakeHost::default(),
            target(),
            policy(true, true),
            dir.path(),
            false,
        );

        let failures = notifier.notify(&failing_result(), None);

        assert!(failures.is_empty());
        assert_eq!(notifier.client.statuses.borrow().len(), 0);
        assert_eq!(*notifier.client.lookups.borrow(), 0);
    }

    #[test]
    fn status_and_comment_are_delivered_on_a_branch() {
        let dir = repo_on_branch("topic");
        let host = FakeHost {
            open_pulls: vec![pull(12), pull(99)],
            ..Default::default()
        };
        let notifier =
            GitHubNotifier::with_client(host, target(), policy(true, true), dir.path(), false);

        let failures = notifier.notify(&failing_result(), Some("https://r.example/42"));

        assert!(failures.is_empty());
        let statuses = notifier.client.statuses.borrow();
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].1, "failure");
        let comments = notifier.client.comments.borrow();
        assert_eq!(comments.len(), 1);
        // First listed pull request wins.
        assert_eq!(comments[0].0, 12);
        assert!(comments[0].1.contains("Failed items: 1"));
        assert!(comments[0].1.contains("[Report](https://r.example/42)"));
    }

    #[test]
    fn detached_head_still_gets_a_status_but_never_a_comment() {
        let dir = detached_repo();
        let host = FakeHost {
            open_pulls: vec![pull(3)],
            ..Default::default()
        };
        let notifier =
            GitHubNotifier::with_client(host, target(), policy(true, true), dir.path(), false);

        let failures = notifier.notify(&failing_result(), None);

        assert!(failures.is_empty());
        assert_eq!(notifier.client.statuses.borrow().len(), 1);
        assert_eq!(notifier.client.comments.borrow().len(), 0);
        assert_eq!(*notifier.client.lookups.borrow(), 0);
    }

    #[test]
    fn status_failure_does_not_block_the_comment() {
        let dir = repo_on_branch("topic");
        let host = FakeHost {
            open_pulls: vec![pull(5)],
            fail_status: Some(remote_err("Bad credentials")),
            ..Default::default()
        };
        let notifier =
            GitHubNotifier::with_client(host, target(), policy(true, true), dir.path(), false);

        let failures = notifier.notify(&failing_result(), None);

        assert_eq!(
            failures,
            vec![RemoteFailure::Api {
                action: RemoteAction::CommitStatus,
                message: "Bad credentials".into(),
            }]
        );
        assert_eq!(notifier.client.comments.borrow().len(), 1);
    }

    #[test]
    fn no_open_pull_request_is_a_skip_not_a_failure() {
        let dir = repo_on_branch("topic");
        let notifier = GitHubNotifier::with_client(
            FakeHost::default(),
            target(),
            policy(true, true),
            dir.path(),
            false,
        );

        let failures = notifier.notify(&failing_result(), None);

        assert!(failures.is_empty());
        assert_eq!(*notifier.client.lookups.borrow(), 1);
        assert_eq!(notifier.client.comments.borrow().len(), 0);
    }

    #[test]
    fn lookup_breakdown_is_reported_and_distinct_from_no_pull() {
        let dir = repo_on_branch("topic");
        let host = FakeHost {
            fail_lookup: Some(ApiError::Transport {
                detail: "connection reset".into(),
            }),
            ..Default::default()
        };
        let notifier =
            GitHubNotifier::with_client(host, target(), policy(true, false), dir.path(), false);

        let failures = notifier.notify(&failing_result(), None);

        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].action(), RemoteAction::PullRequestLookup);
        assert!(matches!(failures[0], RemoteFailure::Unknown { .. }));
    }

    #[test]
    fn comment_failure_is_reported_after_a_good_status() {
        let dir = repo_on_branch("topic");
        let host = FakeHost {
            open_pulls: vec![pull(5)],
            fail_comment: Some(remote_err("Validation Failed")),
            ..Default::default()
        };
        let notifier =
            GitHubNotifier::with_client(host, target(), policy(true, true), dir.path(), false);

        let failures = notifier.notify(&failing_result(), None);

        assert_eq!(notifier.client.statuses.borrow().len(), 1);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].action(), RemoteAction::Comment);
    }

    #[test]
    fn dry_run_reads_but_never_writes() {
        let dir = repo_on_branch("topic");
        let host = FakeHost {
            open_pulls: vec![pull(8)],
            ..Default::default()
        };
        let notifier =
            GitHubNotifier::with_client(host, target(), policy(true, true), dir.path(), true);

        let failures = notifier.notify(&failing_result(), None);

        assert!(failures.is_empty());
        assert_eq!(*notifier.client.lookups.borrow(), 1);
        assert_eq!(notifier.client.statuses.borrow().len(), 0);
        assert_eq!(notifier.client.comments.borrow().len(), 0);
    }

    #[test]
    fn passing_result_reports_success_state() {
        let dir = repo_on_branch("topic");
        let notifier = GitHubNotifier::with_client(
            FakeHost::default(),
            target(),
            policy(false, true),
            dir.path(),
            false,
        );

        let result = ComparisonResult {
            passed_items: vec!["a.png".into(), "b.png".into()],
            ..Default::default()
        };
        let failures = notifier.notify(&result, None);

        assert!(failures.is_empty());
        let statuses = notifier.client.statuses.borrow();
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].1, "success");
    }

    // ── Pull request location ──

    #[test]
    fn locate_returns_the_first_listed_pull() {
        let host = FakeHost {
            open_pulls: vec![pull(41), pull(42)],
            ..Default::default()
        };
        let found = locate_open_pull_request(&host, &target(), "topic").unwrap();
        assert_eq!(found, Some(pull(41)));
    }

    #[test]
    fn locate_returns_none_when_nothing_is_open() {
        let host = FakeHost::default();
        let found = locate_open_pull_request(&host, &target(), "topic").unwrap();
        assert_eq!(found, None);
    }

    // ── Target and policy resolution ──

    fn client_id_for(owner: &str, repository: &str) -> String {
        STANDARD.encode(format!(
            r#"{{"owner": "{owner}", "repository": "{repository}"}}"#
        ))
    }

    #[test]
    fn explicit_pair_resolves_directly() {
        let options = GitHubOptions {
            owner: Some("acme".into()),
            repository: Some("shots".into()),
            ..Default::default()
        };
        assert_eq!(resolve_target(&options).unwrap(), target());
    }

    #[test]
    fn client_id_resolves_when_no_pair_is_set() {
        let options = GitHubOptions {
            client_id: Some(client_id_for("acme", "shots")),
            ..Default::default()
        };
        assert_eq!(resolve_target(&options).unwrap(), target());
    }

    #[test]
    fn explicit_pair_wins_over_client_id() {
        let options = GitHubOptions {
            client_id: Some(client_id_for("other", "repo")),
            owner: Some("acme".into()),
            repository: Some("shots".into()),
            ..Default::default()
        };
        assert_eq!(resolve_target(&options).unwrap(), target());
    }

    #[test]
    fn no_target_at_all_is_an_error() {
        let options = GitHubOptions::default();
        assert!(matches!(
            resolve_target(&options),
            Err(OptionsError::MissingTarget)
        ));
    }

    #[test]
    fn bad_client_id_is_a_credential_error() {
        let options = GitHubOptions {
            client_id: Some("###".into()),
            ..Default::default()
        };
        assert!(matches!(
            resolve_target(&options),
            Err(OptionsError::Credential(_))
        ));
    }

    #[test]
    fn config_id_prefers_the_client_id() {
        let id = client_id_for("acme", "shots");
        let options = GitHubOptions {
            client_id: Some(id.clone()),
            ..Default::default()
        };
        let target = resolve_target(&options).unwrap();
        let policy = resolve_policy(&options, &target);
        assert_eq!(policy.config_id, id);
    }

    #[test]
    fn config_id_falls_back_to_the_slug() {
        let options = GitHubOptions {
            owner: Some("acme".into()),
            repository: Some("shots".into()),
            ..Default::default()
        };
        let policy = resolve_policy(&options, &target());
        assert_eq!(policy.config_id, "acme/shots");
        assert!(policy.post_comment);
        assert!(policy.set_commit_status);
        assert!(!policy.short_description);
        assert_eq!(policy.comment_behavior, CommentBehavior::Default);
    }

    #[test]
    fn options_parse_with_full_defaults() {
        let options: GitHubOptions = serde_json::from_str("{}").unwrap();
        assert!(options.pr_comment);
        assert!(options.set_commit_status);
        assert!(!options.short_description);
        assert_eq!(options.pr_comment_behavior, CommentBehavior::Default);
        assert_eq!(options.api_base, None);
    }

    #[test]
    fn options_parse_explicit_fields() {
        let options: GitHubOptions = serde_json::from_str(
            r#"{
                "owner": "acme",
                "repository": "shots",
                "api_base": "https://ghe.example.com/api/v3",
                "pr_comment": false,
                "pr_comment_behavior": "once",
                "set_commit_status": false,
                "short_description": true
            }"#,
        )
        .unwrap();
        assert!(!options.pr_comment);
        assert!(!options.set_commit_status);
        assert!(options.short_description);
        assert_eq!(options.pr_comment_behavior, CommentBehavior::Once);
        assert_eq!(options.api_base.as_deref(), Some("https://ghe.example.com/api/v3"));
    }
}
