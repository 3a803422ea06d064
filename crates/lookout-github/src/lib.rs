//! GitHub backend for Lookout: commit statuses and pull request comments
//! over the REST v3 API.
//!
//! The crate splits into the API surface ([`api`]), the blocking HTTP client
//! ([`client`]), client id decoding ([`credentials`]), and the orchestrator
//! that drives one notification run ([`notify`]).

pub mod api;
pub mod client;
pub mod credentials;
pub mod notify;

pub use api::{ApiError, CommentRequest, GitHubApi, PullRequestRef, StatusRequest};
pub use client::{GitHubClient, DEFAULT_API_BASE};
pub use credentials::{decode_client_id, CredentialError, DecodedCredential};
pub use notify::{
    locate_open_pull_request, resolve_policy, resolve_target, GitHubNotifier, GitHubOptions,
    OptionsError, STATUS_CONTEXT,
};
