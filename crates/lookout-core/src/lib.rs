//! Core model for Lookout: what a comparison run produced, how that maps to
//! a pass/fail outcome, and the contracts a notification backend implements.
//!
//! Everything here is pure. Network delivery and repository inspection live
//! in the backend crates.

pub mod compare;
pub mod notify;
pub mod outcome;
pub mod report;

pub use compare::{ComparisonResult, ItemCounts};
pub use notify::{
    CommentBehavior, NotificationPolicy, Notifier, RemoteAction, RemoteFailure, RepoTarget,
};
pub use outcome::{classify, ComparisonOutcome, OutcomeState};
pub use report::{render_comment, CommentPayload};
