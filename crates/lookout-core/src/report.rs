//! Rendering of the pull request comment body.

use crate::compare::ItemCounts;
use crate::notify::{CommentBehavior, RepoTarget};

/// Everything one comment delivery needs: the rendering inputs plus the
/// identity metadata the remote call is tagged with. Assembled per
/// notification run and discarded afterward.
#[derive(Debug, Clone)]
pub struct CommentPayload<'a> {
    pub target: &'a RepoTarget,
    pub behavior: CommentBehavior,
    pub config_id: &'a str,
    pub counts: ItemCounts,
    pub branch: Option<&'a str>,
    pub commit: Option<&'a str>,
    pub short_description: bool,
    pub report_url: Option<&'a str>,
}

/// Render the comment body for a comparison run.
///
/// The structure is fixed: a header line, one line per category in a fixed
/// order, then an optional short-description note and an optional report
/// link. No trailing newline. Pure string work, safe without network or
/// repository access.
pub fn render_comment(payload: &CommentPayload<'_>) -> String {
    let counts = payload.counts;
    let mut body = String::from("Comparison result:\n");
    body.push_str(&format!("    - Failed items: {}\n", counts.failed));
    body.push_str(&format!("    - New items: {}\n", counts.new));
    body.push_str(&format!("    - Deleted items: {}\n", counts.deleted));
    body.push_str(&format!("    - Passed items: {}", counts.passed));
    if payload.short_description {
        body.push_str("\nShort description mode is enabled.");
    }
    if let Some(url) = payload.report_url {
        body.push_str(&format!("\n[Report]({url})"));
    }
    body
}

// ── Tests ──
