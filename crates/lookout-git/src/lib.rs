//! Reads the HEAD of a local git repository by shelling out to `git`.
//!
//! Resolution never errors: every unreadable state collapses to
//! [`RepositoryHead::Unresolved`], with the cause logged at debug level.
//! Notification runs on exotic checkouts should degrade, not crash.

use std::path::Path;
use std::process::Command;

use tracing::debug;

/// The resolved state of a repository's HEAD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryHead {
    /// HEAD is a named branch whose tip commit is readable.
    Branch { name: String, commit: String },
    /// HEAD points directly at a commit.
    Detached { commit: String },
    /// HEAD could not be read: not a repository, no commits yet, or git
    /// itself is unavailable.
    Unresolved,
}

impl RepositoryHead {
    /// Commit id, when HEAD resolves to one.
    pub fn commit(&self) -> Option<&str> {
        match self {
            RepositoryHead::Branch { commit, .. } | RepositoryHead::Detached { commit } => {
                Some(commit)
            }
            RepositoryHead::Unresolved => None,
        }
    }

    /// Branch name, when HEAD is on a branch.
    pub fn branch(&self) -> Option<&str> {
        match self {
            RepositoryHead::Branch { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Resolve the HEAD of the repository at `repo_root`.
///
/// A branch without a readable tip commit (a freshly initialized repository)
/// is `Unresolved`, not `Branch`: callers need a commit to attach anything to.
pub fn resolve_head(repo_root: &Path) -> RepositoryHead {
    let commit = match run_git(repo_root, &["rev-parse", "HEAD"]) {
        Some(commit) => commit,
        None => return RepositoryHead::Unresolved,
    };
    match run_git(repo_root, &["symbolic-ref", "--short", "-q", "HEAD"]) {
        Some(name) => RepositoryHead::Branch { name, commit },
        None => RepositoryHead::Detached { commit },
    }
}

/// Run a git subcommand in `cwd`, returning trimmed stdout on success.
fn run_git(cwd: &Path, args: &[&str]) -> Option<String> {
    let output = match Command::new("git").args(args).current_dir(cwd).output() {
        Ok(output) => output,
        Err(e) => {
            debug!("git unavailable: {e}");
            return None;
        }
    };
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("git {} failed: {}", args.join(" "), stderr.trim());
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!stdout.is_empty()).then_some(stdout)
}

// ── Tests ──
