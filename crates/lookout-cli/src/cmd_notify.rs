use std::path::Path;

use anyhow::bail;

use lookout_core::Notifier;
use lookout_github::GitHubNotifier;

use crate::config;
use crate::spinner::Spinner;

/// `lookout notify <RESULT>`: deliver a commit status and a pull request
/// comment for one comparison run.
pub fn execute(
    repo_root: &Path,
    result_path: &str,
    config_path: &str,
    report_url: Option<&str>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let config = config::load(Path::new(config_path))?;
    let result = config::read_result(Path::new(result_path))?;
    let dry_run = dry_run || config.dry_run;

    let token = std::env::var("GITHUB_TOKEN").unwrap_or_default();
    if token.is_empty() && !dry_run {
        bail!("GITHUB_TOKEN is not set; set it or pass --dry-run");
    }

    let notifier = GitHubNotifier::from_options(&config.github, token, repo_root, dry_run)?;

    let spinner = Spinner::start("notifying GitHub...");
    let failures = notifier.notify(&result, report_url);
    spinner.stop(if failures.is_empty() {
        "notified"
    } else {
        "notification incomplete"
    });

    if !failures.is_empty() {
        let lines: Vec<String> = failures.iter().map(|f| format!("  - {f}")).collect();
        bail!(
            "{} remote call(s) failed:\n{}",
            failures.len(),
            lines.join("\n")
        );
    }
    Ok(())
}
