use std::path::Path;

use lookout_core::{render_comment, CommentPayload};
use lookout_git::resolve_head;
use lookout_github::{resolve_policy, resolve_target};

use crate::config;

/// `lookout render <RESULT>`: print the comment body `notify` would post,
/// without touching the network.
pub fn execute(
    repo_root: &Path,
    result_path: &str,
    config_path: &str,
    report_url: Option<&str>,
) -> anyhow::Result<()> {
    let config = config::load(Path::new(config_path))?;
    let result = config::read_result(Path::new(result_path))?;
    let target = resolve_target(&config.github)?;
    let policy = resolve_policy(&config.github, &target);
    let head = resolve_head(repo_root);

    let payload = CommentPayload {
        target: &target,
        behavior: policy.comment_behavior,
        config_id: &policy.config_id,
        counts: result.counts(),
        branch: head.branch(),
        commit: head.commit(),
        short_description: policy.short_description,
        report_url,
    };
    println!("{}", render_comment(&payload));
    Ok(())
}
