use std::path::Path;

use lookout_git::{resolve_head, RepositoryHead};
use lookout_github::{decode_client_id, resolve_target};

use crate::config;

/// `lookout doctor`: check configuration, credential, token, and the
/// repository HEAD without sending anything.
pub fn execute(repo_root: &Path, config_path: &str) -> anyhow::Result<()> {
    // 1. Config file
    let path = Path::new(config_path);
    println!(
        "[{}] config file: {}",
        if path.exists() { "OK" } else { "WARN" },
        if path.exists() {
            path.display().to_string()
        } else {
            format!("{} (missing, defaults apply)", path.display())
        }
    );
    let config = match config::load(path) {
        Ok(config) => config,
        Err(e) => {
            println!("[WARN] config: {e:#}");
            return Ok(());
        }
    };

    // 2. Notification target
    match resolve_target(&config.github) {
        Ok(target) => println!("[OK] target: {}", target.slug()),
        Err(e) => println!("[WARN] target: {e}"),
    }

    // 3. Client id decodes
    if let Some(client_id) = &config.github.client_id {
        match decode_client_id(client_id) {
            Ok(cred) => match cred.installation_id {
                Some(id) => println!("[OK] client id: installation {id}"),
                None => println!("[OK] client id: decodes"),
            },
            Err(e) => println!("[WARN] client id: {e}"),
        }
    }

    // 4. Delivery flags
    println!(
        "[OK] commit status: {}, pr comment: {} ({})",
        on_off(config.github.set_commit_status),
        on_off(config.github.pr_comment),
        config.github.pr_comment_behavior.as_str()
    );

    // 5. Token
    let has_token = std::env::var("GITHUB_TOKEN").is_ok_and(|t| !t.is_empty());
    println!(
        "[{}] GITHUB_TOKEN: {}",
        if has_token { "OK" } else { "WARN" },
        if has_token { "present" } else { "not set" }
    );

    // 6. Repository HEAD
    match resolve_head(repo_root) {
        RepositoryHead::Branch { name, commit } => {
            println!("[OK] head: {name} @ {}", short(&commit));
        }
        RepositoryHead::Detached { commit } => {
            println!(
                "[WARN] head: detached @ {} (status only, no pull request comment)",
                short(&commit)
            );
        }
        RepositoryHead::Unresolved => {
            println!("[WARN] head: unresolved (not a git repository, or no commits yet)");
        }
    }

    Ok(())
}

fn on_off(v: bool) -> &'static str {
    if v {
        "on"
    } else {
        "off"
    }
}

fn short(commit: &str) -> &str {
    &commit[..commit.len().min(10)]
}

// ── Tests ──
