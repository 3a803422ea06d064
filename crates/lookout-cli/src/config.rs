//! Config file and comparison result loading.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use lookout_core::ComparisonResult;
use lookout_github::GitHubOptions;

/// Top-level config file, `lookout.json` by default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CliConfig {
    /// Skip the remote calls that write while still doing the local work.
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub github: GitHubOptions,
}

/// Load the config file. A missing file means defaults; a file that exists
/// but does not parse is an error worth stopping for.
pub fn load(path: &Path) -> anyhow::Result<CliConfig> {
    if !path.exists() {
        return Ok(CliConfig::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config = serde_json::from_str(&content)
        .with_context(|| format!("invalid config in {}", path.display()))?;
    Ok(config)
}

/// Read a comparison result JSON file.
pub fn read_result(path: &Path) -> anyhow::Result<ComparisonResult> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read comparison result {}", path.display()))?;
    let result = serde_json::from_str(&content)
        .with_context(|| format!("invalid comparison result in {}", path.display()))?;
    Ok(result)
}

// ── Tests ──
