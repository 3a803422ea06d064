//! The comparison result as produced by a visual regression run.

use serde::{Deserialize, Serialize};

/// Categorized outcome of one comparison run. Each list holds the names of
/// the screenshot items that landed in that category.
///
/// Lookout never computes this itself. It arrives pre-computed, usually as a
/// JSON file written by the comparison engine, and absent categories read as
/// empty. The camelCase aliases accept result files written by older
/// comparison tooling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComparisonResult {
    #[serde(default, alias = "failedItems")]
    pub failed_items: Vec<String>,
    #[serde(default, alias = "newItems")]
    pub new_items: Vec<String>,
    #[serde(default, alias = "deletedItems")]
    pub deleted_items: Vec<String>,
    #[serde(default, alias = "passedItems")]
    pub passed_items: Vec<String>,
}

impl ComparisonResult {
    /// Collapse the item lists into per-category counts.
    pub fn counts(&self) -> ItemCounts {
        ItemCounts {
            failed: self.failed_items.len(),
            new: self.new_items.len(),
            deleted: self.deleted_items.len(),
            passed: self.passed_items.len(),
        }
    }
}

/// Per-category item counts derived from a [`ComparisonResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemCounts {
    pub failed: usize,
    pub new: usize,
    pub deleted: usize,
    pub passed: usize,
}

// ── Tests ──
