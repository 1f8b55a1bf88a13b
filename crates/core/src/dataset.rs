//! Dataset roster loading
//!
//! Task ids live in plain text files under `<root>/data/datasets/<split>.txt`,
//! one id per line. Ids follow the `<scenario>_<variant>` convention, which
//! is what the scenario filter matches against.

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Roster file for a split
pub fn dataset_path(root: &Path, split: &str) -> PathBuf {
    root.join("data")
        .join("datasets")
        .join(format!("{}.txt", split))
}

/// Read the ordered task ids for a split
pub async fn load_task_ids(root: &Path, split: &str) -> Result<Vec<String>> {
    if !root.exists() {
        return Err(Error::Config(format!(
            "task root not found: {}",
            root.display()
        )));
    }

    let path = dataset_path(root, split);
    let content = tokio::fs::read_to_string(&path).await.map_err(|err| {
        Error::Config(format!(
            "failed to read dataset {}: {}",
            path.display(),
            err
        ))
    })?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Apply the scenario filter and optional truncation, preserving order
///
/// A non-empty filter keeps ids equal to an entry or starting with
/// `"<entry>_"`. `max_tasks` only truncates when positive.
pub fn filter_task_ids(
    mut ids: Vec<String>,
    scenario_filter: Option<&[String]>,
    max_tasks: Option<usize>,
) -> Vec<String> {
    if let Some(filter) = scenario_filter {
        if !filter.is_empty() {
            ids.retain(|id| {
                filter
                    .iter()
                    .any(|scenario| id == scenario || id.starts_with(&format!("{}_", scenario)))
            });
        }
    }

    if let Some(max) = max_tasks {
        if max > 0 {
            ids.truncate(max);
        }
    }

    ids
}
