//! Utility functions and the repository descriptor type.
use std::collections::HashSet;
use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use serde::Deserialize;

use crate::errors::{GitFerryError, GitFerryErrorKind};
use crate::pipeline::MigrationRecord;

/// Repository descriptor as yielded by the source listing.
///
/// Immutable once obtained: the pipeline only ever reads it. The `slug` doubles
/// as the local storage directory name and the destination repository name.
#[derive(Deserialize, Debug, Default, PartialEq, Eq, Hash, Clone)]
pub struct Repo {
    /// Name of the repository, unique within the workspace
    pub slug: String,

    /// Description of the repository
    #[serde(default)]
    pub description: String,

    /// Whether the repository is private
    #[serde(default)]
    pub is_private: bool,

    /// Whether the repository has an issue tracker
    #[serde(default)]
    pub has_issues: bool,

    /// Whether the repository has a wiki
    #[serde(default)]
    pub has_wiki: bool,
}

/// Load the newline-delimited skip list, one slug per line.
///
/// Blank lines are ignored. A missing file is not an error: it yields an empty
/// set, so a run without a skip list migrates everything.
///
/// # Errors
/// Error if the file exists but can't be read.
pub(crate) fn load_skip_list(path: &Path) -> Result<HashSet<String>, GitFerryError> {
    if !path.exists() {
        debug!("No skip list at {}", path.display());
        return Ok(HashSet::new());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| {
        GitFerryError::new_with_source(GitFerryErrorKind::Config, "Unable to read skip list", e)
    })?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Render the final per-repository report as an aligned two-column table.
pub(crate) fn render_report(records: &[MigrationRecord]) -> String {
    let name_width = records
        .iter()
        .map(|r| r.name.len())
        .chain(std::iter::once("name".len()))
        .max()
        .unwrap_or(4);
    let mut out = String::new();
    out.push_str(&format!("{:name_width$}  state\n", "name"));
    out.push_str(&format!("{:-<name_width$}  -----\n", ""));
    for record in records {
        out.push_str(&format!("{:name_width$}  {}\n", record.name, record.state));
    }
    out
}

/// Build the running status spinner.
pub(crate) fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {wide_msg}") {
        pb.set_style(style.tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "));
    }
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb.set_message("Warming up...");
    pb
}
