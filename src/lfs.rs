//! Large-file history rewrite, gated by configuration.
use std::path::PathBuf;

use async_trait::async_trait;
use log::{error, info};

use crate::command::run_command;
use crate::config::LfsSettings;
use crate::platform::HistoryRewrite;
use crate::utils::Repo;

/// Rewrites repository history to move blobs above the configured size
/// threshold into LFS, then fetches the resulting pointers.
#[derive(Debug, Clone)]
pub struct LfsRewrite {
    /// Enable flag and size threshold
    settings: LfsSettings,

    /// Local directory the bare mirrors are stored under
    root_path: PathBuf,
}

impl LfsRewrite {
    /// Create a new LfsRewrite
    pub(crate) fn new(settings: LfsSettings, root_path: PathBuf) -> Self {
        Self {
            settings,
            root_path,
        }
    }
}

/// The history rewrite command for a size threshold.
fn migrate_command(limit: &str) -> String {
    format!("git lfs migrate import --above={limit} --everything")
}

#[async_trait]
impl HistoryRewrite for LfsRewrite {
    async fn rewrite(&self, repo: &Repo) -> bool {
        if !self.settings.enabled {
            return true;
        }
        info!("Configuring LFS for {}...", repo.slug);
        let repo_path = self.root_path.join(&repo.slug);
        let import = match run_command(&migrate_command(&self.settings.limit), &repo_path).await {
            Ok(result) => result,
            Err(e) => {
                error!("Failed to rewrite {}: {e}", repo.slug);
                return false;
            }
        };
        if !import.success {
            return false;
        }
        match run_command("git lfs fetch --all", &repo_path).await {
            Ok(result) => result.success,
            Err(e) => {
                error!("Failed to fetch LFS pointers for {}: {e}", repo.slug);
                false
            }
        }
    }
}
