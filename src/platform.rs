//! Seams between the pipeline driver and the provider clients.
use async_trait::async_trait;

use crate::utils::Repo;

/// The provider repositories are migrated from.
///
/// Stage methods return a success flag instead of an error: every failure is
/// logged where it happens and contained to the current repository, so the
/// driver only has to decide which terminal state to record.
#[async_trait]
pub trait Source: Send + Sync {
    /// Next descriptor from the lazy paginated listing, `None` once exhausted.
    ///
    /// Pages are fetched on demand, one at a time, as the consumer advances.
    async fn next_repository(&mut self) -> Option<Repo>;

    /// Clone or fetch the repository into local bare storage.
    async fn synchronize(&self, repo: &Repo) -> bool;
}

/// The provider repositories are migrated to.
#[async_trait]
pub trait Destination: Send + Sync {
    /// Create the matching remote repository for a descriptor.
    async fn create_repository(&self, repo: &Repo) -> bool;

    /// Push the local bare mirror to the remote repository.
    async fn push_mirror(&self, repo: &Repo) -> bool;
}

/// Optional history rewrite applied between synchronize and push.
#[async_trait]
pub trait HistoryRewrite: Send + Sync {
    /// Rewrite the local repository's history. Returns whether it succeeded;
    /// a disabled rewrite is a successful no-op.
    async fn rewrite(&self, repo: &Repo) -> bool;
}
