//! Drive each repository through create, synchronize, rewrite and push.
//!
//! Repositories are processed strictly one at a time: a descriptor runs to a
//! terminal state before the next one is pulled from the listing, and one
//! repository's failure never stops the run.
use std::collections::HashSet;
use std::fmt;
use std::fs::create_dir_all;

use indicatif::ProgressBar;
use log::{info, warn};

use crate::bitbucket::config::BitbucketConfig;
use crate::config::GitFerryConfig;
use crate::errors::{GitFerryError, GitFerryErrorKind};
use crate::github::config::GithubConfig;
use crate::lfs::LfsRewrite;
use crate::platform::{Destination, HistoryRewrite, Source};
use crate::utils::{load_skip_list, spinner, Repo};

/// Stage a repository's migration has reached.
///
/// States only ever advance; `Skipped`, `Done` and the `Failed*` variants are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationState {
    /// Descriptor observed, nothing attempted yet
    Seen,

    /// On the skip list, nothing attempted
    Skipped,

    /// Destination repository created
    Created,

    /// Local bare mirror cloned or fetched
    Pulled,

    /// Large-file history rewrite finished (or was disabled)
    LfsConfigured,

    /// Mirror pushed to the destination
    Done,

    /// Destination repository creation failed
    FailedCreate,

    /// Clone or fetch failed
    FailedPull,

    /// Mirror push failed
    FailedPush,
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MigrationState::Seen => "seen",
            MigrationState::Skipped => "skipped",
            MigrationState::Created => "created",
            MigrationState::Pulled => "pulled",
            MigrationState::LfsConfigured => "lfs-configured",
            MigrationState::Done => "done",
            MigrationState::FailedCreate => "failed-create",
            MigrationState::FailedPull => "failed-pull",
            MigrationState::FailedPush => "failed-push",
        };
        write!(f, "{label}")
    }
}

/// One row of the final report: a repository and the state it ended in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationRecord {
    /// Repository slug
    pub name: String,

    /// Stage the migration reached
    pub state: MigrationState,
}

impl MigrationRecord {
    /// Create a record for a freshly observed descriptor.
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            state: MigrationState::Seen,
        }
    }

    /// Advance to the next stage.
    fn advance(&mut self, next: MigrationState) {
        self.state = next;
    }
}

/// Run the whole migration: wire the clients from configuration, drive the
/// pipeline and return one record per repository encountered.
/// # Errors
/// Error if the storage root can't be created, the skip list can't be read or
/// a credential is missing. Per-repository failures are reported through the
/// records, never as an `Err`.
pub async fn run_migration(
    config: &GitFerryConfig,
) -> Result<Vec<MigrationRecord>, GitFerryError> {
    let settings = config.migration_settings();
    create_dir_all(&settings.root_path).map_err(|e| {
        GitFerryError::new_with_source(
            GitFerryErrorKind::Storage,
            "Unable to create storage root",
            e,
        )
    })?;
    info!("Will store repos into: {}", settings.root_path.display());
    let skip = load_skip_list(&settings.skip_file)?;
    if !skip.is_empty() {
        let mut slugs: Vec<_> = skip.iter().cloned().collect();
        slugs.sort();
        info!("Skipping repos: {}", slugs.join(", "));
    }
    let mut source = BitbucketConfig::get_platform(config, &settings)?;
    let destination = GithubConfig::get_platform(config, &settings)?;
    let rewrite = LfsRewrite::new(settings.lfs.clone(), settings.root_path.clone());
    let progress = spinner();
    let records = run_pipeline(&mut source, &destination, &rewrite, &skip, &progress).await;
    progress.finish_and_clear();
    Ok(records)
}

/// Drive every repository from the source listing to a terminal state.
pub(crate) async fn run_pipeline<S, D, R>(
    source: &mut S,
    destination: &D,
    rewrite: &R,
    skip: &HashSet<String>,
    progress: &ProgressBar,
) -> Vec<MigrationRecord>
where
    S: Source,
    D: Destination,
    R: HistoryRewrite,
{
    let mut records = Vec::new();
    while let Some(repo) = source.next_repository().await {
        let mut record = MigrationRecord::new(&repo.slug);
        migrate_one(source, destination, rewrite, skip, progress, &repo, &mut record).await;
        records.push(record);
    }
    records
}

/// Move one repository through the stages, advancing its record as it goes.
#[allow(clippy::too_many_arguments)]
async fn migrate_one<S, D, R>(
    source: &S,
    destination: &D,
    rewrite: &R,
    skip: &HashSet<String>,
    progress: &ProgressBar,
    repo: &Repo,
    record: &mut MigrationRecord,
) where
    S: Source,
    D: Destination,
    R: HistoryRewrite,
{
    if skip.contains(&repo.slug) {
        record.advance(MigrationState::Skipped);
        return;
    }
    progress.set_message(format!("Creating repository {}...", repo.slug));
    if !destination.create_repository(repo).await {
        progress.set_message(format!("Failed to create repository {}", repo.slug));
        record.advance(MigrationState::FailedCreate);
        return;
    }
    record.advance(MigrationState::Created);
    progress.set_message(format!("Cloning {}...", repo.slug));
    if !source.synchronize(repo).await {
        progress.set_message(format!("Failed to clone/pull {}", repo.slug));
        record.advance(MigrationState::FailedPull);
        return;
    }
    record.advance(MigrationState::Pulled);
    progress.set_message(format!("Configuring LFS for {}...", repo.slug));
    if rewrite.rewrite(repo).await {
        record.advance(MigrationState::LfsConfigured);
    } else {
        // a failed rewrite is logged but never blocks the push
        warn!("History rewrite failed for {}, pushing anyway", repo.slug);
    }
    progress.set_message(format!("Pushing repository {}...", repo.slug));
    if destination.push_mirror(repo).await {
        record.advance(MigrationState::Done);
    } else {
        progress.set_message(format!("Failed to push repository {}", repo.slug));
        record.advance(MigrationState::FailedPush);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Source fake: a fixed queue of descriptors and a recorded call log.
    struct FakeSource {
        repos: Mutex<VecDeque<Repo>>,
        sync_ok: bool,
        synced: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn new(slugs: &[&str], sync_ok: bool) -> Self {
            let repos = slugs
                .iter()
                .map(|slug| Repo {
                    slug: slug.to_string(),
                    ..Repo::default()
                })
                .collect();
            Self {
                repos: Mutex::new(repos),
                sync_ok,
                synced: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl Source for FakeSource {
        async fn next_repository(&mut self) -> Option<Repo> {
            self.repos.lock().unwrap().pop_front()
        }

        async fn synchronize(&self, repo: &Repo) -> bool {
            self.synced.lock().unwrap().push(repo.slug.clone());
            self.sync_ok
        }
    }

    /// Destination fake with independent create/push outcomes.
    struct FakeDestination {
        create_ok: bool,
        push_ok: bool,
        created: Mutex<Vec<String>>,
        pushed: Mutex<Vec<String>>,
    }

    impl FakeDestination {
        fn new(create_ok: bool, push_ok: bool) -> Self {
            Self {
                create_ok,
                push_ok,
                created: Mutex::new(vec![]),
                pushed: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl Destination for FakeDestination {
        async fn create_repository(&self, repo: &Repo) -> bool {
            self.created.lock().unwrap().push(repo.slug.clone());
            self.create_ok
        }

        async fn push_mirror(&self, repo: &Repo) -> bool {
            self.pushed.lock().unwrap().push(repo.slug.clone());
            self.push_ok
        }
    }

    /// Rewrite fake with a recorded call log.
    struct FakeRewrite {
        ok: bool,
        rewritten: Mutex<Vec<String>>,
    }

    impl FakeRewrite {
        fn new(ok: bool) -> Self {
            Self {
                ok,
                rewritten: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl HistoryRewrite for FakeRewrite {
        async fn rewrite(&self, repo: &Repo) -> bool {
            self.rewritten.lock().unwrap().push(repo.slug.clone());
            self.ok
        }
    }

    async fn drive(
        source: &mut FakeSource,
        destination: &FakeDestination,
        rewrite: &FakeRewrite,
        skip: &[&str],
    ) -> Vec<MigrationRecord> {
        let skip: HashSet<String> = skip.iter().map(|s| s.to_string()).collect();
        let progress = ProgressBar::hidden();
        run_pipeline(source, destination, rewrite, &skip, &progress).await
    }

    #[test]
    fn state_labels() {
        assert_eq!(MigrationState::LfsConfigured.to_string(), "lfs-configured");
        assert_eq!(MigrationState::FailedCreate.to_string(), "failed-create");
        assert_eq!(MigrationState::Done.to_string(), "done");
    }

    #[tokio::test]
    async fn successful_migration_ends_done() {
        let mut source = FakeSource::new(&["demo"], true);
        let destination = FakeDestination::new(true, true);
        let rewrite = FakeRewrite::new(true);
        let records = drive(&mut source, &destination, &rewrite, &[]).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "demo");
        assert_eq!(records[0].state, MigrationState::Done);
        assert_eq!(*destination.created.lock().unwrap(), vec!["demo"]);
        assert_eq!(*source.synced.lock().unwrap(), vec!["demo"]);
        assert_eq!(*rewrite.rewritten.lock().unwrap(), vec!["demo"]);
        assert_eq!(*destination.pushed.lock().unwrap(), vec!["demo"]);
    }

    #[tokio::test]
    async fn failed_create_short_circuits() {
        let mut source = FakeSource::new(&["demo"], true);
        let destination = FakeDestination::new(false, true);
        let rewrite = FakeRewrite::new(true);
        let records = drive(&mut source, &destination, &rewrite, &[]).await;
        assert_eq!(records[0].state, MigrationState::FailedCreate);
        assert!(source.synced.lock().unwrap().is_empty());
        assert!(destination.pushed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_pull_short_circuits() {
        let mut source = FakeSource::new(&["demo"], false);
        let destination = FakeDestination::new(true, true);
        let rewrite = FakeRewrite::new(true);
        let records = drive(&mut source, &destination, &rewrite, &[]).await;
        assert_eq!(records[0].state, MigrationState::FailedPull);
        assert!(rewrite.rewritten.lock().unwrap().is_empty());
        assert!(destination.pushed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_push_is_terminal() {
        let mut source = FakeSource::new(&["demo"], true);
        let destination = FakeDestination::new(true, false);
        let rewrite = FakeRewrite::new(true);
        let records = drive(&mut source, &destination, &rewrite, &[]).await;
        assert_eq!(records[0].state, MigrationState::FailedPush);
    }

    #[tokio::test]
    async fn skipped_repositories_touch_nothing() {
        let mut source = FakeSource::new(&["keep-out", "demo"], true);
        let destination = FakeDestination::new(true, true);
        let rewrite = FakeRewrite::new(true);
        let records = drive(&mut source, &destination, &rewrite, &["keep-out"]).await;
        assert_eq!(records[0].name, "keep-out");
        assert_eq!(records[0].state, MigrationState::Skipped);
        assert_eq!(records[1].state, MigrationState::Done);
        // nothing attempted for the skipped one
        assert_eq!(*destination.created.lock().unwrap(), vec!["demo"]);
        assert_eq!(*source.synced.lock().unwrap(), vec!["demo"]);
    }

    #[tokio::test]
    async fn failed_rewrite_still_pushes() {
        let mut source = FakeSource::new(&["demo"], true);
        let destination = FakeDestination::new(true, true);
        let rewrite = FakeRewrite::new(false);
        let records = drive(&mut source, &destination, &rewrite, &[]).await;
        assert_eq!(*destination.pushed.lock().unwrap(), vec!["demo"]);
        assert_eq!(records[0].state, MigrationState::Done);
    }

    #[tokio::test]
    async fn failed_stage_reaches_the_status_indicator() {
        let skip = HashSet::new();
        let rewrite = FakeRewrite::new(true);

        let mut source = FakeSource::new(&["demo"], true);
        let destination = FakeDestination::new(false, true);
        let progress = ProgressBar::hidden();
        run_pipeline(&mut source, &destination, &rewrite, &skip, &progress).await;
        assert_eq!(progress.message(), "Failed to create repository demo");

        let mut source = FakeSource::new(&["demo"], false);
        let destination = FakeDestination::new(true, true);
        let progress = ProgressBar::hidden();
        run_pipeline(&mut source, &destination, &rewrite, &skip, &progress).await;
        assert_eq!(progress.message(), "Failed to clone/pull demo");

        let mut source = FakeSource::new(&["demo"], true);
        let destination = FakeDestination::new(true, false);
        let progress = ProgressBar::hidden();
        run_pipeline(&mut source, &destination, &rewrite, &skip, &progress).await;
        assert_eq!(progress.message(), "Failed to push repository demo");
    }

    #[tokio::test]
    async fn one_failure_never_stops_the_run() {
        let mut source = FakeSource::new(&["first", "second"], true);
        let destination = FakeDestination::new(false, true);
        let rewrite = FakeRewrite::new(true);
        let records = drive(&mut source, &destination, &rewrite, &[]).await;
        assert_eq!(records.len(), 2);
        assert!(records
            .iter()
            .all(|r| r.state == MigrationState::FailedCreate));
        assert_eq!(*destination.created.lock().unwrap(), vec!["first", "second"]);
    }
}
