//! Bitbucket source client: paginated listing and local mirror synchronize.
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{error, info};
use reqwest::header::CONTENT_TYPE;

use super::repo::PageBitbucket;
use super::{BITBUCKET_API_URL, BITBUCKET_URL};
use crate::command::run_command;
use crate::errors::GitFerryError;
use crate::platform::Source;
use crate::utils::Repo;

/// Bitbucket source client.
///
/// Holds the cursor of the lazy repository listing: descriptors are buffered
/// one page at a time and the next page is only fetched once the buffer runs
/// dry.
#[derive(Debug, Clone)]
pub struct BitbucketPlatform {
    /// Bitbucket workspace the repositories are listed from
    workspace: String,

    /// Bitbucket username
    username: String,

    /// Bitbucket app password
    password: String,

    /// Local directory the bare mirrors are stored under
    root_path: PathBuf,

    /// Listing API base, overridable in tests
    api_base: String,

    /// Reqwest client
    client: reqwest::Client,

    /// Next page to request, 1-based
    page: usize,

    /// Descriptors of the current page not yet handed out
    buffer: VecDeque<Repo>,

    /// Continuation indicator of the last successfully parsed page
    has_next: bool,

    /// Set once no further page will be fetched
    exhausted: bool,
}

impl BitbucketPlatform {
    /// Create a new BitbucketPlatform
    pub(crate) fn new(
        workspace: String,
        username: String,
        password: String,
        root_path: PathBuf,
    ) -> Self {
        Self {
            workspace,
            username,
            password,
            root_path,
            api_base: format!("https://{BITBUCKET_API_URL}"),
            client: reqwest::Client::new(),
            page: 1,
            buffer: VecDeque::new(),
            has_next: false,
            exhausted: false,
        }
    }

    /// Point the listing at a test server.
    #[cfg(test)]
    fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.to_string();
        self
    }

    /// Credential-embedded clone URL for a slug.
    fn clone_url(&self, slug: &str) -> String {
        format!(
            "https://{}:{}@{}/{}/{}.git",
            self.username, self.password, BITBUCKET_URL, self.workspace, slug
        )
    }

    /// Fetch one listing page into the buffer and advance the cursor.
    ///
    /// An HTTP-level failure ends the listing. A page whose body does not
    /// parse is logged and skipped: the page counter still advances and the
    /// last parsed continuation indicator decides whether the listing goes on,
    /// so its descriptors are lost but the listing can't loop forever on the
    /// same page.
    async fn fetch_page(&mut self) {
        let url = format!("{}/{}?page={}", self.api_base, self.workspace, self.page);
        let request = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header(CONTENT_TYPE, "application/json")
            .send();
        let response = match request.await {
            Ok(response) => response,
            Err(e) => {
                error!("Could not get bitbucket info: {e}");
                self.exhausted = true;
                return;
            }
        };
        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            error!("Could not get bitbucket info: {text}");
            self.exhausted = true;
            return;
        }
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                error!("Could not read bitbucket info: {e}");
                self.exhausted = true;
                return;
            }
        };
        match serde_json::from_str::<PageBitbucket>(&text) {
            Ok(page) => {
                self.has_next = page.has_next();
                self.buffer.extend(page.values.into_iter().map(Repo::from));
            }
            Err(e) => {
                error!("Could not parse bitbucket info (page {}): {e}", self.page);
            }
        }
        self.page += 1;
        if !self.has_next {
            self.exhausted = true;
        }
    }

    /// Whether `path` already holds a bare mirror of a repository.
    ///
    /// # Errors
    /// Error if the path exists but is not a directory.
    async fn is_already_mirrored(&self, path: &Path) -> Result<bool, GitFerryError> {
        let meta = match tokio::fs::metadata(path).await {
            Ok(meta) => meta,
            Err(_) => return Ok(false),
        };
        if !meta.is_dir() {
            return Err(format!("{} is not a directory", path.display()).into());
        }
        let result = run_command("git rev-parse --is-bare-repository", path).await?;
        Ok(result.stdout == "true")
    }

    /// Clone or fetch, propagating any precondition or spawn error.
    async fn try_synchronize(&self, repo: &Repo) -> Result<bool, GitFerryError> {
        let repo_path = self.root_path.join(&repo.slug);
        if self.is_already_mirrored(&repo_path).await? {
            info!("Updating existing repo {}...", repo.slug);
            let result = run_command("git fetch", &repo_path).await?;
            Ok(result.success)
        } else {
            info!("Cloning {}...", repo.slug);
            let cmd = format!("git clone --bare {} {}", self.clone_url(&repo.slug), repo.slug);
            let result = run_command(&cmd, &self.root_path).await?;
            Ok(result.success)
        }
    }
}

#[async_trait]
impl Source for BitbucketPlatform {
    async fn next_repository(&mut self) -> Option<Repo> {
        loop {
            if let Some(repo) = self.buffer.pop_front() {
                return Some(repo);
            }
            if self.exhausted {
                return None;
            }
            self.fetch_page().await;
        }
    }

    async fn synchronize(&self, repo: &Repo) -> bool {
        match self.try_synchronize(repo).await {
            Ok(success) => success,
            Err(e) => {
                error!("Failed to clone/pull {}: {e}", repo.slug);
                false
            }
        }
    }
}
