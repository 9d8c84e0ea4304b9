//! GitHub destination client: repository creation and mirror push.
use std::path::PathBuf;

use async_trait::async_trait;
use log::{error, info};
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};

use super::repo::{GithubApiError, RepoGithub};
use super::{GITHUB_API_HEADER, GITHUB_API_URL, GITHUB_API_VERSION, GITHUB_URL};
use crate::command::run_command;
use crate::errors::GitFerryError;
use crate::platform::Destination;
use crate::utils::Repo;

/// Error code GitHub reports when the repository name is taken.
const ALREADY_EXISTS: &str = "already_exists";

/// GitHub destination client.
#[derive(Default, Debug, Clone)]
pub struct GithubPlatform {
    /// Github username
    username: String,

    /// Github token
    token: String,

    /// Organization (or username) the repositories are created under
    workspace: String,

    /// Local directory the bare mirrors are pushed from
    root_path: PathBuf,

    /// Value returned by creation when the repository already exists
    fail_on_repo_exists: bool,

    /// API base, overridable in tests
    api_base: String,

    /// Reqwest client
    client: reqwest::Client,
}

impl GithubPlatform {
    /// Create a new GithubPlatform
    pub(crate) fn new(
        username: String,
        token: String,
        workspace: String,
        root_path: PathBuf,
        fail_on_repo_exists: bool,
    ) -> Self {
        Self {
            username,
            token,
            workspace,
            root_path,
            fail_on_repo_exists,
            api_base: format!("https://{GITHUB_API_URL}"),
            client: reqwest::Client::new(),
        }
    }

    /// Point the API at a test server.
    #[cfg(test)]
    fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.to_string();
        self
    }

    /// Creation endpoint: the organization one when the configured workspace
    /// is not the username, the personal one otherwise.
    fn creation_url(&self) -> String {
        if self.username != self.workspace {
            format!("{}/orgs/{}/repos", self.api_base, self.workspace)
        } else {
            format!("{}/user/repos", self.api_base)
        }
    }

    /// Credential-embedded push URL for a slug.
    fn push_url(&self, slug: &str) -> String {
        format!(
            "https://{}:{}@{}/{}/{}.git",
            self.username, self.token, GITHUB_URL, self.workspace, slug
        )
    }

    /// Issue the creation request and interpret the structured error payload.
    ///
    /// An "already exists" first sub-error yields the configured
    /// fail-on-repo-exists value, so the operator decides whether re-running
    /// over an existing destination counts as success. An error body that does
    /// not parse as the structured payload is a failure, not a success.
    async fn try_create(&self, repo: &Repo) -> Result<bool, GitFerryError> {
        let request = self
            .client
            .post(self.creation_url())
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, "git-ferry")
            .header(GITHUB_API_HEADER, GITHUB_API_VERSION)
            .json(&RepoGithub::from(repo))
            .send();
        let response = request.await?;
        if response.status().is_success() {
            return Ok(true);
        }
        let text = response.text().await?;
        let parsed: GithubApiError = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(_) => {
                error!(
                    "Failed to create repository {}: unrecognized error response: {text}",
                    repo.slug
                );
                return Ok(false);
            }
        };
        if let Some(first) = parsed.errors.first() {
            if first.code == ALREADY_EXISTS {
                return Ok(self.fail_on_repo_exists);
            }
        }
        if parsed.errors.is_empty() {
            error!("Failed to create repository {}: {}", repo.slug, parsed.message);
        }
        for sub_error in &parsed.errors {
            let detail = if sub_error.message.is_empty() {
                &sub_error.code
            } else {
                &sub_error.message
            };
            error!("Failed to create repository {}: {detail}", repo.slug);
        }
        Ok(false)
    }

    /// Run the mirror push from the local bare copy.
    async fn try_push(&self, repo: &Repo) -> Result<bool, GitFerryError> {
        let repo_path = self.root_path.join(&repo.slug);
        let cmd = format!("git push --mirror {}", self.push_url(&repo.slug));
        let result = run_command(&cmd, &repo_path).await?;
        info!("{}\n{}", result.stdout, result.stderr);
        Ok(result.success)
    }
}

#[async_trait]
impl Destination for GithubPlatform {
    async fn create_repository(&self, repo: &Repo) -> bool {
        match self.try_create(repo).await {
            Ok(created) => created,
            Err(e) => {
                error!("Failed to create repository {}: {e}", repo.slug);
                false
            }
        }
    }

    async fn push_mirror(&self, repo: &Repo) -> bool {
        info!("Pushing repository {}...", repo.slug);
        match self.try_push(repo).await {
            Ok(pushed) => pushed,
            Err(e) => {
                error!("Failed to push repository {}: {e}", repo.slug);
                false
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn platform(username: &str, workspace: &str, fail_on_exists: bool) -> GithubPlatform {
        GithubPlatform::new(
            username.to_string(),
            "token".to_string(),
            workspace.to_string(),
            PathBuf::from("repositories"),
            fail_on_exists,
        )
    }

    fn demo() -> Repo {
        Repo {
            slug: "demo".to_string(),
            description: "a demo".to_string(),
            ..Repo::default()
        }
    }

    fn already_exists_body() -> serde_json::Value {
        json!({
            "message": "Repository creation failed.",
            "errors": [{"resource": "Repository", "code": "already_exists", "field": "name"}]
        })
    }

    #[tokio::test]
    async fn personal_endpoint_when_workspace_is_the_username() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user/repos"))
            .and(header("authorization", "Bearer token"))
            .and(body_partial_json(json!({"name": "demo", "private": false})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let platform = platform("octocat", "octocat", false).with_api_base(&server.uri());
        assert!(platform.create_repository(&demo()).await);
    }

    #[tokio::test]
    async fn org_endpoint_when_workspace_differs() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/orgs/acme/repos"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let platform = platform("octocat", "acme", false).with_api_base(&server.uri());
        assert!(platform.create_repository(&demo()).await);
    }

    #[tokio::test]
    async fn already_exists_returns_the_configured_flag() {
        for flag in [false, true] {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/user/repos"))
                .respond_with(ResponseTemplate::new(422).set_body_json(already_exists_body()))
                .mount(&server)
                .await;

            let platform = platform("octocat", "octocat", flag).with_api_base(&server.uri());
            assert_eq!(platform.create_repository(&demo()).await, flag);
        }
    }

    #[tokio::test]
    async fn other_structured_error_fails() {
        let server = MockServer::start().await;
        let body = json!({
            "message": "Validation Failed",
            "errors": [{"resource": "Repository", "code": "custom", "message": "name too long"}]
        });
        Mock::given(method("POST"))
            .and(path("/user/repos"))
            .respond_with(ResponseTemplate::new(422).set_body_json(body))
            .mount(&server)
            .await;

        let platform = platform("octocat", "octocat", true).with_api_base(&server.uri());
        assert!(!platform.create_repository(&demo()).await);
    }

    #[tokio::test]
    async fn unparseable_error_body_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user/repos"))
            .respond_with(ResponseTemplate::new(500).set_body_string("<html>bad gateway</html>"))
            .mount(&server)
            .await;

        let platform = platform("octocat", "octocat", true).with_api_base(&server.uri());
        assert!(!platform.create_repository(&demo()).await);
    }

    #[tokio::test]
    async fn push_from_missing_mirror_fails() {
        let dir = tempfile::tempdir().unwrap();
        let platform = GithubPlatform::new(
            "octocat".to_string(),
            "token".to_string(),
            "octocat".to_string(),
            dir.path().to_path_buf(),
            false,
        );
        // no local mirror for the slug, the push can't even spawn
        assert!(!platform.push_mirror(&demo()).await);
    }
}
