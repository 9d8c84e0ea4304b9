//! GitHub creation payload and structured error payload.
use serde::{Deserialize, Serialize};

use crate::utils::Repo;

/// Body of the repository creation request.
#[derive(Serialize, Default, Debug, Clone)]
pub struct RepoGithub {
    /// Repository name
    pub name: String,

    /// Repository description
    pub description: String,

    /// Repository private status
    pub private: bool,

    /// Whether to enable the issue tracker
    pub has_issues: bool,

    /// Whether to enable the wiki
    pub has_wiki: bool,
}

impl From<&Repo> for RepoGithub {
    fn from(repo: &Repo) -> Self {
        RepoGithub {
            name: repo.slug.clone(),
            description: repo.description.clone(),
            private: repo.is_private,
            has_issues: repo.has_issues,
            has_wiki: repo.has_wiki,
        }
    }
}

/// Structured error body returned by the GitHub API on a failed request.
#[derive(Deserialize, Default, Debug, Clone)]
pub struct GithubApiError {
    /// Top-level error message
    #[serde(default)]
    pub message: String,

    /// Per-field sub-errors
    #[serde(default)]
    pub errors: Vec<GithubSubError>,
}

/// One sub-error of a failed GitHub API request.
#[derive(Deserialize, Default, Debug, Clone)]
pub struct GithubSubError {
    /// Machine-readable error code, e.g. "already_exists"
    #[serde(default)]
    pub code: String,

    /// Human-readable message, absent for some codes
    #[serde(default)]
    pub message: String,
}
