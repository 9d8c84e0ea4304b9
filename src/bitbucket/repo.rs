//! Bitbucket listing payloads and conversion to the Repo descriptor.
use serde::Deserialize;

use crate::utils::Repo;

/// One repository as returned by the Bitbucket listing endpoint.
#[derive(Deserialize, Default, Debug, Clone)]
pub struct RepoBitbucket {
    /// Repository slug, unique within the workspace
    pub slug: String,

    /// Repository description
    pub description: Option<String>,

    /// Repository private status
    #[serde(default)]
    pub is_private: bool,

    /// Whether the repository has an issue tracker
    #[serde(default)]
    pub has_issues: bool,

    /// Whether the repository has a wiki
    #[serde(default)]
    pub has_wiki: bool,
}

/// One page of the Bitbucket listing endpoint.
#[derive(Deserialize, Default, Debug, Clone)]
pub struct PageBitbucket {
    /// Repositories on this page
    pub values: Vec<RepoBitbucket>,

    /// Continuation indicator: a URL (or `true`) when another page exists.
    /// Absent, `null` or `false` on the last page.
    pub next: Option<serde_json::Value>,
}

impl PageBitbucket {
    /// Whether the listing continues past this page.
    pub fn has_next(&self) -> bool {
        !matches!(
            self.next,
            None | Some(serde_json::Value::Null) | Some(serde_json::Value::Bool(false))
        )
    }
}

impl From<RepoBitbucket> for Repo {
    fn from(repo: RepoBitbucket) -> Self {
        Repo {
            slug: repo.slug,
            description: repo.description.unwrap_or_default(),
            is_private: repo.is_private,
            has_issues: repo.has_issues,
            has_wiki: repo.has_wiki,
        }
    }
}
