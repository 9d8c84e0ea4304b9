//! Github configuration
use serde::{Deserialize, Serialize};

use super::platform::GithubPlatform;
use crate::{
    config::{require_value, value_or_env, GitFerryConfig, MigrationSettings},
    errors::GitFerryError,
};

/// Github configuration
#[derive(Deserialize, Serialize, Default, Debug, Clone)]
pub struct GithubConfig {
    /// Github username
    pub username: Option<String>,

    /// Github token
    pub token: Option<String>,

    /// Github organization (or username) the repositories are created under
    pub workspace: Option<String>,
}

impl GithubConfig {
    /// Build the Github platform from the config file, with environment
    /// variable fallback for each credential. An absent workspace defaults to
    /// the username, which selects the personal creation endpoint.
    /// # Errors
    /// Error naming the first missing credential
    pub fn get_platform(
        config: &GitFerryConfig,
        settings: &MigrationSettings,
    ) -> Result<GithubPlatform, GitFerryError> {
        let data = config.config_data.github.clone().unwrap_or_default();
        let username = require_value(&data.username, "GITHUB_USERNAME", "github username")?;
        let token = require_value(&data.token, "GITHUB_TOKEN", "github token")?;
        let workspace =
            value_or_env(&data.workspace, "GITHUB_WORKSPACE").unwrap_or_else(|| username.clone());
        Ok(GithubPlatform::new(
            username,
            token,
            workspace,
            settings.root_path.clone(),
            settings.fail_on_repo_exists,
        ))
    }
}
