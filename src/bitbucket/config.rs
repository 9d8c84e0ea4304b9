//! Bitbucket configuration
use serde::{Deserialize, Serialize};

use super::platform::BitbucketPlatform;
use crate::{
    config::{require_value, GitFerryConfig, MigrationSettings},
    errors::GitFerryError,
};

/// Bitbucket configuration
#[derive(Deserialize, Serialize, Default, Debug, Clone)]
pub struct BitbucketConfig {
    /// Bitbucket workspace the repositories are listed from
    pub workspace: Option<String>,

    /// Bitbucket username
    pub username: Option<String>,

    /// Bitbucket app password
    pub password: Option<String>,
}

impl BitbucketConfig {
    /// Build the Bitbucket platform from the config file, with environment
    /// variable fallback for each credential.
    /// # Errors
    /// Error naming the first missing credential
    pub fn get_platform(
        config: &GitFerryConfig,
        settings: &MigrationSettings,
    ) -> Result<BitbucketPlatform, GitFerryError> {
        let data = config.config_data.bitbucket.clone().unwrap_or_default();
        let workspace = require_value(
            &data.workspace,
            "BITBUCKET_WORKSPACE",
            "bitbucket workspace",
        )?;
        let username = require_value(&data.username, "BITBUCKET_USERNAME", "bitbucket username")?;
        let password = require_value(
            &data.password,
            "BITBUCKET_PASSWORD",
            "bitbucket app password",
        )?;
        Ok(BitbucketPlatform::new(
            workspace,
            username,
            password,
            settings.root_path.clone(),
        ))
    }
}
