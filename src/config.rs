//! Configuration handling
use std::{
    fs::{create_dir_all, read_to_string, File},
    io::Write,
    path::PathBuf,
};

use home::home_dir;
use serde::{Deserialize, Serialize};

use crate::{
    bitbucket::config::BitbucketConfig,
    cli::GitFerryCli,
    errors::{GitFerryError, GitFerryErrorKind},
    github::config::GithubConfig,
};

/// Configuration data
#[derive(Deserialize, Default, Clone, Debug)]
pub struct GitFerryConfig {
    /// path to the configuration file
    pub config_path: PathBuf,

    /// actual configuration data
    pub config_data: ConfigData,

    /// CLI arguments
    pub cli_args: GitFerryCli,
}

/// Contents of the TOML configuration file
#[derive(Deserialize, Serialize, Default, Clone, Debug)]
pub struct ConfigData {
    /// Bitbucket (source) configuration
    pub bitbucket: Option<BitbucketConfig>,

    /// Github (destination) configuration
    pub github: Option<GithubConfig>,

    /// Migration run configuration
    pub migration: Option<MigrationConfig>,
}

/// Settings for the migration run itself
#[derive(Deserialize, Serialize, Default, Clone, Debug)]
pub struct MigrationConfig {
    /// Local directory the bare mirrors are stored under
    pub root_path: Option<String>,

    /// Path to the newline-delimited skip list
    pub skip_file: Option<String>,

    /// Value returned by repository creation when the destination already exists
    pub fail_on_repo_exists: Option<bool>,

    /// Whether to rewrite large-file history into LFS before pushing
    pub lfs_enabled: Option<bool>,

    /// Size threshold above which blobs are moved into LFS
    pub lfs_limit: Option<String>,
}

/// Resolved, non-optional settings the pipeline is constructed from.
#[derive(Debug, Clone)]
pub struct MigrationSettings {
    /// Local directory the bare mirrors are stored under
    pub root_path: PathBuf,

    /// Path to the newline-delimited skip list
    pub skip_file: PathBuf,

    /// Value returned by repository creation when the destination already exists
    pub fail_on_repo_exists: bool,

    /// Large-file rewrite settings
    pub lfs: LfsSettings,
}

/// Resolved settings of the large-file rewrite step.
#[derive(Debug, Clone)]
pub struct LfsSettings {
    /// Whether the rewrite runs at all
    pub enabled: bool,

    /// Size threshold passed to the rewrite, e.g. "100MB"
    pub limit: String,
}

impl GitFerryConfig {
    /// Create a new config object from the CLI arguments, reading the TOML
    /// file at the custom path or the default location.
    /// # Errors
    /// Error if the config file can't be opened or parsed
    pub fn try_new(cli_args: GitFerryCli) -> Result<Self, GitFerryError> {
        let config_path = match cli_args.config.clone() {
            Some(p) => PathBuf::from(p),
            None => Self::get_config_path()?,
        };
        let contents = read_to_string(config_path.clone()).map_err(|e| {
            GitFerryError::new_with_source(GitFerryErrorKind::Config, "Unable to open config", e)
        })?;
        let config_data = toml::from_str(&contents)?;
        Ok(GitFerryConfig {
            config_path,
            cli_args,
            config_data,
        })
    }

    /// Get the path to the config file, creating an empty one if needed
    /// # Errors
    /// Error if the home directory can't be found
    pub fn get_config_path() -> Result<PathBuf, GitFerryError> {
        let home_dir = match home_dir() {
            Some(path) if !path.as_os_str().is_empty() => path,
            _ => return Err("Unable to get your home dir! home::home_dir() isn't working".into()),
        };
        let config_directory = home_dir.join(".config").join(".git-ferry");
        let config_path = config_directory.join("config.toml");
        create_dir_all(config_directory).map_err(|e| {
            GitFerryError::new_with_source(GitFerryErrorKind::Config, "Unable to create config dir", e)
        })?;
        if !config_path.exists() {
            let mut file = File::create(&config_path).map_err(|e| {
                GitFerryError::new_with_source(
                    GitFerryErrorKind::Config,
                    "Unable to create config file",
                    e,
                )
            })?;
            file.write_all(b"").map_err(|e| {
                GitFerryError::new_with_source(
                    GitFerryErrorKind::Config,
                    "Unable to write to config file",
                    e,
                )
            })?;
        }
        Ok(config_path)
    }

    /// Resolve the migration run settings from CLI arguments, environment
    /// variables and the config file, in that order of precedence.
    pub fn migration_settings(&self) -> MigrationSettings {
        let migration = self.config_data.migration.clone().unwrap_or_default();
        let root_path = self
            .cli_args
            .root
            .clone()
            .or_else(|| value_or_env(&migration.root_path, "PATH_TO_REPO"))
            .unwrap_or_else(|| "repositories".to_string());
        let skip_file = self
            .cli_args
            .skip_file
            .clone()
            .or_else(|| value_or_env(&migration.skip_file, "SKIP_FILE"))
            .unwrap_or_else(|| "skip.txt".to_string());
        let fail_on_repo_exists = self.cli_args.fail_on_exists
            || flag_or_env(migration.fail_on_repo_exists, "FAIL_ON_REPO_EXISTS");
        let lfs_enabled = self.cli_args.lfs || flag_or_env(migration.lfs_enabled, "USE_GIT_LFS");
        let lfs_limit = self
            .cli_args
            .lfs_limit
            .clone()
            .or_else(|| value_or_env(&migration.lfs_limit, "GIT_LFS_LIMIT"))
            .unwrap_or_else(|| "100MB".to_string());
        MigrationSettings {
            root_path: PathBuf::from(root_path),
            skip_file: PathBuf::from(skip_file),
            fail_on_repo_exists,
            lfs: LfsSettings {
                enabled: lfs_enabled,
                limit: lfs_limit,
            },
        }
    }
}

/// A config file value, or the named environment variable as fallback.
pub(crate) fn value_or_env(value: &Option<String>, env_key: &str) -> Option<String> {
    match value {
        Some(v) if !v.is_empty() => Some(v.clone()),
        _ => std::env::var(env_key).ok().filter(|v| !v.is_empty()),
    }
}

/// A required config file value, or the named environment variable as fallback.
/// # Errors
/// Error naming the missing setting if neither is present.
pub(crate) fn require_value(
    value: &Option<String>,
    env_key: &str,
    what: &str,
) -> Result<String, GitFerryError> {
    value_or_env(value, env_key)
        .ok_or_else(|| format!("Missing {what} (config file or ${env_key})").into())
}

/// A boolean config file value, or the named environment variable as fallback.
pub(crate) fn flag_or_env(value: Option<bool>, env_key: &str) -> bool {
    match value {
        Some(v) => v,
        None => matches!(std::env::var(env_key), Ok(v) if v.trim().eq_ignore_ascii_case("true")),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn config_value_wins_over_default() {
        let value = Some("from-config".to_string());
        assert_eq!(
            value_or_env(&value, "GIT_FERRY_UNSET_TEST_KEY"),
            Some("from-config".to_string())
        );
    }

    #[test]
    fn missing_required_value_names_the_setting() {
        let err = require_value(&None, "GIT_FERRY_UNSET_TEST_KEY", "bitbucket workspace")
            .unwrap_err()
            .to_string();
        assert!(err.contains("bitbucket workspace"));
        assert!(err.contains("GIT_FERRY_UNSET_TEST_KEY"));
    }

    #[test]
    fn explicit_flag_wins_over_env() {
        assert!(flag_or_env(Some(true), "GIT_FERRY_UNSET_TEST_KEY"));
        assert!(!flag_or_env(Some(false), "GIT_FERRY_UNSET_TEST_KEY"));
        assert!(!flag_or_env(None, "GIT_FERRY_UNSET_TEST_KEY"));
    }

    #[test]
    fn settings_fall_back_to_defaults() {
        let config = GitFerryConfig::default();
        let settings = config.migration_settings();
        assert_eq!(settings.root_path, PathBuf::from("repositories"));
        assert_eq!(settings.skip_file, PathBuf::from("skip.txt"));
        assert!(!settings.fail_on_repo_exists);
        assert!(!settings.lfs.enabled);
        assert_eq!(settings.lfs.limit, "100MB");
    }
}
