//! Bitbucket API module.
pub(crate) mod config;
pub(crate) mod platform;
pub(crate) mod repo;

/// Bitbucket remote host
const BITBUCKET_URL: &str = "bitbucket.org";

/// Bitbucket repository listing API base
const BITBUCKET_API_URL: &str = "api.bitbucket.org/2.0/repositories";
