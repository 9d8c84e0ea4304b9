//! # git-ferry
//!
//! Migrate every repository of a Bitbucket workspace to GitHub
//!
//! ## Usage
//!
//! ```txt
//! Usage: git-ferry [OPTIONS]
//!
//! Options:
//!   -c, --config <CONFIG>        Custom configuration file path
//!       --root <ROOT>            Local directory the bare mirrors are stored under
//!       --skip-file <SKIP_FILE>  Newline-delimited file of repository slugs to skip
//!       --fail-on-exists         Treat an already-existing destination repository as a success
//!       --lfs                    Rewrite large-file history into LFS before pushing
//!       --lfs-limit <LFS_LIMIT>  Size threshold for the LFS rewrite (e.g. 100MB)
//!       --show-config-path       Show the current config path
//!   -v, --verbose...             Verbose mode (-v, -vv, -vvv)
//!   -h, --help                   Print help
//! ```

#![warn(clippy::all, rust_2018_idioms)]
#![deny(
    missing_docs,
    clippy::all,
    clippy::missing_docs_in_private_items,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![warn(clippy::multiple_crate_versions)]

pub(crate) mod cli;
pub(crate) mod command;
pub(crate) mod config;
pub(crate) mod errors;
pub(crate) mod lfs;
pub(crate) mod pipeline;
pub(crate) mod platform;
pub(crate) mod utils;

mod bitbucket;
mod github;

pub use cli::{git_ferry_main, GitFerryCli};
pub use config::GitFerryConfig;
pub use errors::GitFerryError;
pub use pipeline::{run_migration, MigrationRecord, MigrationState};
pub use utils::Repo;
