//! Command line options for the git-ferry tool
use clap::Parser;
use log::LevelFilter;
use serde::Deserialize;

use crate::{
    config::GitFerryConfig, errors::GitFerryError, pipeline::run_migration, utils::render_report,
};

/// git-ferry - Migrate every repository of a Bitbucket workspace to GitHub
#[derive(Parser, Deserialize, Default, Clone, Debug)]
pub struct GitFerryCli {
    /// Custom configuration file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Local directory the bare mirrors are stored under
    #[arg(long)]
    pub root: Option<String>,

    /// Newline-delimited file of repository slugs to skip
    #[arg(long = "skip-file")]
    pub skip_file: Option<String>,

    /// Treat an already-existing destination repository as a success
    #[arg(long = "fail-on-exists")]
    pub fail_on_exists: bool,

    /// Rewrite large-file history into LFS before pushing
    #[arg(long)]
    pub lfs: bool,

    /// Size threshold for the LFS rewrite (e.g. 100MB)
    #[arg(long = "lfs-limit")]
    pub lfs_limit: Option<String>,

    /// Show the current config path
    #[arg(long)]
    pub show_config_path: bool,

    /// Verbose mode (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Run the git-ferry tool with the command line options
/// # Errors
/// Error if the configuration can't be loaded or the run can't start;
/// per-repository failures end up in the report instead
pub async fn git_ferry_main() -> Result<(), GitFerryError> {
    let args = GitFerryCli::parse();
    let level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let _ = env_logger::builder()
        .filter_level(level)
        .format_target(false)
        .format_timestamp(None)
        .try_init();
    dotenv::dotenv().ok();
    let config = GitFerryConfig::try_new(args)?;
    if config.cli_args.show_config_path {
        println!("{}", config.config_path.display());
        return Ok(());
    }
    let records = run_migration(&config).await?;
    print!("{}", render_report(&records));
    Ok(())
}
