//! Command execution for manifest-release.
//!
//! Both commands share the same setup: load the configuration file, connect
//! to the manifests repository and build an [`Orchestrator`]. They differ in
//! what they do with the resulting release plan.
use log::*;
use std::rc::Rc;

use crate::{
    Result,
    cli::{Args, Command},
    config::Config,
    forge::{github::Github, manager::ForgeManager},
    orchestrator::Orchestrator,
};

/// Prints the release plan as JSON.
pub mod plan;

/// Opens the release pull request.
pub mod release_pr;

/// Loads configuration and connects to GitHub, then runs the selected
/// command.
pub async fn run(args: Args) -> Result<()> {
    let remote_config = args.get_remote()?;

    if remote_config.dry_run {
        warn!("dry_run: no changes will be written to {}", remote_config.repo);
    }

    let config = Config::load(&args.config).await?;
    let forge = Github::new(remote_config)?;
    let forge_manager = ForgeManager::new(Box::new(forge));

    let orchestrator =
        Orchestrator::new(Rc::new(config), Rc::new(forge_manager));

    match args.command {
        Command::ReleasePr => release_pr::execute(&orchestrator).await,
        Command::Plan { out_file } => plan::execute(&orchestrator, out_file).await,
    }
}
