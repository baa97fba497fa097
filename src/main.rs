//! clog - a static site generator for markdown blogs.

mod cli;
mod config;
mod content;
mod deploy;
mod error;
mod init;
mod logger;
mod serve;
mod site;
mod utils;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use deploy::{DeployError, deploy_site};
use error::SiteError;
use init::new_site;
use logger::Logger;
use serve::develop;
use site::Site;
use std::process::ExitCode;
use utils::git::GitError;

/// Where to read about adding a git remote
const REMOTE_HELP_URL: &str = "https://docs.github.com/en/get-started/getting-started-with-git/managing-remote-repositories";

fn main() -> ExitCode {
    let cli = Cli::parse();
    let logger = Logger::new(cli.quiet);

    match run(&cli, logger) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err, logger);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, logger: Logger) -> Result<()> {
    let root = cli.root.as_path();
    match &cli.command {
        Commands::New { directory } => {
            let site_root = new_site(&root.join(directory), logger)?;
            println!("Project created at {}", site_root.display());
        }
        Commands::Build => Site::new(root, logger).build()?,
        Commands::Deploy { autocommit } => deploy_site(root, *autocommit, logger)?,
        Commands::Develop { port } => develop(root, *port, logger)?,
    }
    Ok(())
}

/// Print the error chain plus guidance for the errors users can act on.
fn report(err: &anyhow::Error, logger: Logger) {
    if let Some(SiteError::AlreadyExists(_)) = err.downcast_ref::<SiteError>() {
        eprintln!("{err}");
        return;
    }

    logger.error(err);
    match err.downcast_ref::<DeployError>() {
        Some(DeployError::Git(GitError::PermissionDenied { .. })) => {
            eprintln!("Ensure that you have the right credential to access the remote repository");
        }
        Some(DeployError::NoRemotes) => {
            eprintln!("See {REMOTE_HELP_URL} for help");
        }
        _ => {}
    }
}
