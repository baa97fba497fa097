//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// clog: static site generator for markdown blogs
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Site root directory
    #[arg(short, long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create a new site with the default theme
    New {
        /// Directory of the new site, relative to `root`; must not exist
        directory: PathBuf,
    },

    /// Convert content/ into a themed site in public/
    Build,

    /// Build the site and publish it to the deploy branch
    Deploy {
        /// Commit and push uncommitted changes before deploying
        #[arg(long)]
        autocommit: bool,
    },

    /// Serve public/ locally
    Develop {
        /// Port to listen on
        #[arg(short, long, default_value_t = 8000)]
        port: u16,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_new() {
        let cli = Cli::parse_from(["clog", "new", "blog"]);
        assert!(matches!(cli.command, Commands::New { ref directory } if directory == &PathBuf::from("blog")));
        assert_eq!(cli.root, PathBuf::from("."));
        assert!(!cli.quiet);
    }

    #[test]
    fn test_parse_deploy_autocommit() {
        let cli = Cli::parse_from(["clog", "deploy", "--autocommit"]);
        assert!(matches!(cli.command, Commands::Deploy { autocommit: true }));

        let cli = Cli::parse_from(["clog", "deploy"]);
        assert!(matches!(cli.command, Commands::Deploy { autocommit: false }));
    }

    #[test]
    fn test_parse_develop_port() {
        let cli = Cli::parse_from(["clog", "develop"]);
        assert!(matches!(cli.command, Commands::Develop { port: 8000 }));

        let cli = Cli::parse_from(["clog", "develop", "--port", "4000"]);
        assert!(matches!(cli.command, Commands::Develop { port: 4000 }));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["clog", "build", "--root", "site", "-q"]);
        assert!(matches!(cli.command, Commands::Build));
        assert_eq!(cli.root, PathBuf::from("site"));
        assert!(cli.quiet);
    }

    #[test]
    fn test_new_requires_directory() {
        assert!(Cli::try_parse_from(["clog", "new"]).is_err());
    }
}
