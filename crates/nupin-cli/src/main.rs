//! # nupin-cli
//!
//! Command line front end for the nupin package installer. It parses
//! arguments, sets up logging and reports errors with their suggestions.

use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::CommandContext;
use output::errors::ErrorFormatter;

/// Install packages and their dependencies into a project
#[derive(Debug, Parser)]
#[command(name = "nupin", version, about = "Folder-feed package installer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use this config file instead of searching for nupin.toml
    #[arg(long, global = true, value_name = "FILE", env = "NUPIN_CONFIG")]
    pub config: Option<Utf8PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install a package and its dependencies
    Install {
        id: String,
        /// Version or interval, e.g. 1.0 or [1.0,2.0); any version when omitted
        range: Option<String>,
    },
    /// Uninstall a package
    Uninstall {
        id: String,
        /// Also remove dependencies no other package needs
        #[arg(long)]
        with_dependencies: bool,
    },
    /// Uninstall every package
    UninstallAll,
    /// Re-create missing package directories from the installed state
    Restore,
    /// List installed packages
    List,
    /// Show the install plan for a package without applying it
    Resolve { id: String, range: Option<String> },
    /// Publish a package into a folder source
    Push {
        /// Package record (record.json)
        record: Utf8PathBuf,
        /// Package archive, or a directory to pack
        archive: Utf8PathBuf,
        /// Name of the folder source to publish to
        #[arg(long)]
        source: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose);
    debug!("Starting nupin v{}", env!("CARGO_PKG_VERSION"));

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            debug!("{:?}", err);
            eprintln!("{}", ErrorFormatter::new().format_error(&err));
            ExitCode::FAILURE
        },
    }
}

fn run_cli(cli: Cli) -> anyhow::Result<()> {
    let ctx = CommandContext::from_current_dir(cli.config.as_deref())?;
    commands::dispatch_command(cli.command, &ctx)
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(
            [
                "nupin",
                "nupin_core",
                "nupin_registry",
                "nupin_cache",
                "nupin_resolver",
                "nupin_install",
                "nupin_config",
            ]
            .iter()
            .map(|target| format!("{}={}", target, level))
            .collect::<Vec<_>>()
            .join(","),
        )
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_install_with_range() {
        let cli = Cli::try_parse_from(["nupin", "install", "jQuery", "[1.9.1, 4.0.0)"]).unwrap();
        match cli.command {
            Commands::Install { id, range } => {
                assert_eq!(id, "jQuery");
                assert_eq!(range.as_deref(), Some("[1.9.1, 4.0.0)"));
            },
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "nupin",
            "uninstall",
            "bootstrap",
            "--with-dependencies",
            "--verbose",
            "--config",
            "other.toml",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.config.as_deref(), Some(camino::Utf8Path::new("other.toml")));
        assert!(matches!(cli.command, Commands::Uninstall { with_dependencies: true, .. }));
    }

    #[test]
    fn test_push_requires_source() {
        assert!(Cli::try_parse_from(["nupin", "push", "record.json", "pkg.tgz"]).is_err());
    }
}
