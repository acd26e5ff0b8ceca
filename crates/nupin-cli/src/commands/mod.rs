//! Command implementations and dispatch logic.
//!
//! Each command takes a [`CommandContext`] that holds the loaded
//! configuration and builds the install engine from it on demand.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use nupin_cache::DiskCache;
use nupin_config::{ConfigLoader, LoadedConfig, SourceLocation};
use nupin_core::{NupinError, NupinResult, PackageIdentifier};
use nupin_install::{DirectoryMaterializer, InstallManager, JsonStateStore, SupportedPlatform};
use nupin_registry::{AuthConfig, FeedSet, FolderFeed, HttpFeed};
use nupin_resolver::ResolveOptions;
use tracing::{debug, info};

pub mod install;
pub mod list;
pub mod push;
pub mod resolve;
pub mod restore;
pub mod uninstall;

#[cfg(test)]
mod tests;

use crate::output::OutputHandler;
use crate::Commands;

/// Shared context for all commands
pub struct CommandContext {
    pub config: LoadedConfig,
    pub output: OutputHandler,
}

impl CommandContext {
    /// Load configuration for the process working directory
    pub fn from_current_dir(config_file: Option<&Utf8Path>) -> NupinResult<Self> {
        Self::load(ConfigLoader::from_current_dir()?, config_file)
    }

    pub fn load(loader: ConfigLoader, config_file: Option<&Utf8Path>) -> NupinResult<Self> {
        let config = match config_file {
            Some(path) => loader.load_file(path)?,
            None => loader.load()?,
        };
        debug!("Configuration: {:?}", config.source);

        Ok(Self {
            config,
            output: OutputHandler::new(),
        })
    }

    pub fn repository_path(&self) -> Utf8PathBuf {
        self.config.repository_path()
    }

    /// Every configured source, in lookup order
    pub fn feed_set(&self) -> NupinResult<FeedSet> {
        let mut feeds = FeedSet::new();
        for (source, location) in self.config.sources()? {
            match location {
                SourceLocation::Folder(path) => {
                    feeds.push(Box::new(FolderFeed::new(source.name.clone(), path)));
                },
                SourceLocation::Http(url) => {
                    let auth = AuthConfig {
                        token: source.token(),
                    };
                    feeds.push(Box::new(HttpFeed::with_auth(source.name.clone(), url, auth)?));
                },
            }
        }
        Ok(feeds)
    }

    /// The folder source with the given name
    pub fn folder_source(&self, name: &str) -> NupinResult<FolderFeed> {
        for (source, location) in self.config.sources()? {
            if !source.name.eq_ignore_ascii_case(name) {
                continue;
            }
            return match location {
                SourceLocation::Folder(path) => Ok(FolderFeed::new(source.name.clone(), path)),
                SourceLocation::Http(_) => Err(NupinError::ConfigValidation {
                    field: format!("sources.{}", source.name),
                    reason: "packages can only be pushed to folder sources".to_string(),
                }),
            };
        }

        Err(NupinError::ConfigValidation {
            field: "sources".to_string(),
            reason: format!("no source named '{}' is configured", name),
        })
    }

    /// Build the install engine from the configuration
    pub fn open_manager(&self) -> NupinResult<InstallManager> {
        let repository = self.repository_path();
        let cache = DiskCache::open(self.config.cache_path()?)?;

        let mut materializer = DirectoryMaterializer::new(repository.clone());
        if let Some(platform) = &self.config.config.platform {
            materializer = materializer
                .with_platform(SupportedPlatform::new(platform.name.clone(), &platform.library_names)?);
        }

        let options = ResolveOptions {
            prefer_cache: self.config.config.install.prefer_cache,
        };
        debug!("Installing into {} (prefer cache: {})", repository, options.prefer_cache);

        InstallManager::open(
            Box::new(self.feed_set()?),
            Box::new(cache),
            Box::new(materializer),
            Box::new(JsonStateStore::in_repository(&repository)),
            options,
        )
    }
}

/// Build an identifier from command line arguments
pub fn parse_identifier(id: &str, range: Option<&str>) -> NupinResult<PackageIdentifier> {
    match range {
        Some(range) => Ok(PackageIdentifier::parse(id, range)?),
        None => Ok(PackageIdentifier::parse_any(id)?),
    }
}

/// Dispatch a command to its handler
pub fn dispatch_command(command: Commands, ctx: &CommandContext) -> anyhow::Result<()> {
    match command {
        Commands::Install { id, range } => {
            info!("Installing {} {}", id, range.as_deref().unwrap_or("(any version)"));
            install::execute(&id, range.as_deref(), ctx).with_context(|| format!("Failed to install {}", id))
        },
        Commands::Uninstall { id, with_dependencies } => {
            uninstall::execute(&id, with_dependencies, ctx).with_context(|| format!("Failed to uninstall {}", id))
        },
        Commands::UninstallAll => uninstall::execute_all(ctx).context("Failed to uninstall packages"),
        Commands::Restore => restore::execute(ctx).context("Failed to restore packages"),
        Commands::List => list::execute(ctx),
        Commands::Resolve { id, range } => {
            resolve::execute(&id, range.as_deref(), ctx).with_context(|| format!("Failed to resolve {}", id))
        },
        Commands::Push { record, archive, source } => {
            push::execute(&record, &archive, &source, ctx).context("Failed to push package")
        },
    }
}
