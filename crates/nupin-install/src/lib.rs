//! Install engine for nupin
//!
//! `InstallManager` applies resolution plans to a project: it fetches
//! archives, asks a [`Materializer`] to place or remove package files and
//! keeps the persisted [`InstalledSet`](nupin_core::InstalledSet) in step with
//! what is on disk. Every public operation is idempotent.

pub mod manager;
pub mod materialize;
pub mod state;

// Re-export main types
pub use manager::{InstallManager, InstallResult, UninstallFailure, UninstallResult, Upgrade};
pub use materialize::{DirectoryMaterializer, Materializer, SupportedPlatform};
pub use state::{InstalledStateStore, JsonStateStore};

use nupin_core::NupinError;

/// Result type for install engine operations
pub type ManagerResult<T> = Result<T, NupinError>;
