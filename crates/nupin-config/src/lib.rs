//! Configuration loading for nupin
//!
//! This crate finds and parses `nupin.toml`, applies environment overrides and
//! validates the result before the install engine is built from it.

pub mod merge;
pub mod toml;

// Re-export main types
pub use merge::{ConfigLayering, ConfigLoader, ConfigSource, LoadedConfig};
pub use self::toml::{CacheSection, InstallSection, NupinToml, PlatformSection, SourceLocation, SourceSpec};

use nupin_core::NupinError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, NupinError>;

/// Name of the project configuration file
pub const CONFIG_FILE: &str = "nupin.toml";
