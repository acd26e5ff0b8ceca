//! Error types and result aliases for nupin operations.
//!
//! Provides a unified error type that covers all possible error conditions
//! across nupin with actionable error messages.

use thiserror::Error;

use crate::types::VersionError;

/// Unified error type for all nupin operations
#[derive(Error, Debug)]
pub enum NupinError {
    // Input errors
    #[error(transparent)]
    Format(#[from] VersionError),

    // Resolution errors
    #[error("No available version of '{package}' satisfies {range} (required by {required_by})")]
    UnresolvableDependency {
        package: String,
        range: String,
        required_by: String,
    },

    #[error(
        "Version conflict: {required_by} requires {package} {required}, but {package} {selected} was selected"
    )]
    VersionConflict {
        package: String,
        required: String,
        required_by: String,
        selected: String,
    },

    #[error("Circular dependency detected: {cycle}")]
    CyclicDependency { cycle: String },

    // Collaborator errors
    #[error("Package '{package}' not found in {location}")]
    PackageNotFound { package: String, location: String },

    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Integrity check failed for {package}: expected {expected}, got {actual}")]
    IntegrityFailure {
        package: String,
        expected: String,
        actual: String,
    },

    #[error("Refusing to write outside the package directory: {path}")]
    UnsafePath { path: String },

    // Config errors
    #[error("Configuration field '{field}' is invalid: {reason}")]
    ConfigValidation { field: String, reason: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for nupin operations
pub type NupinResult<T> = Result<T, NupinError>;

impl NupinError {
    /// Create a transport error from any error type
    pub fn transport<E>(message: String, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport {
            message,
            source: Some(Box::new(source)),
        }
    }

    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    pub fn not_found(package: impl Into<String>, location: impl Into<String>) -> Self {
        Self::PackageNotFound {
            package: package.into(),
            location: location.into(),
        }
    }

    pub fn serialization(message: impl std::fmt::Display) -> Self {
        Self::Serialization {
            message: message.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, NupinError::PackageNotFound { .. })
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(self, NupinError::Transport { .. } | NupinError::Io { .. })
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            NupinError::Format(VersionError::InvalidPackageId { .. }) => {
                Some("Package ids are single names such as Newtonsoft.Json, without path separators")
            },
            NupinError::Format(_) => {
                Some("Use a version like 1.2.3 or an interval like [1.0,2.0)")
            },
            NupinError::UnresolvableDependency { .. } => {
                Some("Check the configured package sources or widen the requested range")
            },
            NupinError::VersionConflict { .. } => {
                Some("Uninstall the conflicting package first or request a compatible version")
            },
            NupinError::CyclicDependency { .. } => {
                Some("The published packages depend on each other; report it to the package authors")
            },
            NupinError::PackageNotFound { .. } => {
                Some("Check the package id spelling and the configured package sources")
            },
            NupinError::Transport { .. } => Some("Check your network connection and try again"),
            NupinError::IntegrityFailure { .. } => {
                Some("Clear the package cache and install again")
            },
            _ => None,
        }
    }
}
