//! Dependency resolution for nupin
//!
//! Resolution is a single greedy pass over a work queue: already installed
//! versions are reused when they satisfy a requirement, new candidates come
//! from the local cache or the feeds, and conflicting requirements keep the
//! newest version. No backtracking is performed, so the same inputs always
//! produce the same plan.

pub mod graph;
pub mod resolver;
pub mod selector;

// Re-export main types
pub use graph::PlanGraph;
pub use resolver::{ResolutionResult, ResolveOptions, ResolvedPackage, Resolver};
pub use selector::{Candidate, PackageSource, VersionSelector};

use nupin_core::NupinError;

/// Result type for resolver operations
pub type ResolverResult<T> = Result<T, NupinError>;
