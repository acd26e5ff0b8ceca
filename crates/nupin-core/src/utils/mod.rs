//! Utility functions and helpers.
//!
//! Common functionality used across multiple nupin crates.

pub mod hash;
pub mod layout;
pub mod path;

// Re-export commonly used utilities
pub use hash::{blake3_hash, verify_integrity};
pub use layout::FlatLayout;
pub use path::{is_safe_path, normalize_path, safe_join};
