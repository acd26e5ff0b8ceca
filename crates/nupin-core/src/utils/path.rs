//! Path utilities for safe file system operations.
//!
//! Provides path normalization and security checks to prevent directory traversal.

use crate::error::{NupinError, NupinResult};
use std::path::{Component, Path, PathBuf};

/// Normalize a path by resolving . and .. components
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => {
                // Keep a leading .. so escaping paths stay detectable
                match components.last() {
                    Some(Component::Normal(_)) => {
                        components.pop();
                    },
                    _ => components.push(component),
                }
            },
            other => components.push(other),
        }
    }

    components.iter().collect()
}

/// Check if a path is safe (relative, no directory traversal)
pub fn is_safe_path(path: &Path) -> bool {
    let mut depth = 0i32;

    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            },
            Component::Normal(_) => depth += 1,
            // RootDir and Prefix make the path absolute
            _ => return false,
        }
    }

    true
}

/// Safely join paths, preventing directory traversal
pub fn safe_join(base: &Path, path: &Path) -> NupinResult<PathBuf> {
    if !is_safe_path(path) {
        return Err(NupinError::UnsafePath {
            path: path.display().to_string(),
        });
    }

    Ok(base.join(normalize_path(path)))
}
