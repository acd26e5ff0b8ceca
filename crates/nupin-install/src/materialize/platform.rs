//! Supported platform filtering
//!
//! Packages often ship one `lib/<framework>` folder per target framework. A
//! supported platform names the folders a project can load; the others are
//! pruned after extraction.

use nupin_core::NupinError;
use regex::Regex;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::ManagerResult;

/// Folder under a package root holding per-framework libraries
pub const LIB_DIR: &str = "lib";

/// A target platform and the library folder names it accepts
#[derive(Debug, Clone)]
pub struct SupportedPlatform {
    name: String,
    library_names: Vec<Regex>,
}

impl SupportedPlatform {
    /// Compile a platform from library folder name patterns
    pub fn new(name: impl Into<String>, patterns: &[String]) -> ManagerResult<Self> {
        let name = name.into();
        let library_names = patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| NupinError::ConfigValidation {
                    field: format!("platform.library-names ({})", name),
                    reason: e.to_string(),
                })
            })
            .collect::<ManagerResult<Vec<_>>>()?;

        Ok(Self { name, library_names })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if a `lib` folder name is loadable on this platform
    pub fn supports(&self, folder: &str) -> bool {
        self.library_names.iter().any(|pattern| pattern.is_match(folder))
    }

    /// Delete unsupported `lib/<folder>` directories below a package root.
    ///
    /// Returns the names of the removed folders.
    pub fn prune(&self, package_root: &Path) -> ManagerResult<Vec<String>> {
        let lib = package_root.join(LIB_DIR);
        let entries = match fs::read_dir(&lib) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(NupinError::io(format!("Failed to list {}", lib.display()), e)),
        };

        let mut pruned = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| NupinError::io(format!("Failed to list {}", lib.display()), e))?;
            let folder = entry.file_name().to_string_lossy().into_owned();
            if !entry.path().is_dir() || self.supports(&folder) {
                continue;
            }
            fs::remove_dir_all(entry.path())
                .map_err(|e| NupinError::io(format!("Failed to prune {}", entry.path().display()), e))?;
            pruned.push(folder);
        }

        pruned.sort();
        Ok(pruned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn platform() -> SupportedPlatform {
        SupportedPlatform::new("net46", &["^net4[5-6]$".to_string(), r"^netstandard2\.0$".to_string()])
            .unwrap()
    }

    #[test]
    fn test_supports() {
        let platform = platform();
        assert_eq!(platform.name(), "net46");
        assert!(platform.supports("net45"));
        assert!(platform.supports("netstandard2.0"));
        assert!(!platform.supports("net40"));
        assert!(!platform.supports("netstandard2x0"));
    }

    #[test]
    fn test_invalid_pattern() {
        let result = SupportedPlatform::new("broken", &["(".to_string()]);
        assert!(matches!(result, Err(NupinError::ConfigValidation { .. })));
    }

    #[test]
    fn test_prune_without_lib_folder() {
        let dir = TempDir::new().unwrap();
        assert!(platform().prune(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_prune_reports_unreadable_lib() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(LIB_DIR), "not a directory").unwrap();

        assert!(matches!(platform().prune(dir.path()), Err(NupinError::Io { .. })));
    }

    #[test]
    fn test_prune_removes_every_folder_when_nothing_matches() {
        let dir = TempDir::new().unwrap();
        for folder in ["net20", "net35"] {
            fs::create_dir_all(dir.path().join(LIB_DIR).join(folder)).unwrap();
        }

        assert_eq!(platform().prune(dir.path()).unwrap(), vec!["net20", "net35"]);
        assert_eq!(fs::read_dir(dir.path().join(LIB_DIR)).unwrap().count(), 0);
    }
}
