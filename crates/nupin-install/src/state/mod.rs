//! Persisted installed state

use camino::{Utf8Path, Utf8PathBuf};
use nupin_core::{NupinError, PackageRecord};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use tracing::debug;

use crate::ManagerResult;

/// File name of the installed state inside the repository directory
pub const STATE_FILE: &str = "packages.json";

/// Storage for the installed package records
pub trait InstalledStateStore {
    fn load(&self) -> ManagerResult<Vec<PackageRecord>>;

    fn save(&self, records: &[PackageRecord]) -> ManagerResult<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    packages: Vec<PackageRecord>,
}

/// Installed state kept in a `packages.json` file
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    path: Utf8PathBuf,
}

impl JsonStateStore {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location inside a repository directory
    pub fn in_repository(repository: &Utf8Path) -> Self {
        Self::new(repository.join(STATE_FILE))
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl InstalledStateStore for JsonStateStore {
    fn load(&self) -> ManagerResult<Vec<PackageRecord>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No installed state at {}", self.path);
                return Ok(Vec::new());
            },
            Err(e) => return Err(NupinError::io(format!("Failed to read {}", self.path), e)),
        };

        let state: StateFile = serde_json::from_str(&content)
            .map_err(|e| NupinError::serialization(format!("{}: {}", self.path, e)))?;
        Ok(state.packages)
    }

    fn save(&self, records: &[PackageRecord]) -> ManagerResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| NupinError::io(format!("Failed to create {}", parent), e))?;
        }

        let state = StateFile {
            packages: records.to_vec(),
        };
        let json = serde_json::to_string_pretty(&state).map_err(NupinError::serialization)?;

        // Replace the file in one step so a crash never leaves half a state file
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, json)
            .map_err(|e| NupinError::io(format!("Failed to write {}", staging), e))?;
        fs::rename(&staging, &self.path)
            .map_err(|e| NupinError::io(format!("Failed to replace {}", self.path), e))?;

        debug!("Saved {} installed packages to {}", records.len(), self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nupin_core::PackageIdentifier;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> JsonStateStore {
        JsonStateStore::in_repository(&Utf8Path::from_path(dir.path()).unwrap().join("Packages"))
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(store(&dir).load().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let records = vec![
            PackageRecord::new("bootstrap", "3.3.7".parse().unwrap())
                .with_dependency(PackageIdentifier::parse("jQuery", "[1.9.1, 4.0.0)").unwrap()),
            PackageRecord::new("jQuery", "1.9.1".parse().unwrap()),
        ];

        store.save(&records).unwrap();

        assert_eq!(store.load().unwrap(), records);
        assert!(store.path().ends_with("Packages/packages.json"));
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{ not json").unwrap();

        assert!(matches!(store.load(), Err(NupinError::Serialization { .. })));
    }
}
