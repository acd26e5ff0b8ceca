//! Config file discovery and environment overrides

use std::collections::HashMap;

use camino::{Utf8Path, Utf8PathBuf};
use nupin_core::NupinError;
use tracing::debug;

use crate::toml::{load_from_file, NupinToml, SourceLocation, SourceSpec};
use crate::{ConfigResult, CONFIG_FILE};

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// A nupin.toml file
    File(Utf8PathBuf),
    /// No file was found; built-in defaults
    Defaults,
}

/// A configuration together with the directory its relative paths start from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: NupinToml,
    pub root: Utf8PathBuf,
    pub source: ConfigSource,
}

impl LoadedConfig {
    /// Directory package folders are created in
    pub fn repository_path(&self) -> Utf8PathBuf {
        self.root.join(&self.config.install.repository_path)
    }

    /// Package cache directory, `<home>/.nupin/cache` unless configured
    pub fn cache_path(&self) -> ConfigResult<Utf8PathBuf> {
        match &self.config.cache.path {
            Some(path) => Ok(self.root.join(path)),
            None => Ok(home_dir()?.join(".nupin").join("cache")),
        }
    }

    /// Sources in lookup order with their resolved locations
    pub fn sources(&self) -> ConfigResult<Vec<(&SourceSpec, SourceLocation)>> {
        self.config
            .sources
            .iter()
            .map(|source| source.location(&self.root).map(|location| (source, location)))
            .collect()
    }
}

fn home_dir() -> ConfigResult<Utf8PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| NupinError::ConfigValidation {
        field: "cache.path".to_string(),
        reason: "Could not determine home directory".to_string(),
    })?;

    Utf8PathBuf::try_from(home).map_err(|e| NupinError::ConfigValidation {
        field: "cache.path".to_string(),
        reason: format!("Invalid home directory path: {}", e),
    })
}

/// Main configuration loading interface
pub struct ConfigLoader {
    /// Current working directory
    cwd: Utf8PathBuf,
}

impl ConfigLoader {
    pub fn new(cwd: Utf8PathBuf) -> Self {
        Self { cwd }
    }

    /// Loader rooted at the process working directory
    pub fn from_current_dir() -> ConfigResult<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| NupinError::io("Failed to read the working directory".to_string(), e))?;
        let cwd = Utf8PathBuf::try_from(cwd).map_err(|e| NupinError::ConfigValidation {
            field: "working directory".to_string(),
            reason: format!("not valid UTF-8: {}", e),
        })?;
        Ok(Self::new(cwd))
    }

    /// Find nupin.toml in the working directory or one of its parents
    pub fn resolve_config_path(&self) -> Option<Utf8PathBuf> {
        self.cwd
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE))
            .find(|path| path.is_file())
    }

    /// Load the project configuration, falling back to defaults
    pub fn load(&self) -> ConfigResult<LoadedConfig> {
        match self.resolve_config_path() {
            Some(path) => self.load_file(&path),
            None => {
                debug!("No {} found above {}; using defaults", CONFIG_FILE, self.cwd);
                self.finish(NupinToml::default(), self.cwd.clone(), ConfigSource::Defaults)
            },
        }
    }

    /// Load an explicit config file
    pub fn load_file(&self, path: &Utf8Path) -> ConfigResult<LoadedConfig> {
        let path = self.cwd.join(path);
        let config = load_from_file(&path)?;
        let root = path.parent().map(Utf8Path::to_path_buf).unwrap_or_else(|| self.cwd.clone());
        debug!("Loaded configuration from {}", path);
        self.finish(config, root, ConfigSource::File(path))
    }

    fn finish(&self, config: NupinToml, root: Utf8PathBuf, source: ConfigSource) -> ConfigResult<LoadedConfig> {
        let overrides = ConfigLayering::collect_env_overrides();
        let config = ConfigLayering::apply_env_overrides(config, &overrides)?;
        Ok(LoadedConfig { config, root, source })
    }
}

/// Environment overrides on top of a loaded file
pub struct ConfigLayering;

impl ConfigLayering {
    /// Apply `NUPIN_*` overrides to a configuration
    pub fn apply_env_overrides(
        mut config: NupinToml,
        overrides: &HashMap<String, String>,
    ) -> ConfigResult<NupinToml> {
        for (key, value) in overrides {
            match key.as_str() {
                "NUPIN_PREFER_CACHE" => {
                    config.install.prefer_cache = parse_bool(value).ok_or_else(|| NupinError::ConfigValidation {
                        field: key.clone(),
                        reason: format!("expected true/false/1/0/yes/no, got '{}'", value),
                    })?;
                },
                "NUPIN_CACHE_DIR" => {
                    config.cache.path = Some(Utf8PathBuf::from(value));
                },
                "NUPIN_REPOSITORY_PATH" => {
                    config.install.repository_path = Utf8PathBuf::from(value);
                },
                _ => {},
            }
        }

        crate::toml::validate_config(&config)?;
        Ok(config)
    }

    /// Collect environment variable overrides
    pub fn collect_env_overrides() -> HashMap<String, String> {
        std::env::vars().filter(|(key, _)| key.starts_with("NUPIN_")).collect()
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn utf8_dir(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_config_found_in_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = utf8_dir(&temp_dir);
        let nested = root.join("Assets").join("Scripts");
        fs::create_dir_all(&nested).unwrap();
        fs::write(root.join(CONFIG_FILE), "[install]\nrepository-path = \"Assets/Packages\"\n").unwrap();

        let loader = ConfigLoader::new(nested);
        assert_eq!(loader.resolve_config_path(), Some(root.join(CONFIG_FILE)));

        let loaded = loader.load().unwrap();
        assert_eq!(loaded.root, root);
        assert_eq!(loaded.source, ConfigSource::File(root.join(CONFIG_FILE)));
        assert_eq!(loaded.repository_path(), root.join("Assets/Packages"));
    }

    #[test]
    fn test_relative_paths_follow_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let root = utf8_dir(&temp_dir);
        fs::create_dir_all(root.join("project")).unwrap();
        fs::write(
            root.join("project").join("custom.toml"),
            "[cache]\npath = \"cache\"\n\n[[sources]]\nname = \"local\"\npath = \"../feed\"\n",
        )
        .unwrap();

        let loaded = ConfigLoader::new(root.clone())
            .load_file(Utf8Path::new("project/custom.toml"))
            .unwrap();

        assert_eq!(loaded.cache_path().unwrap(), root.join("project").join("cache"));
        let sources = loaded.sources().unwrap();
        assert_eq!(sources[0].0.name, "local");
        assert_eq!(sources[0].1, SourceLocation::Folder(root.join("project").join("../feed")));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::new(utf8_dir(&temp_dir));
        assert!(matches!(
            loader.load_file(Utf8Path::new("missing.toml")),
            Err(NupinError::Io { .. })
        ));
    }

    #[test]
    fn test_env_overrides() {
        let overrides = HashMap::from([
            ("NUPIN_PREFER_CACHE".to_string(), "no".to_string()),
            ("NUPIN_CACHE_DIR".to_string(), "/tmp/nupin-cache".to_string()),
            ("NUPIN_REPOSITORY_PATH".to_string(), "Assets/Packages".to_string()),
            ("NUPIN_UNKNOWN".to_string(), "ignored".to_string()),
        ]);

        let config = ConfigLayering::apply_env_overrides(NupinToml::default(), &overrides).unwrap();

        assert!(!config.install.prefer_cache);
        assert_eq!(config.cache.path.as_deref(), Some(Utf8Path::new("/tmp/nupin-cache")));
        assert_eq!(config.install.repository_path, "Assets/Packages");
    }

    #[test]
    fn test_invalid_bool_override() {
        let overrides = HashMap::from([("NUPIN_PREFER_CACHE".to_string(), "sometimes".to_string())]);
        let err = ConfigLayering::apply_env_overrides(NupinToml::default(), &overrides).unwrap_err();
        assert!(err.to_string().contains("NUPIN_PREFER_CACHE"));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" 1 "), Some(true));
        assert_eq!(parse_bool("no"), Some(false));
        assert_eq!(parse_bool(""), None);
    }
}
