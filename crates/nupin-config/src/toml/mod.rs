//! nupin.toml parsing and validation

use std::collections::HashSet;

use camino::{Utf8Path, Utf8PathBuf};
use nupin_core::NupinError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::ConfigResult;

/// Complete nupin.toml configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NupinToml {
    #[serde(default)]
    pub install: InstallSection,

    #[serde(default)]
    pub cache: CacheSection,

    /// Package sources in lookup order
    #[serde(default)]
    pub sources: Vec<SourceSpec>,

    /// Supported platform used to prune `lib` folders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<PlatformSection>,
}

/// Install behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InstallSection {
    /// Take the newest cached version in range before asking the sources
    #[serde(default = "default_prefer_cache")]
    pub prefer_cache: bool,

    /// Where package directories are created, relative to the config file
    #[serde(default = "default_repository_path")]
    pub repository_path: Utf8PathBuf,
}

/// Package cache location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CacheSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Utf8PathBuf>,
}

/// One package source: a folder or an HTTP flat container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SourceSpec {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Utf8PathBuf>,

    /// Environment variable holding a bearer token for an HTTP source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,
}

/// A validated source location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Folder(Utf8PathBuf),
    Http(Url),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PlatformSection {
    pub name: String,

    /// Regular expressions matched against `lib/<folder>` names
    #[serde(default)]
    pub library_names: Vec<String>,
}

fn default_prefer_cache() -> bool {
    true
}

fn default_repository_path() -> Utf8PathBuf {
    Utf8PathBuf::from("Packages")
}

impl Default for InstallSection {
    fn default() -> Self {
        Self {
            prefer_cache: default_prefer_cache(),
            repository_path: default_repository_path(),
        }
    }
}

impl SourceSpec {
    /// Resolve the source against the directory holding the config file
    pub fn location(&self, base: &Utf8Path) -> ConfigResult<SourceLocation> {
        match (&self.url, &self.path) {
            (Some(url), None) => {
                let parsed = Url::parse(url).map_err(|e| self.invalid(format!("invalid url '{}': {}", url, e)))?;
                match parsed.scheme() {
                    "http" | "https" => Ok(SourceLocation::Http(parsed)),
                    other => Err(self.invalid(format!("unsupported url scheme '{}'", other))),
                }
            },
            (None, Some(path)) => Ok(SourceLocation::Folder(base.join(path))),
            (Some(_), Some(_)) => Err(self.invalid("set either url or path, not both".to_string())),
            (None, None) => Err(self.invalid("one of url or path is required".to_string())),
        }
    }

    /// Bearer token read from the variable named by `token-env`
    pub fn token(&self) -> Option<String> {
        self.token_env
            .as_ref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|token| !token.is_empty())
    }

    fn invalid(&self, reason: String) -> NupinError {
        NupinError::ConfigValidation {
            field: format!("sources.{}", self.name),
            reason,
        }
    }
}

/// Parse a TOML string into a validated configuration
pub fn parse_nupin_toml(content: &str) -> ConfigResult<NupinToml> {
    let config: NupinToml = ::toml::from_str(content)
        .map_err(|e| NupinError::serialization(format!("TOML parsing error: {}", e)))?;

    validate_config(&config)?;
    Ok(config)
}

/// Serialize a configuration back to TOML
pub fn serialize_nupin_toml(config: &NupinToml) -> ConfigResult<String> {
    ::toml::to_string_pretty(config)
        .map_err(|e| NupinError::serialization(format!("TOML serialization error: {}", e)))
}

/// Check source and platform settings
pub fn validate_config(config: &NupinToml) -> ConfigResult<()> {
    if config.install.repository_path.as_str().is_empty() {
        return Err(NupinError::ConfigValidation {
            field: "install.repository-path".to_string(),
            reason: "must not be empty".to_string(),
        });
    }

    let mut names = HashSet::new();
    for source in &config.sources {
        if source.name.trim().is_empty() {
            return Err(NupinError::ConfigValidation {
                field: "sources".to_string(),
                reason: "every source needs a name".to_string(),
            });
        }
        if !names.insert(source.name.to_lowercase()) {
            return Err(source.invalid("source names must be unique".to_string()));
        }
        // Relative folders are checked again once the config root is known
        if let SourceLocation::Folder(_) = source.location(Utf8Path::new(""))? {
            if source.token_env.is_some() {
                return Err(source.invalid("token-env only applies to url sources".to_string()));
            }
        }
    }

    if let Some(platform) = &config.platform {
        for pattern in &platform.library_names {
            Regex::new(pattern).map_err(|e| NupinError::ConfigValidation {
                field: "platform.library-names".to_string(),
                reason: format!("'{}' is not a valid regular expression: {}", pattern, e),
            })?;
        }
    }

    Ok(())
}

/// Load and parse a nupin.toml file
pub fn load_from_file(path: &Utf8Path) -> ConfigResult<NupinToml> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| NupinError::io(format!("Failed to read {}", path), e))?;

    parse_nupin_toml(&content).map_err(|e| match e {
        NupinError::Serialization { message } => NupinError::Serialization {
            message: format!("In file {}: {}", path, message),
        },
        NupinError::ConfigValidation { field, reason } => NupinError::ConfigValidation {
            field,
            reason: format!("{} (in {})", reason, path),
        },
        other => other,
    })
}
