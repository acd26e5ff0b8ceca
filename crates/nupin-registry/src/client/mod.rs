//! HTTP package feed
//!
//! The server exposes the flat layout over plain GET requests:
//!
//! ```text
//! {base}/{id}/index.json                 {"versions": ["1.0.0", ...]}
//! {base}/{id}/{version}/record.json      package record
//! {base}/{id}/{version}/package.tgz      package archive
//! ```
//!
//! Identifiers are lowercased in request paths and versions keep their exact
//! text. Every path segment is percent-encoded.

use std::time::Duration;

use nupin_core::utils::layout::{ARCHIVE_FILE, RECORD_FILE};
use nupin_core::{package_key, validate_package_id, NupinError, PackageRecord, Version};
use reqwest::blocking::{Client, ClientBuilder, Response};
use reqwest::StatusCode;
use tracing::{debug, warn};
use url::Url;

use crate::api::VersionIndexResponse;
use crate::cache::MetadataCache;
use crate::feed::PackageFeed;
use crate::RegistryResult;

/// Authentication configuration for feed access
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Bearer token for authentication
    pub token: Option<String>,
}

/// Package feed served over HTTP
#[derive(Debug)]
pub struct HttpFeed {
    name: String,
    base_url: Url,
    client: Client,
    index_cache: MetadataCache,
}

impl HttpFeed {
    pub fn new(name: impl Into<String>, base_url: Url) -> RegistryResult<Self> {
        Self::with_auth(name, base_url, AuthConfig::default())
    }

    /// Create a feed that sends a bearer token with every request
    pub fn with_auth(
        name: impl Into<String>,
        base_url: Url,
        auth: AuthConfig,
    ) -> RegistryResult<Self> {
        let mut builder = ClientBuilder::new()
            .timeout(Duration::from_secs(30))
            .gzip(true)
            .user_agent(concat!("nupin/", env!("CARGO_PKG_VERSION")));

        if let Some(token) = auth.token {
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", token)
                    .parse()
                    .map_err(|e| NupinError::transport("Invalid auth token".to_string(), e))?,
            );
            builder = builder.default_headers(headers);
        }

        let client = builder
            .build()
            .map_err(|e| NupinError::transport("Failed to create HTTP client".to_string(), e))?;

        Ok(Self {
            name: name.into(),
            base_url,
            client,
            index_cache: MetadataCache::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, segments: &[&str]) -> RegistryResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| NupinError::ConfigValidation {
                field: format!("sources.{}", self.name),
                reason: format!("{} cannot be used as a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn index_url(&self, id: &str) -> RegistryResult<Url> {
        validate_package_id(id)?;
        self.url(&[&package_key(id), "index.json"])
    }

    fn version_url(&self, id: &str, version: &Version, file: &str) -> RegistryResult<Url> {
        validate_package_id(id)?;
        self.url(&[&package_key(id), &version.to_string(), file])
    }

    fn get(&self, url: &Url, what: &str) -> RegistryResult<Response> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| NupinError::transport(format!("Failed to fetch {}", url), e))?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(NupinError::not_found(what, self.location())),
            status => Err(NupinError::Transport {
                message: format!("{} returned status {}", url, status),
                source: None,
            }),
        }
    }

    fn location(&self) -> String {
        format!("feed '{}' ({})", self.name, self.base_url)
    }
}

impl PackageFeed for HttpFeed {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_versions(&self, id: &str) -> RegistryResult<Vec<Version>> {
        if let Some(versions) = self.index_cache.get(id) {
            return Ok(versions);
        }

        let url = self.index_url(id)?;
        let index: VersionIndexResponse = self
            .get(&url, id)?
            .json()
            .map_err(|e| NupinError::transport(format!("Failed to parse {}", url), e))?;

        let mut versions: Vec<Version> = index
            .versions
            .iter()
            .filter_map(|text| match text.parse() {
                Ok(version) => Some(version),
                Err(e) => {
                    warn!("Ignoring version '{}' of {} from '{}': {}", text, id, self.name, e);
                    None
                },
            })
            .collect();
        versions.sort();

        self.index_cache.insert(id, versions.clone());
        Ok(versions)
    }

    fn fetch_record(&self, id: &str, version: &Version) -> RegistryResult<PackageRecord> {
        let url = self.version_url(id, version, RECORD_FILE)?;
        let text = self
            .get(&url, &format!("{} {}", id, version))?
            .text()
            .map_err(|e| NupinError::transport(format!("Failed to read {}", url), e))?;

        let record: PackageRecord = serde_json::from_str(&text)
            .map_err(|e| NupinError::serialization(format!("{}: {}", url, e)))?;
        if record.key() != package_key(id) || record.version != *version {
            return Err(NupinError::serialization(format!(
                "{} describes {} instead of {} {}",
                url, record, id, version
            )));
        }
        Ok(record)
    }

    fn fetch_archive(&self, id: &str, version: &Version) -> RegistryResult<Vec<u8>> {
        let url = self.version_url(id, version, ARCHIVE_FILE)?;
        let bytes = self
            .get(&url, &format!("{} {}", id, version))?
            .bytes()
            .map_err(|e| NupinError::transport(format!("Failed to download {}", url), e))?;
        Ok(bytes.to_vec())
    }
}
