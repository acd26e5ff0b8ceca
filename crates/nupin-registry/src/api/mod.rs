//! HTTP feed response types

use serde::{Deserialize, Serialize};

/// Version listing served at `{base}/{id}/index.json`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VersionIndexResponse {
    /// Published version strings, in any order
    #[serde(default)]
    pub versions: Vec<String>,
}
