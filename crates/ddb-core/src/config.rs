//! Configuration types and loading
//!
//! Process-level settings for a data browser session. The schema itself
//! (models, fields, types) is not configured here; it is served by the
//! backend and loaded by `ddb-schema`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::DdbError;
use crate::result::DdbResult;

/// Row limit used when a model is first selected
pub const DEFAULT_LIMIT: u32 = 1000;

/// Settings for a browsing session
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Page origin prefixed to every generated link (e.g. `https://example.com`)
    pub origin: String,
    /// Location of the schema JSON document
    pub schema_path: Option<PathBuf>,
    /// Row limit for freshly created queries
    pub default_limit: u32,
    /// `tracing` filter directive used by binaries
    pub log_filter: String,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            origin: "http://localhost:8000".to_string(),
            schema_path: None,
            default_limit: DEFAULT_LIMIT,
            log_filter: "info,ddb_query=debug".to_string(),
        }
    }
}

impl BrowserSettings {
    /// Load settings from environment variables
    ///
    /// Unset variables keep their defaults. A limit that does not parse, or
    /// parses to zero, is a configuration error.
    pub fn from_env() -> DdbResult<Self> {
        let mut settings = Self::default();

        if let Ok(origin) = std::env::var("DDB_ORIGIN") {
            settings.origin = origin;
        }
        if let Ok(path) = std::env::var("DDB_SCHEMA_PATH") {
            settings.schema_path = Some(PathBuf::from(path));
        }
        if let Ok(limit) = std::env::var("DDB_DEFAULT_LIMIT") {
            settings.default_limit = parse_limit(&limit)?;
        }
        if let Ok(filter) = std::env::var("DDB_LOG") {
            settings.log_filter = filter;
        }

        Ok(settings)
    }

    /// Load settings from a file, overlaid with `DDB_`-prefixed environment variables
    ///
    /// The file format is picked from the extension (toml, json, yaml, ...).
    pub fn from_file(path: &Path) -> DdbResult<Self> {
        let settings: Self = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("DDB").try_parsing(true))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| DdbError::Config(format!("{}: {}", path.display(), e)))?;

        if settings.default_limit == 0 {
            return Err(DdbError::Config("default_limit must be at least 1".into()));
        }
        Ok(settings)
    }

    /// Origin with any trailing slash removed
    pub fn origin(&self) -> &str {
        self.origin.trim_end_matches('/')
    }
}

fn parse_limit(raw: &str) -> DdbResult<u32> {
    match raw.trim().parse::<u32>() {
        Ok(limit) if limit >= 1 => Ok(limit),
        _ => Err(DdbError::Config(format!(
            "DDB_DEFAULT_LIMIT must be a positive integer, got {:?}",
            raw
        ))),
    }
}
