//! Read-only sources of coverage areas.
//!
//! The matcher never talks to a store directly; callers fetch the active list
//! and hand it over. Fetch failures are the caller's to report.

use super::types::{default_active, CoverageArea, ServiceProvider};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("network error: {0}")]
    Network(String),
    #[error("backend returned HTTP {0}")]
    Status(u16),
    #[error("invalid coverage payload: {0}")]
    InvalidPayload(String),
    #[error("cannot read coverage file {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("no coverage source configured; set SUPABASE_URL and SUPABASE_ANON_KEY or COVERAGE_AREAS_FILE")]
    NotConfigured,
}

impl From<ureq::Error> for StoreError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, _) => Self::Status(code),
            ureq::Error::Transport(t) => Self::Network(t.to_string()),
        }
    }
}

/// Supplies the currently active coverage areas and who serves them.
pub trait CoverageStore: Send + Sync {
    fn active_areas(&self) -> Result<Vec<CoverageArea>, StoreError>;

    /// Operators linked to `area_id` through an active link. An unknown area
    /// has no providers.
    fn providers_for_area(&self, area_id: &str) -> Result<Vec<ServiceProvider>, StoreError>;
}

/// One row of `coverage_area_service_providers`, with the provider embedded.
///
/// PostgREST returns only the embedded provider for the select used below;
/// file rows carry the link columns too.
#[derive(Debug, Deserialize)]
struct ProviderLink {
    #[serde(default)]
    coverage_area_id: Option<String>,
    #[serde(default = "default_active")]
    is_active: bool,
    #[serde(default)]
    service_providers: Option<ServiceProvider>,
}

// ─── Supabase (PostgREST) ───────────────────────────────────────

/// The hosted backend's `coverage_areas` and `coverage_area_service_providers`
/// tables, read through PostgREST.
pub struct SupabaseStore {
    base_url: String,
    anon_key: String,
    agent: ureq::Agent,
}

impl SupabaseStore {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    fn areas_url(&self) -> String {
        format!("{}/rest/v1/coverage_areas", self.base_url)
    }

    fn links_url(&self) -> String {
        format!("{}/rest/v1/coverage_area_service_providers", self.base_url)
    }

    fn get(&self, url: &str) -> ureq::Request {
        self.agent
            .get(url)
            .set("apikey", &self.anon_key)
            .set("Authorization", &format!("Bearer {}", self.anon_key))
            .set("Accept", "application/json")
    }
}

impl CoverageStore for SupabaseStore {
    fn active_areas(&self) -> Result<Vec<CoverageArea>, StoreError> {
        let areas: Vec<CoverageArea> = self
            .get(&self.areas_url())
            .query("select", "*")
            .query("is_active", "eq.true")
            .query("order", "id.asc")
            .call()?
            .into_json()
            .map_err(|e| StoreError::InvalidPayload(e.to_string()))?;

        debug!(count = areas.len(), "fetched coverage areas from backend");
        Ok(areas)
    }

    fn providers_for_area(&self, area_id: &str) -> Result<Vec<ServiceProvider>, StoreError> {
        let links: Vec<ProviderLink> = self
            .get(&self.links_url())
            .query("select", "service_providers(id,name,description)")
            .query("coverage_area_id", &format!("eq.{}", area_id))
            .query("is_active", "eq.true")
            .call()?
            .into_json()
            .map_err(|e| StoreError::InvalidPayload(e.to_string()))?;

        // Links whose provider row is gone embed as null.
        let providers: Vec<ServiceProvider> = links.into_iter().filter_map(|l| l.service_providers).collect();
        debug!(area_id, count = providers.len(), "fetched service providers from backend");
        Ok(providers)
    }
}

// ─── Local JSON file ────────────────────────────────────────────

/// A JSON array of `coverage_areas` rows on disk, with an optional second file
/// of `coverage_area_service_providers` rows. Re-read on every call.
pub struct JsonFileStore {
    path: PathBuf,
    providers_path: Option<PathBuf>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            providers_path: None,
        }
    }

    pub fn with_providers_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.providers_path = Some(path.into());
        self
    }
}

fn read_rows<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let data = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|e| StoreError::InvalidPayload(e.to_string()))
}

impl CoverageStore for JsonFileStore {
    fn active_areas(&self) -> Result<Vec<CoverageArea>, StoreError> {
        let rows: Vec<CoverageArea> = read_rows(&self.path)?;

        let areas: Vec<CoverageArea> = rows.into_iter().filter(|a| a.active).collect();
        debug!(path = %self.path.display(), count = areas.len(), "loaded coverage areas from file");
        Ok(areas)
    }

    /// Without a providers file no area has providers.
    fn providers_for_area(&self, area_id: &str) -> Result<Vec<ServiceProvider>, StoreError> {
        let Some(path) = &self.providers_path else {
            return Ok(Vec::new());
        };
        let links: Vec<ProviderLink> = read_rows(path)?;

        let providers: Vec<ServiceProvider> = links
            .into_iter()
            .filter(|l| l.is_active && l.coverage_area_id.as_deref() == Some(area_id))
            .filter_map(|l| l.service_providers)
            .collect();
        debug!(path = %path.display(), area_id, count = providers.len(), "loaded service providers from file");
        Ok(providers)
    }
}
