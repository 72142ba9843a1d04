//! Runtime settings, from command-line flags or environment variables.

use crate::coverage::{CoverageStore, JsonFileStore, StoreError, SupabaseStore};
use crate::location::providers::{BIGDATACLOUD_URL, DEFAULT_USER_AGENT, NOMINATIM_URL};
use crate::location::{Gazetteer, GazetteerError, LocationResolver};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// Nominatim base URL (first reverse-geocoding step).
    #[arg(long, env = "NOMINATIM_URL", default_value = NOMINATIM_URL, global = true)]
    pub nominatim_url: String,

    /// BigDataCloud base URL (second reverse-geocoding step).
    #[arg(long, env = "BIGDATACLOUD_URL", default_value = BIGDATACLOUD_URL, global = true)]
    pub bigdatacloud_url: String,

    /// Per-request timeout for remote calls, in seconds.
    #[arg(long, env = "GEOCODE_TIMEOUT_SECS", default_value_t = 5, global = true)]
    pub timeout_secs: u64,

    /// User-Agent sent to geocoding services.
    #[arg(long, env = "GEOCODE_USER_AGENT", default_value = DEFAULT_USER_AGENT, global = true)]
    pub user_agent: String,

    /// Replacement gazetteer JSON file for the offline fallback.
    #[arg(long, env = "GAZETTEER_FILE", global = true)]
    pub gazetteer_file: Option<PathBuf>,

    /// Supabase project URL.
    #[arg(long, env = "SUPABASE_URL", global = true)]
    pub supabase_url: Option<String>,

    /// Supabase anon key.
    #[arg(long, env = "SUPABASE_ANON_KEY", hide_env_values = true, global = true)]
    pub supabase_anon_key: Option<String>,

    /// Read coverage areas from a local JSON file instead of Supabase.
    #[arg(long, env = "COVERAGE_AREAS_FILE", global = true)]
    pub areas_file: Option<PathBuf>,

    /// Area-to-provider links for the file store (`coverage_area_service_providers` rows).
    #[arg(long, env = "COVERAGE_PROVIDERS_FILE", global = true)]
    pub providers_file: Option<PathBuf>,

    /// Offline mode: skip remote geocoding, use the gazetteer only.
    #[arg(long, global = true)]
    pub offline: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            nominatim_url: NOMINATIM_URL.to_string(),
            bigdatacloud_url: BIGDATACLOUD_URL.to_string(),
            timeout_secs: 5,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            gazetteer_file: None,
            supabase_url: None,
            supabase_anon_key: None,
            areas_file: None,
            providers_file: None,
            offline: false,
        }
    }
}

impl Settings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn resolver(&self) -> Result<LocationResolver, GazetteerError> {
        let mut resolver = LocationResolver::with_endpoints(
            &self.nominatim_url,
            &self.bigdatacloud_url,
            self.timeout(),
            &self.user_agent,
        );
        if let Some(path) = &self.gazetteer_file {
            let gazetteer = Gazetteer::from_json_file(path)?;
            info!(path = %path.display(), version = gazetteer.version(), "loaded gazetteer");
            resolver = resolver.with_gazetteer(gazetteer);
        }
        resolver.set_offline(self.offline);
        Ok(resolver)
    }

    /// The coverage source: a local file wins over Supabase when both are set.
    pub fn store(&self) -> Result<Box<dyn CoverageStore>, StoreError> {
        if let Some(path) = &self.areas_file {
            let mut store = JsonFileStore::new(path.clone());
            if let Some(links) = &self.providers_file {
                store = store.with_providers_file(links.clone());
            }
            return Ok(Box::new(store));
        }
        match (&self.supabase_url, &self.supabase_anon_key) {
            (Some(url), Some(key)) if !url.is_empty() && !key.is_empty() => {
                Ok(Box::new(SupabaseStore::new(url.clone(), key.clone(), self.timeout())))
            }
            _ => Err(StoreError::NotConfigured),
        }
    }
}
