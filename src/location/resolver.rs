//! Location resolver — orchestrates the reverse-geocoding fallback chain.
//!
//! Flow: remote providers in order (Nominatim → BigDataCloud) → gazetteer.
//! Providers are tried strictly one after another; the first usable answer wins.

use super::gazetteer::Gazetteer;
use super::providers::{self, BigDataCloud, Nominatim, ReverseGeocoder};
use super::types::LocationResult;
use crate::geo::Coordinate;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Reverse geocoder with its fallback pipeline. Safe to share across threads.
pub struct LocationResolver {
    providers: Vec<Box<dyn ReverseGeocoder>>,
    gazetteer: Gazetteer,
    offline: bool,
}

impl LocationResolver {
    /// Resolver against the public Nominatim and BigDataCloud endpoints.
    pub fn new() -> Self {
        Self::with_endpoints(
            providers::NOMINATIM_URL,
            providers::BIGDATACLOUD_URL,
            providers::DEFAULT_TIMEOUT,
            providers::DEFAULT_USER_AGENT,
        )
    }

    /// Resolver against the given endpoints, each request bounded by `timeout`.
    pub fn with_endpoints(
        nominatim_url: &str,
        bigdatacloud_url: &str,
        timeout: Duration,
        user_agent: &str,
    ) -> Self {
        let agent = providers::http_agent(timeout, user_agent);
        Self::with_providers(vec![
            Box::new(Nominatim::new(nominatim_url, agent.clone())),
            Box::new(BigDataCloud::new(bigdatacloud_url, agent)),
        ])
    }

    /// Resolver with an explicit provider chain (for testing or custom stacks).
    pub fn with_providers(providers: Vec<Box<dyn ReverseGeocoder>>) -> Self {
        Self {
            providers,
            gazetteer: Gazetteer::builtin(),
            offline: false,
        }
    }

    /// Swap the reference table used for the final fallback.
    pub fn with_gazetteer(mut self, gazetteer: Gazetteer) -> Self {
        self.gazetteer = gazetteer;
        self
    }

    /// Set offline mode — skip network calls.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn gazetteer(&self) -> &Gazetteer {
        &self.gazetteer
    }

    /// Resolve `coord` to a place name. Always returns a result; provider failures
    /// demote to the next step and end at the gazetteer.
    pub fn reverse_geocode(&self, coord: Coordinate) -> LocationResult {
        if !self.offline {
            for provider in &self.providers {
                match provider.reverse(coord) {
                    Ok(loc) => {
                        debug!(provider = provider.name(), %coord, confidence = %loc.confidence, "reverse geocoded");
                        return loc;
                    }
                    Err(e) => {
                        warn!(provider = provider.name(), %coord, error = %e, "reverse geocoding failed, falling back");
                    }
                }
            }
        }

        let loc = self.gazetteer.locate(coord);
        info!(%coord, gazetteer = self.gazetteer.version(), address = %loc.formatted_address, "using gazetteer fallback");
        loc
    }
}

impl Default for LocationResolver {
    fn default() -> Self {
        Self::new()
    }
}
