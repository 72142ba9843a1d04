//! Remote reverse-geocoding providers: Nominatim and BigDataCloud.
//!
//! Each provider turns a coordinate into a `LocationResult` or a `GeocodeError`.
//! Payload parsing is kept separate from transport so it can be tested offline.

use super::types::{non_blank, Confidence, GeocodeError, LocationResult};
use crate::geo::Coordinate;
use serde::Deserialize;
use std::time::Duration;

pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
pub const BIGDATACLOUD_URL: &str = "https://api.bigdatacloud.net";
pub const DEFAULT_USER_AGENT: &str = "Loop-ISP-App/1.0";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// One step of the reverse-geocoding chain.
pub trait ReverseGeocoder: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    fn reverse(&self, coord: Coordinate) -> Result<LocationResult, GeocodeError>;
}

/// Build a blocking HTTP agent whose every request is bounded by `timeout`.
pub fn http_agent(timeout: Duration, user_agent: &str) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
}

// ─── Nominatim ──────────────────────────────────────────────────

#[derive(Deserialize, Debug, Default)]
struct NominatimReverse {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: Option<NominatimAddress>,
}

#[derive(Deserialize, Debug, Default)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
    province: Option<String>,
    country: Option<String>,
}

/// OpenStreetMap Nominatim `/reverse`. Precise: results are `Confidence::High`.
pub struct Nominatim {
    base_url: String,
    agent: ureq::Agent,
}

impl Nominatim {
    pub fn new(base_url: impl Into<String>, agent: ureq::Agent) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            agent,
        }
    }
}

impl ReverseGeocoder for Nominatim {
    fn name(&self) -> &str {
        "nominatim"
    }

    fn reverse(&self, coord: Coordinate) -> Result<LocationResult, GeocodeError> {
        let url = format!("{}/reverse", self.base_url);
        let body: serde_json::Value = self
            .agent
            .get(&url)
            .query("format", "json")
            .query("lat", &coord.lat.to_string())
            .query("lon", &coord.lon.to_string())
            .query("zoom", "10")
            .query("addressdetails", "1")
            .call()?
            .into_json()
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

        parse_nominatim(body)
    }
}

pub(crate) fn parse_nominatim(body: serde_json::Value) -> Result<LocationResult, GeocodeError> {
    let r: NominatimReverse =
        serde_json::from_value(body).map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

    let display_name = non_blank(r.display_name).ok_or(GeocodeError::NoUsableResult)?;
    let address = r.address.unwrap_or_default();

    Ok(LocationResult {
        formatted_address: display_name,
        city: non_blank(address.city)
            .or_else(|| non_blank(address.town))
            .or_else(|| non_blank(address.village)),
        province: non_blank(address.state).or_else(|| non_blank(address.province)),
        country: non_blank(address.country),
        confidence: Confidence::High,
    })
}

// ─── BigDataCloud ───────────────────────────────────────────────

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct BigDataCloudReverse {
    #[serde(default)]
    locality: Option<String>,
    #[serde(default)]
    principal_subdivision: Option<String>,
    #[serde(default)]
    country_name: Option<String>,
}

/// BigDataCloud client-side reverse geocoding. Coarse: results are `Confidence::Medium`.
pub struct BigDataCloud {
    base_url: String,
    agent: ureq::Agent,
}

impl BigDataCloud {
    pub fn new(base_url: impl Into<String>, agent: ureq::Agent) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            agent,
        }
    }
}

impl ReverseGeocoder for BigDataCloud {
    fn name(&self) -> &str {
        "bigdatacloud"
    }

    fn reverse(&self, coord: Coordinate) -> Result<LocationResult, GeocodeError> {
        let url = format!("{}/data/reverse-geocode-client", self.base_url);
        let body: serde_json::Value = self
            .agent
            .get(&url)
            .query("latitude", &coord.lat.to_string())
            .query("longitude", &coord.lon.to_string())
            .query("localityLanguage", "en")
            .call()?
            .into_json()
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

        parse_bigdatacloud(body)
    }
}

pub(crate) fn parse_bigdatacloud(body: serde_json::Value) -> Result<LocationResult, GeocodeError> {
    let r: BigDataCloudReverse =
        serde_json::from_value(body).map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

    let locality = non_blank(r.locality).ok_or(GeocodeError::NoUsableResult)?;
    let province = non_blank(r.principal_subdivision);
    let country = non_blank(r.country_name);

    let formatted_address = [Some(&locality), province.as_ref(), country.as_ref()]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    Ok(LocationResult {
        formatted_address,
        city: Some(locality),
        province,
        country,
        confidence: Confidence::Medium,
    })
}
