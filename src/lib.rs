//! Coverage resolution for the ISP onboarding flow.
//!
//! - [`geo`]: coordinates and haversine distance.
//! - [`location`]: reverse geocoding with a remote fallback chain and a local gazetteer.
//! - [`coverage`]: matching a location to an active service coverage area.

pub mod config;
pub mod coverage;
pub mod geo;
pub mod location;
pub mod server;

#[cfg(test)]
pub(crate) mod test_support;

pub use geo::{distance, Coordinate};
