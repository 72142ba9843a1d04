//! Reverse geocoding for captured visitor locations.
//!
//! Resolves a coordinate to a display address through remote providers,
//! ending at a built-in gazetteer so a result is always available.

pub mod gazetteer;
pub mod providers;
pub mod resolver;
pub mod types;

pub use gazetteer::{Gazetteer, GazetteerError, ReferencePoint};
pub use providers::{BigDataCloud, Nominatim, ReverseGeocoder};
pub use resolver::LocationResolver;
pub use types::{Confidence, GeocodeError, LocationResult};
