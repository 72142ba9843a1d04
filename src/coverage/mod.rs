//! Coverage lookup: which service area, if any, covers a visitor's location.

pub mod matcher;
pub mod store;
pub mod types;

pub use matcher::{check_coverage, find_by_coordinate, find_by_text};
pub use store::{CoverageStore, JsonFileStore, StoreError, SupabaseStore};
pub use types::{CoverageArea, CoverageMatch, ServiceProvider};
