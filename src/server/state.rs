use crate::coverage::CoverageStore;
use crate::location::LocationResolver;

pub struct AppState {
    pub resolver: LocationResolver,
    pub store: Option<Box<dyn CoverageStore>>,
}
