use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::coverage::{check_coverage, CoverageMatch, ServiceProvider, StoreError};
use crate::geo::{Coordinate, CoordinateError};
use crate::location::{Gazetteer, LocationResult};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub(crate) error: String,
    pub(crate) code: u16,
}

#[derive(Debug)]
pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

/// Successful payload stamped with the time it was produced.
#[derive(Serialize)]
pub struct Stamped<T: Serialize> {
    #[serde(flatten)]
    pub body: T,
    pub resolved_at: DateTime<Utc>,
}

fn stamped<T: Serialize>(body: T) -> Json<Stamped<T>> {
    Json(Stamped {
        body,
        resolved_at: Utc::now(),
    })
}

// ─── GET /health ─────────────────────────────────────────────────

pub async fn health() -> &'static str {
    "ok"
}

// ─── GET /api/reverse ────────────────────────────────────────────

/// Coordinates arrive as raw strings so malformed numbers get a JSON 400
/// instead of the extractor's plain-text rejection.
#[derive(Deserialize, Default)]
pub struct ReverseQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
    /// `"lat,lng"` in one parameter.
    pub coordinates: Option<String>,
}

pub async fn reverse(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReverseQuery>,
) -> Result<Json<Stamped<LocationResult>>, ApiError> {
    let start = Instant::now();

    let coord = query_coordinate(params.lat, params.lon, params.coordinates)?.ok_or_else(|| {
        api_error(
            StatusCode::BAD_REQUEST,
            "Provide 'lat' and 'lon' or 'coordinates' parameters",
        )
    })?;

    // Provider calls block on I/O.
    let loc = tokio::task::spawn_blocking(move || state.resolver.reverse_geocode(coord))
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    info!(
        %coord,
        confidence = %loc.confidence,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "GET /api/reverse"
    );

    Ok(stamped(loc))
}

// ─── GET /api/coverage ───────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct CoverageQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub coordinates: Option<String>,
    pub location: Option<String>,
}

pub async fn coverage(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CoverageQuery>,
) -> Result<Json<Stamped<CoverageMatch>>, ApiError> {
    let start = Instant::now();

    let coord = query_coordinate(params.lat, params.lon, params.coordinates)?;
    let location = non_blank(params.location);

    if coord.is_none() && location.is_none() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Provide 'lat'+'lon', 'coordinates' or 'location' parameters",
        ));
    }
    require_store(&state)?;

    let result = tokio::task::spawn_blocking(move || {
        let store = state.store.as_ref().ok_or(StoreError::NotConfigured)?;
        let areas = store.active_areas()?;
        Ok::<_, StoreError>(check_coverage(coord, location.as_deref(), &areas))
    })
    .await
    .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let found = result.map_err(|e| {
        warn!(error = %e, "coverage areas unavailable");
        api_error(
            StatusCode::BAD_GATEWAY,
            format!("Could not load coverage areas, please try again: {}", e),
        )
    })?;

    info!(
        found = found.found,
        area = found.area.as_ref().map(|a| a.name.as_str()).unwrap_or("-"),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "GET /api/coverage"
    );

    Ok(stamped(found))
}

// ─── GET /api/coverage/{id}/providers ────────────────────────────

#[derive(Serialize)]
pub struct AreaProviders {
    pub coverage_area_id: String,
    pub providers: Vec<ServiceProvider>,
}

pub async fn providers(
    State(state): State<Arc<AppState>>,
    Path(area_id): Path<String>,
) -> Result<Json<Stamped<AreaProviders>>, ApiError> {
    let start = Instant::now();

    let area_id = area_id.trim().to_string();
    if area_id.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Coverage area id is empty"));
    }
    require_store(&state)?;

    let lookup_id = area_id.clone();
    let result = tokio::task::spawn_blocking(move || {
        let store = state.store.as_ref().ok_or(StoreError::NotConfigured)?;
        store.providers_for_area(&lookup_id)
    })
    .await
    .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let providers = result.map_err(|e| {
        warn!(area_id = %area_id, error = %e, "service providers unavailable");
        api_error(
            StatusCode::BAD_GATEWAY,
            format!("Could not load service providers, please try again: {}", e),
        )
    })?;

    info!(
        area_id = %area_id,
        count = providers.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "GET /api/coverage/{{id}}/providers"
    );

    Ok(stamped(AreaProviders {
        coverage_area_id: area_id,
        providers,
    }))
}

// ─── GET /api/gazetteer ──────────────────────────────────────────

pub async fn gazetteer(State(state): State<Arc<AppState>>) -> Json<Gazetteer> {
    Json(state.resolver.gazetteer().clone())
}

// ─── Helpers ─────────────────────────────────────────────────────

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn require_store(state: &AppState) -> Result<(), ApiError> {
    if state.store.is_none() {
        return Err(api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "No coverage source configured",
        ));
    }
    Ok(())
}

/// Either `coordinates=lat,lng` or a `lat`/`lon` pair; blank values count as absent.
fn query_coordinate(
    lat: Option<String>,
    lon: Option<String>,
    coordinates: Option<String>,
) -> Result<Option<Coordinate>, ApiError> {
    match (non_blank(lat), non_blank(lon), non_blank(coordinates)) {
        (None, None, Some(text)) => text.parse::<Coordinate>().map(Some).map_err(invalid_coordinates),
        (_, _, Some(_)) => Err(api_error(
            StatusCode::BAD_REQUEST,
            "Give either 'coordinates' or 'lat'+'lon', not both",
        )),
        (Some(lat), Some(lon), None) => {
            let lat = parse_number("lat", &lat)?;
            let lon = parse_number("lon", &lon)?;
            Coordinate::new(lat, lon).map(Some).map_err(invalid_coordinates)
        }
        (None, None, None) => Ok(None),
        _ => Err(api_error(
            StatusCode::BAD_REQUEST,
            "'lat' and 'lon' must be given together",
        )),
    }
}

fn invalid_coordinates(e: CoordinateError) -> ApiError {
    api_error(
        StatusCode::BAD_REQUEST,
        format!("Invalid coordinates ({}). Lat: -90..90, Lon: -180..180", e),
    )
}

fn parse_number(name: &str, raw: &str) -> Result<f64, ApiError> {
    raw.parse::<f64>().map_err(|_| {
        api_error(
            StatusCode::BAD_REQUEST,
            format!("'{}' must be a number, got '{}'", name, raw),
        )
    })
}
