//! City Lookup API Server
//!
//! Read-only HTTP front for the lookup service. Every route takes an
//! optional `lang` query parameter naming a configured language; when it
//! is absent the first configured language is used.

use crate::application::LookupService;
use crate::domain::entities::{CityEntry, CountryEntry, Place, Suggestion};
use crate::domain::errors::{LanguageError, LookupError, ProviderError, StoreError};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Query string shared by the single-language routes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LangQuery {
    #[serde(default)]
    pub lang: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReverseQuery {
    lat: f64,
    lng: f64,
    #[serde(default)]
    lang: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AutocompleteQuery {
    input: String,
    #[serde(default)]
    lang: Option<String>,
}

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub languages: Vec<String>,
}

/// Error body returned by every failing route.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
struct SuggestionsResponse {
    suggestions: Vec<Suggestion>,
    total: usize,
}

#[derive(Debug, Serialize)]
struct CountriesResponse {
    countries: Vec<CountryEntry>,
    total: usize,
}

#[derive(Debug, Serialize)]
struct CitiesResponse {
    cities: Vec<CityEntry>,
    total: usize,
}

/// Lookup failure rendered as an HTTP response.
struct ApiError(LookupError);

impl From<LookupError> for ApiError {
    fn from(err: LookupError) -> Self {
        ApiError(err)
    }
}

impl From<LanguageError> for ApiError {
    fn from(err: LanguageError) -> Self {
        ApiError(err.into())
    }
}

fn status_for(err: &LookupError) -> StatusCode {
    match err {
        LookupError::Language(_) => StatusCode::BAD_REQUEST,
        LookupError::Store(StoreError::InvalidCountryId(_)) => StatusCode::BAD_REQUEST,
        LookupError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        LookupError::Provider(ProviderError::NoPlaceFound) => StatusCode::NOT_FOUND,
        LookupError::Provider(ProviderError::RateLimited) => StatusCode::TOO_MANY_REQUESTS,
        LookupError::Provider(_) => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            tracing::warn!("request failed: {}", self.0);
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Build the API router over a lookup service.
pub fn router(service: Arc<LookupService>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/cities/:placeid", get(city_handler))
        .route("/api/v1/reverse", get(reverse_handler))
        .route("/api/v1/autocomplete", get(autocomplete_handler))
        .route("/api/v1/countries", get(countries_handler))
        .route("/api/v1/countries/:id/cities", get(country_cities_handler))
        .with_state(service)
}

/// API Server for city lookups.
pub struct ApiServer {
    listen_addr: String,
    service: Arc<LookupService>,
}

impl ApiServer {
    pub fn new(listen_addr: String, service: Arc<LookupService>) -> Self {
        Self {
            listen_addr,
            service,
        }
    }

    /// Run the API server until the listener fails.
    pub async fn run(&self) -> anyhow::Result<()> {
        let app = router(self.service.clone())
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http());

        let listener = TcpListener::bind(&self.listen_addr).await?;
        tracing::info!("city lookup API listening on {}", self.listen_addr);

        axum::serve(listener, app).await?;
        Ok(())
    }
}

/// Map an optional `lang` code to its registry index.
fn lang_index(service: &LookupService, lang: Option<&str>) -> Result<usize, LanguageError> {
    match lang {
        None => Ok(0),
        Some(code) => service.languages().position(code),
    }
}

// Handler functions

async fn health_handler(State(service): State<Arc<LookupService>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        languages: service
            .languages()
            .all()
            .iter()
            .map(|l| l.to_string())
            .collect(),
    })
}

async fn city_handler(
    State(service): State<Arc<LookupService>>,
    Path(placeid): Path<String>,
    Query(query): Query<LangQuery>,
) -> ApiResult<Place> {
    let lang = lang_index(&service, query.lang.as_deref())?;
    let city = service.lookup(&placeid, lang).await?;
    Ok(Json(Place { placeid, city }))
}

async fn reverse_handler(
    State(service): State<Arc<LookupService>>,
    Query(query): Query<ReverseQuery>,
) -> ApiResult<Place> {
    let lang = lang_index(&service, query.lang.as_deref())?;
    let place = service.lookup_coordinates(query.lat, query.lng, lang).await?;
    Ok(Json(place))
}

async fn autocomplete_handler(
    State(service): State<Arc<LookupService>>,
    Query(query): Query<AutocompleteQuery>,
) -> ApiResult<SuggestionsResponse> {
    let lang = lang_index(&service, query.lang.as_deref())?;
    let suggestions = service.autocomplete(&query.input, lang).await?;
    let total = suggestions.len();
    Ok(Json(SuggestionsResponse { suggestions, total }))
}

async fn countries_handler(
    State(service): State<Arc<LookupService>>,
    Query(query): Query<LangQuery>,
) -> ApiResult<CountriesResponse> {
    let lang = lang_index(&service, query.lang.as_deref())?;
    let countries = service.countries(lang).await?;
    let total = countries.len();
    Ok(Json(CountriesResponse { countries, total }))
}

async fn country_cities_handler(
    State(service): State<Arc<LookupService>>,
    Path(id): Path<String>,
    Query(query): Query<LangQuery>,
) -> ApiResult<CitiesResponse> {
    let lang = lang_index(&service, query.lang.as_deref())?;
    let cities = service.country_cities(&id, lang).await?;
    let total = cities.len();
    Ok(Json(CitiesResponse { cities, total }))
}
