//! Google Maps Geocoding Provider
//!
//! Implements GeocodingProvider over the Google Geocoding and Places
//! HTTP APIs.

use crate::domain::entities::{PlaceDetails, Prediction};
use crate::domain::errors::ProviderError;
use crate::domain::ports::GeocodingProvider;
use crate::domain::value_objects::Language;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Default base URL of the Google Maps web services.
pub const GOOGLE_MAPS_BASE_URL: &str = "https://maps.googleapis.com/maps/api";

/// Configuration for the Google Maps client.
#[derive(Clone)]
pub struct GoogleConfig {
    /// API key sent with every request
    pub api_key: String,
    /// Base URL (override to point at a mock server)
    pub base_url: String,
    /// Timeout applied to each request
    pub timeout: Duration,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: GOOGLE_MAPS_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl std::fmt::Debug for GoogleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct AddressComponent {
    long_name: String,
    short_name: String,
    #[serde(default)]
    types: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    place_id: String,
}

#[derive(Debug, Deserialize)]
struct AutocompleteResponse {
    status: String,
    #[serde(default)]
    predictions: Vec<PredictionBody>,
}

#[derive(Debug, Deserialize)]
struct PredictionBody {
    place_id: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,
    result: Option<DetailsResult>,
}

#[derive(Debug, Deserialize)]
struct DetailsResult {
    #[serde(default)]
    address_components: Vec<AddressComponent>,
    #[serde(default)]
    formatted_address: String,
}

/// Google Maps geocoding provider.
pub struct GoogleGeocodingProvider {
    config: GoogleConfig,
    client: reqwest::Client,
}

impl GoogleGeocodingProvider {
    /// Create a provider; the timeout is baked into the HTTP client.
    pub fn new(config: GoogleConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Transport(Box::new(e)))?;
        Ok(Self { config, client })
    }

    /// GET a JSON endpoint and decode it. HTTP-level failures only;
    /// the provider's own `status` field is checked by the caller.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        tracing::debug!("provider request {}", path);

        let response = self
            .client
            .get(&url)
            .query(query)
            .query(&[("key", self.config.api_key.as_str())])
            .send()
            .await
            .map_err(|e| ProviderError::Transport(Box::new(e)))?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::Transport(Box::new(e)))
    }
}

/// Map a Google `status` string to success or a provider error.
fn check_status(status: &str) -> Result<(), ProviderError> {
    match status {
        "OK" => Ok(()),
        "ZERO_RESULTS" | "NOT_FOUND" => Err(ProviderError::NoPlaceFound),
        "OVER_QUERY_LIMIT" => Err(ProviderError::RateLimited),
        other => Err(ProviderError::Unhandled(other.to_string())),
    }
}

/// First component carrying `kind`, short or long form.
fn component<'a>(components: &'a [AddressComponent], kind: &str, short: bool) -> Option<&'a str> {
    components
        .iter()
        .find(|c| c.types.iter().any(|t| t == kind))
        .map(|c| {
            if short {
                c.short_name.as_str()
            } else {
                c.long_name.as_str()
            }
        })
}

fn details_from(result: DetailsResult) -> PlaceDetails {
    let components = &result.address_components;
    PlaceDetails {
        country_code: component(components, "country", true).unwrap_or_default().to_string(),
        country_name: component(components, "country", false).unwrap_or_default().to_string(),
        city_name: component(components, "locality", true).unwrap_or_default().to_string(),
        address: result.formatted_address,
    }
}

#[async_trait]
impl GeocodingProvider for GoogleGeocodingProvider {
    async fn reverse_geocode(&self, lat: f64, lng: f64) -> Result<String, ProviderError> {
        let latlng = format!("{:.6},{:.6}", lat, lng);
        let body: GeocodeResponse = self
            .get_json(
                "/geocode/json",
                &[("result_type", "locality"), ("latlng", latlng.as_str())],
            )
            .await?;

        check_status(&body.status)?;
        body.results
            .into_iter()
            .next()
            .map(|r| r.place_id)
            .ok_or(ProviderError::NoPlaceFound)
    }

    async fn autocomplete(
        &self,
        input: &str,
        lang: &Language,
    ) -> Result<Vec<Prediction>, ProviderError> {
        let body: AutocompleteResponse = self
            .get_json(
                "/place/autocomplete/json",
                &[
                    ("types", "(cities)"),
                    ("language", lang.as_str()),
                    ("input", input),
                ],
            )
            .await?;

        check_status(&body.status)?;
        Ok(body
            .predictions
            .into_iter()
            .map(|p| Prediction::new(p.place_id, p.description))
            .collect())
    }

    async fn place_details(
        &self,
        placeid: &str,
        lang: &Language,
    ) -> Result<PlaceDetails, ProviderError> {
        let body: DetailsResponse = self
            .get_json(
                "/place/details/json",
                &[("placeid", placeid), ("language", lang.as_str())],
            )
            .await?;

        check_status(&body.status)?;
        body.result.map(details_from).ok_or(ProviderError::NoPlaceFound)
    }
}
