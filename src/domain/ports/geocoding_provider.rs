//! Geocoding Provider Port
//!
//! Defines the interface for the external geocoding service consulted on
//! a cache miss.

use crate::domain::entities::{PlaceDetails, Prediction};
use crate::domain::errors::ProviderError;
use crate::domain::value_objects::Language;
use async_trait::async_trait;

/// External geocoding provider.
///
/// This is an outbound port that abstracts the provider's HTTP API.
/// Every call is a single request bounded by the adapter's timeout;
/// nothing is retried.
#[async_trait]
pub trait GeocodingProvider: Send + Sync {
    /// Resolve coordinates to the place id of the enclosing locality.
    async fn reverse_geocode(&self, lat: f64, lng: f64) -> Result<String, ProviderError>;

    /// City candidates for free-text input, in provider order.
    async fn autocomplete(
        &self,
        input: &str,
        lang: &Language,
    ) -> Result<Vec<Prediction>, ProviderError>;

    /// Country and city details of a place in `lang`.
    async fn place_details(
        &self,
        placeid: &str,
        lang: &Language,
    ) -> Result<PlaceDetails, ProviderError>;
}
