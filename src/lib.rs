//! citycache Library
//!
//! Read-through cache of localized city and country names, backed by
//! SQLite and a geocoding provider. Exposed as a library for the binary
//! and for integration tests.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;

// Re-export commonly used types
pub use application::LookupService;
pub use config::load_config;
pub use domain::entities::{CityEntry, CountryEntry, LocalizedCity, Place, PlaceDetails, Prediction, Suggestion};
pub use domain::errors::{LanguageError, LookupError, ProviderError, StoreError};
pub use domain::ports::{CityRepository, CountryRepository, GeocodingProvider};
pub use domain::services::LanguageRegistry;
pub use domain::value_objects::{CountryCode, Language};
