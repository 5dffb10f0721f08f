//! Domain Entities - Core business objects
//!
//! These entities represent what the cache stores and what the geocoding
//! provider returns. They carry no storage or transport details.

use serde::{Deserialize, Serialize};

/// A city's text in one language.
///
/// Empty strings mean the language has not been fetched yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedCity {
    pub name: String,
    pub address: String,
}

impl LocalizedCity {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    /// Whether this language has been backfilled.
    ///
    /// Only the name decides; an empty address alone does not cause a refetch.
    pub fn is_filled(&self) -> bool {
        !self.name.is_empty()
    }
}

/// A country and its name in one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryEntry {
    pub id: String,
    pub name: String,
}

/// A city and its text in one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityEntry {
    pub placeid: String,
    pub name: String,
    pub address: String,
}

/// Place details returned by the geocoding provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceDetails {
    /// Country code as reported by the provider (not yet normalized)
    pub country_code: String,
    /// Country display name in the requested language
    pub country_name: String,
    /// City name in the requested language
    pub city_name: String,
    /// Formatted address in the requested language
    pub address: String,
}

/// One autocomplete candidate from the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    pub placeid: String,
    pub description: String,
}

impl Prediction {
    pub fn new(placeid: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            placeid: placeid.into(),
            description: description.into(),
        }
    }
}

/// A resolved place: its id plus localized text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Place {
    pub placeid: String,
    #[serde(flatten)]
    pub city: LocalizedCity,
}

/// An autocomplete result with the city resolved through the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub placeid: String,
    pub description: String,
    #[serde(flatten)]
    pub city: LocalizedCity,
}
