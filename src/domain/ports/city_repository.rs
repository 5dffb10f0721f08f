//! City Repository Port
//!
//! Defines the interface for locale-aware city persistence.

use crate::domain::entities::{CityEntry, LocalizedCity};
use crate::domain::errors::StoreError;
use crate::domain::value_objects::Language;
use async_trait::async_trait;

/// Repository for cities keyed by provider place id.
///
/// A duplicate insert is reported as [`StoreError::CityAlreadyExists`];
/// it is never silently accepted.
#[async_trait]
pub trait CityRepository: Send + Sync {
    /// Insert a new city with only `lang`'s text populated.
    async fn add(
        &self,
        placeid: &str,
        country_id: &str,
        city: &LocalizedCity,
        lang: &Language,
    ) -> Result<(), StoreError>;

    /// Get a city's text in `lang`.
    ///
    /// `None` means the city is unknown; an empty [`LocalizedCity`] means
    /// it exists but `lang` has not been fetched yet.
    async fn get(&self, placeid: &str, lang: &Language) -> Result<Option<LocalizedCity>, StoreError>;

    /// Set `lang`'s text for an existing city. No existence check.
    async fn update(
        &self,
        placeid: &str,
        city: &LocalizedCity,
        lang: &Language,
    ) -> Result<(), StoreError>;

    /// All cities of a country with their text in `lang`.
    async fn list_by_country(
        &self,
        country_id: &str,
        lang: &Language,
    ) -> Result<Vec<CityEntry>, StoreError>;
}
