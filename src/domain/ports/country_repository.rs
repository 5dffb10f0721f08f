//! Country Repository Port
//!
//! Defines the interface for locale-aware country persistence.

use crate::domain::entities::CountryEntry;
use crate::domain::errors::StoreError;
use crate::domain::value_objects::Language;
use async_trait::async_trait;

/// Repository for countries and their per-language names.
///
/// Country ids are validated (2 characters) and stored uppercase.
/// Implementations must report a duplicate insert as
/// [`StoreError::CountryAlreadyExists`].
#[async_trait]
pub trait CountryRepository: Send + Sync {
    /// Insert a new country with only `lang`'s name populated.
    async fn add(&self, id: &str, name: &str, lang: &Language) -> Result<(), StoreError>;

    /// Get a country's name in `lang`.
    ///
    /// `None` means the country is unknown; `Some("")` means it exists but
    /// `lang` has not been fetched yet.
    async fn get_name(&self, id: &str, lang: &Language) -> Result<Option<String>, StoreError>;

    /// Set `lang`'s name for an existing country.
    ///
    /// No existence check: updating an unknown id changes nothing.
    async fn update(&self, id: &str, name: &str, lang: &Language) -> Result<(), StoreError>;

    /// All countries with their name in `lang` (empty where unset).
    async fn list(&self, lang: &Language) -> Result<Vec<CountryEntry>, StoreError>;
}
