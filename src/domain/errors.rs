//! Domain Errors
//!
//! One error enum per concern. Absent rows are never errors: stores
//! return `Option` and callers must check it.

/// Boxed error used to carry backend-specific failures unchanged.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors from language configuration and lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LanguageError {
    #[error("language code must be 2 characters, got {0:?}")]
    InvalidLanguageCode(String),
    #[error("language index {index} out of range ({len} configured)")]
    LanguageIndexOutOfRange { index: usize, len: usize },
    #[error("language {0:?} is not configured")]
    UnknownLanguage(String),
}

/// Errors from the country and city stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("country id must be 2 characters, got {0:?}")]
    InvalidCountryId(String),
    #[error("country {0} already exists")]
    CountryAlreadyExists(String),
    #[error("city {0} already exists")]
    CityAlreadyExists(String),
    #[error("storage backend error: {0}")]
    Backend(#[source] BoxError),
}

impl StoreError {
    /// Whether this error is a uniqueness conflict on insert.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            StoreError::CountryAlreadyExists(_) | StoreError::CityAlreadyExists(_)
        )
    }
}

/// Errors from the external geocoding provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider reported zero results (e.g. coordinates in the ocean).
    #[error("no place found")]
    NoPlaceFound,
    /// The provider reported the request quota as exceeded.
    #[error("provider rate limit exceeded")]
    RateLimited,
    #[error("provider responded with HTTP status {0}")]
    Status(u16),
    #[error("provider transport error: {0}")]
    Transport(#[source] BoxError),
    /// A provider status string this client does not know how to handle.
    #[error("unhandled provider status {0:?}")]
    Unhandled(String),
}

/// Everything a lookup can fail with.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error(transparent)]
    Language(#[from] LanguageError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}
