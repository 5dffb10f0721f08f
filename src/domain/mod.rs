//! Domain Layer
//!
//! Entities, value objects, errors, ports and pure services. Nothing in
//! here knows about SQLite, HTTP or the runtime.

pub mod entities;
pub mod errors;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use errors::{LanguageError, LookupError, ProviderError, StoreError};
pub use value_objects::{CountryCode, Language};
