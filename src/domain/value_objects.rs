//! Value Objects - Immutable domain primitives
//!
//! Value objects are identified by their value rather than identity.
//! Both codes here are validated on construction, so holding one is proof
//! that it is well-formed.

use crate::domain::errors::{LanguageError, StoreError};
use std::str::FromStr;

/// A 2-character, lowercase language code (ISO 639-1 style).
///
/// Selects which translated name/address set to read or write.
///
/// # Examples
/// ```
/// use citycache::Language;
///
/// let lang = Language::parse("EN").unwrap();
/// assert_eq!(lang.as_str(), "en");
/// assert!(Language::parse("eng").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Language(String);

impl Language {
    /// Validate and normalize a language code.
    pub fn parse(code: &str) -> Result<Self, LanguageError> {
        if code.chars().count() != 2 {
            return Err(LanguageError::InvalidLanguageCode(code.to_string()));
        }
        Ok(Self(code.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Language {
    type Err = LanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A 2-character, uppercase country code (ISO 3166-1 alpha-2 style).
///
/// Only the length is validated; the code is not checked against a
/// canonical country list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CountryCode(String);

impl CountryCode {
    /// Validate and uppercase a country id.
    pub fn parse(id: &str) -> Result<Self, StoreError> {
        if id.chars().count() != 2 {
            return Err(StoreError::InvalidCountryId(id.to_string()));
        }
        Ok(Self(id.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CountryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
