//! Language Registry Service
//!
//! Pure domain logic for the configured language set.
//! This service has NO external dependencies - it's pure Rust.

use crate::domain::errors::LanguageError;
use crate::domain::value_objects::Language;

/// Ordered, validated set of configured languages.
///
/// The order is significant: callers address languages by index, and
/// index 0 is the default language of the HTTP API. The set is fixed once
/// configured; build a new registry to change it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageRegistry {
    languages: Vec<Language>,
}

impl LanguageRegistry {
    /// Validate and lowercase every code, keeping configuration order.
    ///
    /// # Example
    /// ```
    /// use citycache::LanguageRegistry;
    ///
    /// let registry = LanguageRegistry::configure(["EN", "zh"]).unwrap();
    /// assert_eq!(registry.resolve(1).unwrap().as_str(), "zh");
    /// assert!(registry.resolve(2).is_err());
    /// ```
    pub fn configure<I, S>(codes: I) -> Result<Self, LanguageError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let languages = codes
            .into_iter()
            .map(|code| Language::parse(code.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { languages })
    }

    /// Map an index to its language.
    pub fn resolve(&self, index: usize) -> Result<&Language, LanguageError> {
        self.languages
            .get(index)
            .ok_or(LanguageError::LanguageIndexOutOfRange {
                index,
                len: self.languages.len(),
            })
    }

    /// Index of a configured code (case-insensitive).
    pub fn position(&self, code: &str) -> Result<usize, LanguageError> {
        let wanted = code.to_lowercase();
        self.languages
            .iter()
            .position(|l| l.as_str() == wanted)
            .ok_or_else(|| LanguageError::UnknownLanguage(code.to_string()))
    }

    /// Every configured language, in order.
    pub fn all(&self) -> &[Language] {
        &self.languages
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}
