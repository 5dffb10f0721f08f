mod language_registry;

pub use language_registry::LanguageRegistry;
