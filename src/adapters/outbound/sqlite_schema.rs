//! SQLite Schema Manager
//!
//! Creates the cache tables and registers the configured languages.
//! Per-language data lives in child tables keyed by (entity, language),
//! so adding a language never alters a table.

use super::sqlite_database::SqliteDatabase;
use crate::domain::errors::StoreError;
use crate::domain::value_objects::Language;
use rusqlite::{params, Connection, OptionalExtension};

/// SQL schema for the cache tables.
///
/// `city_info.country_id` has no foreign key: a city may be written
/// alongside (not strictly after) its country.
pub const CACHE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS language (
    code TEXT PRIMARY KEY NOT NULL
);

CREATE TABLE IF NOT EXISTS country_info (
    id TEXT PRIMARY KEY NOT NULL
);

CREATE TABLE IF NOT EXISTS country_name (
    country_id TEXT NOT NULL REFERENCES country_info(id),
    lang TEXT NOT NULL REFERENCES language(code),
    name TEXT NOT NULL DEFAULT '',
    PRIMARY KEY (country_id, lang)
);

CREATE TABLE IF NOT EXISTS city_info (
    placeid TEXT PRIMARY KEY NOT NULL,
    country_id TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS index_city_info_country_id ON city_info (country_id);

CREATE TABLE IF NOT EXISTS city_name (
    placeid TEXT NOT NULL REFERENCES city_info(placeid),
    lang TEXT NOT NULL REFERENCES language(code),
    name TEXT NOT NULL DEFAULT '',
    address TEXT NOT NULL DEFAULT '',
    PRIMARY KEY (placeid, lang)
);
"#;

/// Prepares the database for a set of languages.
pub struct SchemaManager {
    db: SqliteDatabase,
}

impl SchemaManager {
    pub fn new(db: SqliteDatabase) -> Self {
        Self { db }
    }

    /// Create missing tables and register missing languages.
    ///
    /// Runs in one transaction: on any error nothing is committed. Safe to
    /// call on every startup. The caller must treat an error as fatal.
    pub async fn prepare(&self, languages: &[Language]) -> Result<(), StoreError> {
        let languages = languages.to_vec();

        self.db
            .run(move |conn| {
                let tx = conn.transaction()?;
                tx.execute_batch(CACHE_SCHEMA)?;

                let mut added = 0;
                for lang in &languages {
                    if !language_registered(&tx, lang)? {
                        tx.execute("INSERT INTO language (code) VALUES (?1)", params![lang.as_str()])?;
                        added += 1;
                    }
                }

                tx.commit()?;
                tracing::info!(
                    "schema ready, languages={} newly_registered={}",
                    languages.len(),
                    added
                );
                Ok(())
            })
            .await
    }

    /// Whether a language has been registered by an earlier `prepare`.
    pub async fn is_registered(&self, lang: &Language) -> Result<bool, StoreError> {
        let lang = lang.clone();
        self.db
            .run(move |conn| Ok(language_registered(conn, &lang)?))
            .await
    }
}

fn language_registered(conn: &Connection, lang: &Language) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT code FROM language WHERE code = ?1",
        params![lang.as_str()],
        |row| row.get::<_, String>(0),
    )
    .optional()
    .map(|found| found.is_some())
}
