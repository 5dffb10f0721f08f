//! SQLite Country Repository
//!
//! Implements CountryRepository over the `country_info` / `country_name`
//! tables.

use super::sqlite_database::{is_unique_violation, SqliteDatabase};
use crate::domain::entities::CountryEntry;
use crate::domain::errors::StoreError;
use crate::domain::ports::CountryRepository;
use crate::domain::value_objects::{CountryCode, Language};
use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};

/// SQLite-backed country repository.
pub struct SqliteCountryRepository {
    db: SqliteDatabase,
}

impl SqliteCountryRepository {
    pub fn new(db: SqliteDatabase) -> Self {
        Self { db }
    }

    fn row_to_entry(row: &Row) -> rusqlite::Result<CountryEntry> {
        Ok(CountryEntry {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }
}

#[async_trait]
impl CountryRepository for SqliteCountryRepository {
    async fn add(&self, id: &str, name: &str, lang: &Language) -> Result<(), StoreError> {
        let code = CountryCode::parse(id)?;
        let name = name.to_string();
        let lang = lang.clone();

        self.db
            .run(move |conn| {
                let tx = conn.transaction()?;
                match tx.execute("INSERT INTO country_info (id) VALUES (?1)", params![code.as_str()]) {
                    Ok(_) => {}
                    Err(e) if is_unique_violation(&e) => {
                        return Err(StoreError::CountryAlreadyExists(code.to_string()));
                    }
                    Err(e) => return Err(e.into()),
                }
                tx.execute(
                    "INSERT INTO country_name (country_id, lang, name) VALUES (?1, ?2, ?3)",
                    params![code.as_str(), lang.as_str(), name],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await
    }

    async fn get_name(&self, id: &str, lang: &Language) -> Result<Option<String>, StoreError> {
        let code = CountryCode::parse(id)?;
        let lang = lang.clone();

        self.db
            .run(move |conn| {
                let name = conn
                    .query_row(
                        "SELECT n.name
                         FROM country_info c
                         LEFT JOIN country_name n ON n.country_id = c.id AND n.lang = ?2
                         WHERE c.id = ?1",
                        params![code.as_str(), lang.as_str()],
                        |row| row.get::<_, Option<String>>(0),
                    )
                    .optional()?;
                Ok(name.map(Option::unwrap_or_default))
            })
            .await
    }

    async fn update(&self, id: &str, name: &str, lang: &Language) -> Result<(), StoreError> {
        let code = CountryCode::parse(id)?;
        let name = name.to_string();
        let lang = lang.clone();

        self.db
            .run(move |conn| {
                conn.execute(
                    "INSERT INTO country_name (country_id, lang, name)
                     SELECT id, ?2, ?3 FROM country_info WHERE id = ?1
                     ON CONFLICT (country_id, lang) DO UPDATE SET name = excluded.name",
                    params![code.as_str(), lang.as_str(), name],
                )?;
                Ok(())
            })
            .await
    }

    async fn list(&self, lang: &Language) -> Result<Vec<CountryEntry>, StoreError> {
        let lang = lang.clone();

        self.db
            .run(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT c.id, COALESCE(n.name, '')
                     FROM country_info c
                     LEFT JOIN country_name n ON n.country_id = c.id AND n.lang = ?1",
                )?;
                let countries = stmt
                    .query_map(params![lang.as_str()], |row| Self::row_to_entry(row))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(countries)
            })
            .await
    }
}
