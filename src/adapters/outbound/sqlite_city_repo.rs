//! SQLite City Repository
//!
//! Implements CityRepository over the `city_info` / `city_name` tables.

use super::sqlite_database::{is_unique_violation, SqliteDatabase};
use crate::domain::entities::{CityEntry, LocalizedCity};
use crate::domain::errors::StoreError;
use crate::domain::ports::CityRepository;
use crate::domain::value_objects::Language;
use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};

/// SQLite-backed city repository.
pub struct SqliteCityRepository {
    db: SqliteDatabase,
}

impl SqliteCityRepository {
    pub fn new(db: SqliteDatabase) -> Self {
        Self { db }
    }

    fn row_to_city(row: &Row) -> rusqlite::Result<LocalizedCity> {
        Ok(LocalizedCity {
            name: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
            address: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        })
    }

    fn row_to_entry(row: &Row) -> rusqlite::Result<CityEntry> {
        Ok(CityEntry {
            placeid: row.get(0)?,
            name: row.get(1)?,
            address: row.get(2)?,
        })
    }
}

#[async_trait]
impl CityRepository for SqliteCityRepository {
    async fn add(
        &self,
        placeid: &str,
        country_id: &str,
        city: &LocalizedCity,
        lang: &Language,
    ) -> Result<(), StoreError> {
        let placeid = placeid.to_string();
        let country_id = country_id.to_uppercase();
        let city = city.clone();
        let lang = lang.clone();

        self.db
            .run(move |conn| {
                let tx = conn.transaction()?;
                match tx.execute(
                    "INSERT INTO city_info (placeid, country_id) VALUES (?1, ?2)",
                    params![placeid, country_id],
                ) {
                    Ok(_) => {}
                    Err(e) if is_unique_violation(&e) => {
                        return Err(StoreError::CityAlreadyExists(placeid.clone()));
                    }
                    Err(e) => return Err(e.into()),
                }
                tx.execute(
                    "INSERT INTO city_name (placeid, lang, name, address) VALUES (?1, ?2, ?3, ?4)",
                    params![placeid, lang.as_str(), city.name, city.address],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await
    }

    async fn get(&self, placeid: &str, lang: &Language) -> Result<Option<LocalizedCity>, StoreError> {
        let placeid = placeid.to_string();
        let lang = lang.clone();

        self.db
            .run(move |conn| {
                let city = conn
                    .query_row(
                        "SELECT n.name, n.address
                         FROM city_info c
                         LEFT JOIN city_name n ON n.placeid = c.placeid AND n.lang = ?2
                         WHERE c.placeid = ?1",
                        params![placeid, lang.as_str()],
                        |row| Self::row_to_city(row),
                    )
                    .optional()?;
                Ok(city)
            })
            .await
    }

    async fn update(
        &self,
        placeid: &str,
        city: &LocalizedCity,
        lang: &Language,
    ) -> Result<(), StoreError> {
        let placeid = placeid.to_string();
        let city = city.clone();
        let lang = lang.clone();

        self.db
            .run(move |conn| {
                conn.execute(
                    "INSERT INTO city_name (placeid, lang, name, address)
                     SELECT placeid, ?2, ?3, ?4 FROM city_info WHERE placeid = ?1
                     ON CONFLICT (placeid, lang)
                     DO UPDATE SET name = excluded.name, address = excluded.address",
                    params![placeid, lang.as_str(), city.name, city.address],
                )?;
                Ok(())
            })
            .await
    }

    async fn list_by_country(
        &self,
        country_id: &str,
        lang: &Language,
    ) -> Result<Vec<CityEntry>, StoreError> {
        let country_id = country_id.to_uppercase();
        let lang = lang.clone();

        self.db
            .run(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT c.placeid, COALESCE(n.name, ''), COALESCE(n.address, '')
                     FROM city_info c
                     LEFT JOIN city_name n ON n.placeid = c.placeid AND n.lang = ?2
                     WHERE c.country_id = ?1",
                )?;
                let cities = stmt
                    .query_map(params![country_id, lang.as_str()], |row| Self::row_to_entry(row))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(cities)
            })
            .await
    }
}
