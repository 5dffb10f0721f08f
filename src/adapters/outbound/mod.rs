mod google_geocoding_provider;
mod sqlite_city_repo;
mod sqlite_country_repo;
mod sqlite_database;
mod sqlite_schema;

pub use google_geocoding_provider::{GoogleConfig, GoogleGeocodingProvider, GOOGLE_MAPS_BASE_URL};
pub use sqlite_city_repo::SqliteCityRepository;
pub use sqlite_country_repo::SqliteCountryRepository;
pub use sqlite_database::SqliteDatabase;
pub use sqlite_schema::{SchemaManager, CACHE_SCHEMA};
