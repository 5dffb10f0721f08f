//! citycache - Localized city name cache with Hexagonal Architecture
//!
//! This is the composition root that wires together all the components.

use citycache::adapters::inbound::ApiServer;
use citycache::adapters::outbound::{
    GoogleConfig, GoogleGeocodingProvider, SchemaManager, SqliteCityRepository,
    SqliteCountryRepository, SqliteDatabase,
};
use citycache::{load_config, LanguageRegistry, LookupService};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    tracing::info!(
        "starting citycache listen={} db={} languages={:?}",
        cfg.listen_addr,
        cfg.db_path,
        cfg.languages
    );

    // ===== COMPOSITION ROOT =====

    // 1. Languages: an invalid code aborts startup
    let languages = LanguageRegistry::configure(&cfg.languages)?;
    if languages.is_empty() {
        anyhow::bail!("CITYCACHE_LANGUAGES must name at least one language");
    }

    // 2. Storage: schema preparation failure is fatal
    let db = SqliteDatabase::open(&cfg.db_path)?;
    SchemaManager::new(db.clone())
        .prepare(languages.all())
        .await?;

    let countries = Arc::new(SqliteCountryRepository::new(db.clone()));
    let cities = Arc::new(SqliteCityRepository::new(db));

    // 3. Geocoding provider
    if cfg.google_api_key.is_empty() {
        tracing::warn!("CITYCACHE_GOOGLE_API_KEY is not set; provider requests will be rejected");
    }
    let provider = Arc::new(GoogleGeocodingProvider::new(GoogleConfig {
        api_key: cfg.google_api_key.clone(),
        base_url: cfg.provider_url.clone(),
        timeout: Duration::from_secs(cfg.request_timeout_secs),
    })?);

    // 4. Application service
    let service = Arc::new(LookupService::new(
        languages,
        countries,
        cities,
        provider,
        cfg.batch_concurrency,
    ));

    // 5. Inbound adapter
    let server = ApiServer::new(cfg.listen_addr.clone(), service);

    server.run().await
}
