use crate::adapters::outbound::GOOGLE_MAPS_BASE_URL;
use crate::application::DEFAULT_BATCH_CONCURRENCY;
use serde::Deserialize;

#[derive(Clone, Deserialize)]
pub struct Config {
    pub listen_addr: String,
    pub db_path: String,
    /// Configured language codes, in index order
    pub languages: Vec<String>,
    pub debug: bool,

    // Geocoding provider settings
    pub google_api_key: String,
    pub provider_url: String,
    pub request_timeout_secs: u64,
    pub batch_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            db_path: "citycache.db".to_string(),
            languages: vec!["en".to_string()],
            debug: false,
            google_api_key: String::new(),
            provider_url: GOOGLE_MAPS_BASE_URL.to_string(),
            request_timeout_secs: 10,
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
        }
    }
}

// The API key stays out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("listen_addr", &self.listen_addr)
            .field("db_path", &self.db_path)
            .field("languages", &self.languages)
            .field("debug", &self.debug)
            .field("google_api_key", &"<redacted>")
            .field("provider_url", &self.provider_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("batch_concurrency", &self.batch_concurrency)
            .finish()
    }
}

pub fn load_config() -> anyhow::Result<Config> {
    let defaults = Config::default();

    let listen_addr = std::env::var("CITYCACHE_LISTEN_ADDR")
        .unwrap_or_else(|_| defaults.listen_addr.clone());

    let db_path = std::env::var("CITYCACHE_DB_PATH").unwrap_or_else(|_| defaults.db_path.clone());

    let languages = std::env::var("CITYCACHE_LANGUAGES")
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_else(|_| defaults.languages.clone());

    let debug = std::env::var("DEBUG").is_ok();

    let google_api_key = std::env::var("CITYCACHE_GOOGLE_API_KEY").unwrap_or_default();

    let provider_url = std::env::var("CITYCACHE_PROVIDER_URL")
        .map(|v| v.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| defaults.provider_url.clone());

    let request_timeout_secs = std::env::var("CITYCACHE_REQUEST_TIMEOUT_SECS")
        .unwrap_or_else(|_| "10".to_string())
        .parse()
        .unwrap_or(defaults.request_timeout_secs);

    let batch_concurrency = std::env::var("CITYCACHE_BATCH_CONCURRENCY")
        .unwrap_or_else(|_| DEFAULT_BATCH_CONCURRENCY.to_string())
        .parse()
        .unwrap_or(defaults.batch_concurrency);

    Ok(Config {
        listen_addr,
        db_path,
        languages,
        debug,
        google_api_key,
        provider_url,
        request_timeout_secs,
        batch_concurrency,
    })
}
