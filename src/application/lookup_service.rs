//! Lookup Service - Main application use case
//!
//! Read-through cache over the city and country stores. A lookup probes
//! the store, falls through to the geocoding provider on a miss and writes
//! the result back. Each (placeid, language) pair is cached independently,
//! so a city can be resolved in one language and still unfetched in
//! another.

use crate::domain::entities::{CityEntry, CountryEntry, LocalizedCity, Place, Suggestion};
use crate::domain::errors::{LookupError, StoreError};
use crate::domain::ports::{CityRepository, CountryRepository, GeocodingProvider};
use crate::domain::services::LanguageRegistry;
use crate::domain::value_objects::{CountryCode, Language};
use futures::stream::{self, StreamExt};
use std::sync::Arc;

/// Default number of lookups a batch runs at once.
pub const DEFAULT_BATCH_CONCURRENCY: usize = 8;

/// Lookup service - the read-through cache controller.
///
/// Per (placeid, language):
/// 1. Probe the city store; a row with a non-empty name is a hit
/// 2. On a miss, fetch place details from the provider
/// 3. Add or backfill the country in this language
/// 4. Add or backfill the city in this language
///
/// Steps 3 and 4 are separate writes, not one transaction. If the process
/// dies in between, the country exists without its city and the next
/// lookup simply runs the miss path again.
pub struct LookupService {
    languages: LanguageRegistry,
    countries: Arc<dyn CountryRepository>,
    cities: Arc<dyn CityRepository>,
    provider: Arc<dyn GeocodingProvider>,
    batch_concurrency: usize,
}

impl LookupService {
    /// Create a new lookup service.
    ///
    /// `batch_concurrency` caps in-flight lookups (and so provider calls)
    /// per batch; zero is treated as one.
    pub fn new(
        languages: LanguageRegistry,
        countries: Arc<dyn CountryRepository>,
        cities: Arc<dyn CityRepository>,
        provider: Arc<dyn GeocodingProvider>,
        batch_concurrency: usize,
    ) -> Self {
        Self {
            languages,
            countries,
            cities,
            provider,
            batch_concurrency: batch_concurrency.max(1),
        }
    }

    /// The configured languages.
    pub fn languages(&self) -> &LanguageRegistry {
        &self.languages
    }

    /// Resolve a place id to its city name and address in language `lang`.
    pub async fn lookup(&self, placeid: &str, lang: usize) -> Result<LocalizedCity, LookupError> {
        let lang = self.languages.resolve(lang)?;
        self.lookup_in(placeid, lang).await
    }

    /// Resolve many place ids concurrently.
    ///
    /// `result[j]` always belongs to `placeids[j]`, whatever order the
    /// lookups finish in. One failed slot does not affect the others.
    pub async fn lookup_many<S: AsRef<str>>(
        &self,
        placeids: &[S],
        lang: usize,
    ) -> Result<Vec<Result<LocalizedCity, LookupError>>, LookupError> {
        let lang = self.languages.resolve(lang)?;
        Ok(self.lookup_batch(placeids, lang).await)
    }

    /// Resolve coordinates to the enclosing city.
    pub async fn lookup_coordinates(
        &self,
        lat: f64,
        lng: f64,
        lang: usize,
    ) -> Result<Place, LookupError> {
        let lang = self.languages.resolve(lang)?;
        let placeid = self.provider.reverse_geocode(lat, lng).await?;
        let city = self.lookup_in(&placeid, lang).await?;
        Ok(Place { placeid, city })
    }

    /// City suggestions for free-text input, each resolved through the cache.
    ///
    /// All candidates are looked up before failing; the first failed slot's
    /// error is returned.
    pub async fn autocomplete(
        &self,
        input: &str,
        lang: usize,
    ) -> Result<Vec<Suggestion>, LookupError> {
        let lang = self.languages.resolve(lang)?;
        let predictions = self.provider.autocomplete(input, lang).await?;

        let placeids: Vec<&str> = predictions.iter().map(|p| p.placeid.as_str()).collect();
        let results = self.lookup_batch(&placeids, lang).await;

        predictions
            .into_iter()
            .zip(results)
            .map(|(prediction, city)| {
                Ok(Suggestion {
                    placeid: prediction.placeid,
                    description: prediction.description,
                    city: city?,
                })
            })
            .collect()
    }

    /// Every cached country with its name in `lang`.
    pub async fn countries(&self, lang: usize) -> Result<Vec<CountryEntry>, LookupError> {
        let lang = self.languages.resolve(lang)?;
        Ok(self.countries.list(lang).await?)
    }

    /// Every cached city of a country with its text in `lang`.
    pub async fn country_cities(
        &self,
        country_id: &str,
        lang: usize,
    ) -> Result<Vec<CityEntry>, LookupError> {
        let lang = self.languages.resolve(lang)?;
        let code = CountryCode::parse(country_id)?;
        Ok(self.cities.list_by_country(code.as_str(), lang).await?)
    }

    async fn lookup_batch<S: AsRef<str>>(
        &self,
        placeids: &[S],
        lang: &Language,
    ) -> Vec<Result<LocalizedCity, LookupError>> {
        let placeids: Vec<String> = placeids.iter().map(|p| p.as_ref().to_string()).collect();

        stream::iter(placeids)
            .map(|placeid| async move { self.lookup_in(&placeid, lang).await })
            .buffered(self.batch_concurrency)
            .collect()
            .await
    }

    async fn lookup_in(&self, placeid: &str, lang: &Language) -> Result<LocalizedCity, LookupError> {
        let cached = self.cities.get(placeid, lang).await?;

        if let Some(city) = &cached {
            if city.is_filled() {
                tracing::debug!("cache hit placeid={} lang={}", placeid, lang);
                return Ok(city.clone());
            }
        }

        let row_exists = cached.is_some();
        tracing::debug!(
            "cache miss placeid={} lang={} row_exists={}",
            placeid,
            lang,
            row_exists
        );

        let details = match self.provider.place_details(placeid, lang).await {
            Ok(details) => details,
            Err(e) => {
                tracing::warn!("place details failed placeid={} lang={}: {}", placeid, lang, e);
                return Err(e.into());
            }
        };

        let country = CountryCode::parse(&details.country_code)?;
        self.reconcile_country(&country, &details.country_name, lang)
            .await?;

        let city = LocalizedCity::new(details.city_name, details.address);
        self.reconcile_city(placeid, country.as_str(), &city, row_exists, lang)
            .await?;

        Ok(city)
    }

    /// Make sure the country exists and has a name in `lang`.
    async fn reconcile_country(
        &self,
        country: &CountryCode,
        name: &str,
        lang: &Language,
    ) -> Result<(), StoreError> {
        let id = country.as_str();

        match self.countries.get_name(id, lang).await? {
            None => match self.countries.add(id, name, lang).await {
                Err(e) if e.is_conflict() => {
                    tracing::debug!("country {} added concurrently, updating instead", id);
                    self.countries.update(id, name, lang).await
                }
                other => other,
            },
            Some(existing) if existing.is_empty() => self.countries.update(id, name, lang).await,
            Some(_) => Ok(()),
        }
    }

    /// Add the city, or backfill `lang` on the row that already exists.
    async fn reconcile_city(
        &self,
        placeid: &str,
        country_id: &str,
        city: &LocalizedCity,
        row_exists: bool,
        lang: &Language,
    ) -> Result<(), StoreError> {
        if row_exists {
            return self.cities.update(placeid, city, lang).await;
        }

        match self.cities.add(placeid, country_id, city, lang).await {
            Err(e) if e.is_conflict() => {
                tracing::debug!("city {} added concurrently, updating instead", placeid);
                self.cities.update(placeid, city, lang).await
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{PlaceDetails, Prediction};
    use crate::domain::errors::{LanguageError, ProviderError};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    // ===== Mock Implementations =====

    #[derive(Default)]
    struct MockCountryRepo {
        rows: Mutex<HashMap<String, HashMap<String, String>>>,
        /// Pretend another request inserts the country between probe and add
        lose_add_race: bool,
        updates: AtomicUsize,
    }

    #[async_trait]
    impl CountryRepository for MockCountryRepo {
        async fn add(&self, id: &str, name: &str, lang: &Language) -> Result<(), StoreError> {
            let code = CountryCode::parse(id)?;
            let mut rows = self.rows.lock().unwrap();
            if self.lose_add_race {
                rows.entry(code.to_string()).or_default();
            }
            if rows.contains_key(code.as_str()) {
                return Err(StoreError::CountryAlreadyExists(code.to_string()));
            }
            let mut names = HashMap::new();
            names.insert(lang.to_string(), name.to_string());
            rows.insert(code.to_string(), names);
            Ok(())
        }

        async fn get_name(&self, id: &str, lang: &Language) -> Result<Option<String>, StoreError> {
            let code = CountryCode::parse(id)?;
            Ok(self.rows.lock().unwrap().get(code.as_str()).map(|names| {
                names.get(lang.as_str()).cloned().unwrap_or_default()
            }))
        }

        async fn update(&self, id: &str, name: &str, lang: &Language) -> Result<(), StoreError> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            if let Some(names) = self.rows.lock().unwrap().get_mut(&id.to_uppercase()) {
                names.insert(lang.to_string(), name.to_string());
            }
            Ok(())
        }

        async fn list(&self, lang: &Language) -> Result<Vec<CountryEntry>, StoreError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .map(|(id, names)| CountryEntry {
                    id: id.clone(),
                    name: names.get(lang.as_str()).cloned().unwrap_or_default(),
                })
                .collect())
        }
    }

    #[derive(Default)]
    struct MockCityRepo {
        rows: Mutex<HashMap<String, (String, HashMap<String, LocalizedCity>)>>,
        lose_add_race: bool,
        adds: AtomicUsize,
        updates: AtomicUsize,
    }

    #[async_trait]
    impl CityRepository for MockCityRepo {
        async fn add(
            &self,
            placeid: &str,
            country_id: &str,
            city: &LocalizedCity,
            lang: &Language,
        ) -> Result<(), StoreError> {
            self.adds.fetch_add(1, Ordering::SeqCst);
            let mut rows = self.rows.lock().unwrap();
            if self.lose_add_race {
                rows.entry(placeid.to_string())
                    .or_insert_with(|| (country_id.to_string(), HashMap::new()));
            }
            if rows.contains_key(placeid) {
                return Err(StoreError::CityAlreadyExists(placeid.to_string()));
            }
            let mut texts = HashMap::new();
            texts.insert(lang.to_string(), city.clone());
            rows.insert(placeid.to_string(), (country_id.to_string(), texts));
            Ok(())
        }

        async fn get(
            &self,
            placeid: &str,
            lang: &Language,
        ) -> Result<Option<LocalizedCity>, StoreError> {
            Ok(self.rows.lock().unwrap().get(placeid).map(|(_, texts)| {
                texts.get(lang.as_str()).cloned().unwrap_or_default()
            }))
        }

        async fn update(
            &self,
            placeid: &str,
            city: &LocalizedCity,
            lang: &Language,
        ) -> Result<(), StoreError> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            if let Some((_, texts)) = self.rows.lock().unwrap().get_mut(placeid) {
                texts.insert(lang.to_string(), city.clone());
            }
            Ok(())
        }

        async fn list_by_country(
            &self,
            country_id: &str,
            lang: &Language,
        ) -> Result<Vec<CityEntry>, StoreError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|(_, (country, _))| country == country_id)
                .map(|(placeid, (_, texts))| {
                    let text = texts.get(lang.as_str()).cloned().unwrap_or_default();
                    CityEntry {
                        placeid: placeid.clone(),
                        name: text.name,
                        address: text.address,
                    }
                })
                .collect())
        }
    }

    #[derive(Default)]
    struct MockProvider {
        details_calls: AtomicUsize,
        fail_placeid: Option<String>,
    }

    #[async_trait]
    impl GeocodingProvider for MockProvider {
        async fn reverse_geocode(&self, lat: f64, _lng: f64) -> Result<String, ProviderError> {
            if lat == 0.0 {
                return Err(ProviderError::NoPlaceFound);
            }
            Ok("xiamen".to_string())
        }

        async fn autocomplete(
            &self,
            _input: &str,
            _lang: &Language,
        ) -> Result<Vec<Prediction>, ProviderError> {
            Ok(vec![
                Prediction::new("xiamen", "Xiamen, Fujian, China"),
                Prediction::new("boston", "Boston, MA, USA"),
            ])
        }

        async fn place_details(
            &self,
            placeid: &str,
            lang: &Language,
        ) -> Result<PlaceDetails, ProviderError> {
            self.details_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_placeid.as_deref() == Some(placeid) {
                return Err(ProviderError::RateLimited);
            }
            let (code, country, city) = match (placeid, lang.as_str()) {
                ("boston", _) => ("us", "United States", "Boston"),
                (_, "zh") => ("cn", "中国", "厦门"),
                _ => ("cn", "China", "Xiamen"),
            };
            Ok(PlaceDetails {
                country_code: code.to_string(),
                country_name: country.to_string(),
                city_name: city.to_string(),
                address: format!("{} address", city),
            })
        }
    }

    struct Fixture {
        countries: Arc<MockCountryRepo>,
        cities: Arc<MockCityRepo>,
        provider: Arc<MockProvider>,
        service: LookupService,
    }

    fn fixture_with(
        countries: MockCountryRepo,
        cities: MockCityRepo,
        provider: MockProvider,
    ) -> Fixture {
        let countries = Arc::new(countries);
        let cities = Arc::new(cities);
        let provider = Arc::new(provider);
        let service = LookupService::new(
            LanguageRegistry::configure(["en", "zh"]).unwrap(),
            countries.clone(),
            cities.clone(),
            provider.clone(),
            2,
        );
        Fixture {
            countries,
            cities,
            provider,
            service,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(
            MockCountryRepo::default(),
            MockCityRepo::default(),
            MockProvider::default(),
        )
    }

    // ===== lookup Tests =====

    #[tokio::test]
    async fn test_lookup_miss_then_hit() {
        let f = fixture();

        let first = f.service.lookup("xiamen", 0).await.unwrap();
        assert_eq!(first, LocalizedCity::new("Xiamen", "Xiamen address"));
        assert_eq!(f.provider.details_calls.load(Ordering::SeqCst), 1);

        let second = f.service.lookup("xiamen", 0).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(f.provider.details_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn test_lookup_logs_hit_and_miss() {
        let f = fixture();
        f.service.lookup("xiamen", 0).await.unwrap();
        f.service.lookup("xiamen", 0).await.unwrap();

        assert!(logs_contain("cache miss placeid=xiamen lang=en row_exists=false"));
        assert!(logs_contain("cache hit placeid=xiamen lang=en"));
    }

    #[tokio::test]
    async fn test_lookup_backfills_second_language() {
        let f = fixture();
        f.service.lookup("xiamen", 0).await.unwrap();

        let zh = f.service.lookup("xiamen", 1).await.unwrap();
        assert_eq!(zh.name, "厦门");
        assert_eq!(f.provider.details_calls.load(Ordering::SeqCst), 2);
        assert_eq!(f.cities.adds.load(Ordering::SeqCst), 1);
        assert_eq!(f.cities.updates.load(Ordering::SeqCst), 1);

        let zh_lang = Language::parse("zh").unwrap();
        assert_eq!(
            f.countries.get_name("CN", &zh_lang).await.unwrap(),
            Some("中国".to_string())
        );
    }

    #[tokio::test]
    async fn test_lookup_leaves_filled_country_alone() {
        let f = fixture();
        f.service.lookup("xiamen", 0).await.unwrap();

        // Different city, same country, same language.
        f.cities
            .rows
            .lock()
            .unwrap()
            .insert("gulangyu".to_string(), ("CN".to_string(), HashMap::new()));
        f.service.lookup("gulangyu", 0).await.unwrap();

        assert_eq!(f.countries.updates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_lookup_bad_language_index() {
        let f = fixture();
        let err = f.service.lookup("xiamen", 2).await.unwrap_err();
        assert!(matches!(
            err,
            LookupError::Language(LanguageError::LanguageIndexOutOfRange { index: 2, len: 2 })
        ));
        assert_eq!(f.provider.details_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_lookup_provider_error_writes_nothing() {
        let f = fixture_with(
            MockCountryRepo::default(),
            MockCityRepo::default(),
            MockProvider {
                fail_placeid: Some("xiamen".to_string()),
                ..Default::default()
            },
        );

        let err = f.service.lookup("xiamen", 0).await.unwrap_err();
        assert!(matches!(err, LookupError::Provider(ProviderError::RateLimited)));
        assert!(f.countries.rows.lock().unwrap().is_empty());
        assert!(f.cities.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lookup_country_race_falls_back_to_update() {
        let f = fixture_with(
            MockCountryRepo {
                lose_add_race: true,
                ..Default::default()
            },
            MockCityRepo::default(),
            MockProvider::default(),
        );

        let city = f.service.lookup("xiamen", 0).await.unwrap();
        assert_eq!(city.name, "Xiamen");
        assert_eq!(f.countries.updates.load(Ordering::SeqCst), 1);

        let en = Language::parse("en").unwrap();
        assert_eq!(
            f.countries.get_name("CN", &en).await.unwrap(),
            Some("China".to_string())
        );
    }

    #[tokio::test]
    async fn test_lookup_city_race_falls_back_to_update() {
        let f = fixture_with(
            MockCountryRepo::default(),
            MockCityRepo {
                lose_add_race: true,
                ..Default::default()
            },
            MockProvider::default(),
        );

        f.service.lookup("xiamen", 0).await.unwrap();
        assert_eq!(f.cities.updates.load(Ordering::SeqCst), 1);

        let en = Language::parse("en").unwrap();
        assert_eq!(
            f.cities.get("xiamen", &en).await.unwrap(),
            Some(LocalizedCity::new("Xiamen", "Xiamen address"))
        );
    }

    // ===== batch Tests =====

    #[tokio::test]
    async fn test_lookup_many_keeps_slots() {
        let f = fixture_with(
            MockCountryRepo::default(),
            MockCityRepo::default(),
            MockProvider {
                fail_placeid: Some("broken".to_string()),
                ..Default::default()
            },
        );

        let results = f
            .service
            .lookup_many(&["boston", "broken", "xiamen"], 0)
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().name, "Boston");
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().name, "Xiamen");
    }

    #[tokio::test]
    async fn test_lookup_many_empty() {
        let f = fixture();
        let results = f.service.lookup_many::<&str>(&[], 0).await.unwrap();
        assert!(results.is_empty());
    }

    // ===== other operations =====

    #[tokio::test]
    async fn test_lookup_coordinates() {
        let f = fixture();
        let place = f.service.lookup_coordinates(24.54918, 118.12705, 0).await.unwrap();
        assert_eq!(place.placeid, "xiamen");
        assert_eq!(place.city.name, "Xiamen");

        let err = f.service.lookup_coordinates(0.0, 0.0, 0).await.unwrap_err();
        assert!(matches!(err, LookupError::Provider(ProviderError::NoPlaceFound)));
    }

    #[tokio::test]
    async fn test_autocomplete() {
        let f = fixture();
        let suggestions = f.service.autocomplete("bao", 0).await.unwrap();

        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].placeid, "xiamen");
        assert_eq!(suggestions[0].description, "Xiamen, Fujian, China");
        assert_eq!(suggestions[0].city.name, "Xiamen");
        assert_eq!(suggestions[1].city.name, "Boston");
    }

    #[tokio::test]
    async fn test_autocomplete_surfaces_slot_error() {
        let f = fixture_with(
            MockCountryRepo::default(),
            MockCityRepo::default(),
            MockProvider {
                fail_placeid: Some("boston".to_string()),
                ..Default::default()
            },
        );

        let err = f.service.autocomplete("bao", 0).await.unwrap_err();
        assert!(matches!(err, LookupError::Provider(ProviderError::RateLimited)));
        // The healthy slot was still resolved and cached.
        assert_eq!(f.cities.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_countries_and_cities() {
        let f = fixture();
        f.service.lookup("xiamen", 0).await.unwrap();
        f.service.lookup("boston", 0).await.unwrap();

        let mut countries = f.service.countries(0).await.unwrap();
        countries.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(countries.len(), 2);
        assert_eq!(countries[0].id, "CN");
        assert_eq!(countries[1].name, "United States");

        let cities = f.service.country_cities("us", 0).await.unwrap();
        assert_eq!(cities.len(), 1);
        assert_eq!(cities[0].placeid, "boston");

        let err = f.service.country_cities("usa", 0).await.unwrap_err();
        assert!(matches!(err, LookupError::Store(StoreError::InvalidCountryId(_))));
    }

    #[test]
    fn test_zero_concurrency_is_clamped() {
        let service = LookupService::new(
            LanguageRegistry::configure(["en"]).unwrap(),
            Arc::new(MockCountryRepo::default()),
            Arc::new(MockCityRepo::default()),
            Arc::new(MockProvider::default()),
            0,
        );
        assert_eq!(service.batch_concurrency, 1);
        assert_eq!(service.languages().len(), 1);
    }
}
