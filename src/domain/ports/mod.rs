mod city_repository;
mod country_repository;
mod geocoding_provider;

pub use city_repository::CityRepository;
pub use country_repository::CountryRepository;
pub use geocoding_provider::GeocodingProvider;
