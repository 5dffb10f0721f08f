//! Application layer: use cases composed from domain ports.

mod lookup_service;

pub use lookup_service::{LookupService, DEFAULT_BATCH_CONCURRENCY};
