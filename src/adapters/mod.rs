//! Adapters: inbound (HTTP API) and outbound (SQLite stores, Google provider).

pub mod inbound;
pub mod outbound;
