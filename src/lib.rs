//! # Token Proxy Library
//!
//! Exchanges OAuth2 client credentials for a bearer token, keeps the token
//! in memory and hands it out over HTTP.
//!
//! Modules:
//! - `cache` — the cached token record and the coalescing token manager
//! - `sources` — upstream client-credentials exchange and its errors
//! - `parser` — token endpoint response decoding
//! - `server` — axum router for the token and metrics endpoints
//! - `config` — YAML service configuration, defaults and validation

pub mod config;
pub mod cache;
pub mod sources;
pub mod parser;
pub mod observability;
pub mod server;
pub mod helpers;
pub mod utils;
#[cfg(test)]
mod tests;


pub use crate::cache::token::TokenRecord;
pub use crate::cache::token_manager::TokenManager;
pub use crate::sources::error::FetchError;
