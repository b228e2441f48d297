//! Sources module
//!
//! The upstream side of the proxy: one trait seam for "go and get a fresh
//! token" and the OAuth2 client-credentials implementation behind it.

use futures::future::BoxFuture;

use crate::cache::token::TokenRecord;
use crate::sources::error::FetchError;

pub mod credentials;
pub mod error;
pub mod oauth2;

pub trait FetchToken: Send + Sync {
    /// Perform one upstream exchange. No caching, no retries.
    fn fetch_token(&self) -> BoxFuture<'_, Result<TokenRecord, FetchError>>;
}
