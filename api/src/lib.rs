//! User management HTTP API.
//!
//! Accounts, bearer-token sessions, search, paginated listing, per-client
//! rate limiting, and aggregate statistics on top of SQLite.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod pagination;
pub mod rate_limit;
pub mod rest;

use std::sync::Arc;
use std::time::Instant;

use jsonwebtoken::{DecodingKey, EncodingKey};
use sqlx::sqlite::SqlitePool;

use crate::config::Config;
use crate::rate_limit::RateLimiter;

pub use rest::router;

pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub encoding_key: EncodingKey,
    pub decoding_key: DecodingKey,
    pub config: Arc<Config>,
    pub limiter: Arc<RateLimiter>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(db: SqlitePool, config: Config) -> Self {
        let secret = config.jwt_secret.as_bytes();
        Self {
            db,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            limiter: Arc::new(RateLimiter::new(config.rate_limit_max, config.rate_limit_window)),
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }
}
