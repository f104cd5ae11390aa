// src/config.rs

use std::env;
use std::net::SocketAddr;

use dotenvy::dotenv;

use crate::scoring::ScoringPolicy;

/// Default page size for submission listings.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Upper bound for a single listing page.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// How many times a submission insert is retried after an attempt number conflict.
pub const ATTEMPT_INSERT_RETRIES: usize = 3;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub rust_log: String,
    /// Redis connection string. When absent an in-process cache is used.
    pub redis_url: Option<String>,
    /// Prefix shared by every cache key written by this service.
    pub cache_namespace: String,
    pub scoring_policy: ScoringPolicy,
    pub bind_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let redis_url = env::var("REDIS_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let cache_namespace = env::var("CACHE_NAMESPACE")
            .unwrap_or_else(|_| "cache".to_string());

        let scoring_policy: ScoringPolicy = env::var("SCORING_POLICY")
            .map(|raw| raw.parse().expect("SCORING_POLICY must be 'lenient' or 'strict'"))
            .unwrap_or_default();

        let bind_addr: SocketAddr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()
            .expect("BIND_ADDR must be a socket address");

        Self {
            database_url,
            jwt_secret,
            rust_log,
            redis_url,
            cache_namespace,
            scoring_policy,
            bind_addr,
        }
    }
}
