use std::env;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    /// Postgres holding the `events` table
    pub database_url: String,
    /// JSON document listing feed definitions
    pub feeds_path: String,
    /// Base URL for the API (default feed link, published feed URLs)
    pub api_base_url: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let port: u16 = match env::var("PORT") {
            Ok(p) => p.parse().with_context(|| format!("PORT is not a port number: {}", p))?,
            Err(_) => 8080,
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            feeds_path: env::var("FEEDS_PATH").unwrap_or_else(|_| "feeds.json".to_string()),
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            port,
        })
    }
}
