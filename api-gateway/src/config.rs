//! Application configuration

use std::env;

use aggregation_engine::AggregatorConfig;

/// Application configuration
pub struct AppConfig {
    /// API port
    pub port: u16,
    /// Database URL; in-memory storage when unset
    pub database_url: Option<String>,
    /// Interest-rate source URL; fallback rates when unset
    pub rates_url: Option<String>,
    /// Default aggregation knobs
    pub agg_config: AggregatorConfig,
}

impl AppConfig {
    /// Create a new configuration from environment variables
    pub fn new() -> Self {
        let defaults = AggregatorConfig::default();

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database_url: env::var("DATABASE_URL").ok(),
            rates_url: env::var("RATES_URL").ok(),
            agg_config: AggregatorConfig::new(
                env::var("AGG_PAGE_SIZE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.page_size),
                env::var("AGG_MAX_WORKERS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.max_workers),
            ),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}
