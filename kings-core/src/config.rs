// kings-core/src/config.rs
// Token Kings - Configuration

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::api::types::{Filters, MigratedFilter};
use kings_common::analytics::{SortColumn, SortDirection, SortSpec};
use kings_common::data::RatingFilter;

/// Fallback when neither config file nor environment name an API
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3001";

#[derive(Debug, Deserialize, Clone)]
pub struct Api {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Polling {
    pub enabled: bool,
    pub interval_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Analytics {
    pub rating_filter: RatingFilter,
    pub sort_column: SortColumn,
    pub sort_direction: SortDirection,
}

impl Analytics {
    pub fn sort_spec(&self) -> SortSpec {
        SortSpec {
            column: self.sort_column,
            direction: self.sort_direction,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub api: Api,
    pub polling: Polling,
    pub filters: Filters,
    pub analytics: Analytics,
}

impl Settings {
    /// Defaults, then `config.{toml,json,...}`, then `KINGS__*` variables.
    ///
    /// `KINGS_API_URL` (also read from `.env`) overrides the API base url.
    pub fn new() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let builder = Self::defaults()?
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("KINGS").separator("__"));

        let builder = match std::env::var("KINGS_API_URL") {
            Ok(url) if !url.trim().is_empty() => builder.set_override("api.base_url", url)?,
            _ => builder,
        };

        builder.build()?.try_deserialize()
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let filters = Filters::default();
        Config::builder()
            .set_default("api.base_url", DEFAULT_API_URL)?
            .set_default("api.request_timeout_secs", 30)?
            .set_default("polling.enabled", true)?
            .set_default("polling.interval_ms", 1000)?
            .set_default("filters.migrated", MigratedFilter::No.as_str())?
            .set_default("filters.min_volume", filters.min_volume)?
            .set_default("filters.min_sol_reserve", filters.min_sol_reserve)?
            .set_default("filters.min_date", filters.min_date.map(|v| v as i64))?
            .set_default("filters.min_holders", filters.min_holders.map(|v| v as i64))?
            .set_default("filters.min_trades", filters.min_trades.map(|v| v as i64))?
            .set_default("analytics.rating_filter", "all")?
            .set_default("analytics.sort_column", "state")?
            .set_default("analytics.sort_direction", "asc")
    }

    /// Settings built from defaults only, ignoring files and environment
    pub fn from_defaults() -> Result<Self, ConfigError> {
        Self::defaults()?.build()?.try_deserialize()
    }

    pub fn api_url(&self) -> &str {
        self.api.base_url.trim_end_matches('/')
    }
}
