// kings-core/src/api/types.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use kings_common::data::StateRecord;

/// Tri-state migration filter. `All` is never sent to the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MigratedFilter {
    #[serde(rename = "all")]
    All,
    #[serde(rename = "true")]
    Yes,
    #[default]
    #[serde(rename = "false")]
    No,
}

impl MigratedFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            MigratedFilter::All => "all",
            MigratedFilter::Yes => "true",
            MigratedFilter::No => "false",
        }
    }
}

impl FromStr for MigratedFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "all" | "" => Ok(MigratedFilter::All),
            "true" | "yes" => Ok(MigratedFilter::Yes),
            "false" | "no" => Ok(MigratedFilter::No),
            other => Err(format!("Invalid migrated filter: {}", other)),
        }
    }
}

/// Look-back windows offered by the filter bar (milliseconds)
pub const TIME_RANGES: [(&str, Option<u64>); 8] = [
    ("All", None),
    ("Last 10 minutes", Some(10 * 60 * 1000)),
    ("Last 30 minutes", Some(30 * 60 * 1000)),
    ("Last hour", Some(60 * 60 * 1000)),
    ("Last 3 hours", Some(3 * 60 * 60 * 1000)),
    ("Last 6 hours", Some(6 * 60 * 60 * 1000)),
    ("Last 12 hours", Some(12 * 60 * 60 * 1000)),
    ("Last 24 hours", Some(24 * 60 * 60 * 1000)),
];

/// Label of a look-back window; windows off the preset list are shown in minutes
pub fn time_range_label(min_date: Option<u64>) -> String {
    TIME_RANGES
        .iter()
        .find(|(_, window)| *window == min_date)
        .map(|(label, _)| label.to_string())
        .unwrap_or_else(|| format!("Last {} minutes", min_date.unwrap_or(0) / 60_000))
}

/// Leaderboard filters sent as query parameters on `GET /tokens`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filters {
    /// Look-back window in milliseconds
    pub min_date: Option<u64>,
    pub max_date: Option<u64>,
    pub migrated: MigratedFilter,
    pub min_holders: Option<u64>,
    pub max_holders: Option<u64>,
    pub min_trades: Option<u64>,
    pub max_trades: Option<u64>,
    pub min_volume: Option<f64>,
    pub max_volume: Option<f64>,
    pub min_sol_reserve: Option<f64>,
    pub max_sol_reserve: Option<f64>,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            min_date: Some(30 * 60 * 1000),
            max_date: None,
            migrated: MigratedFilter::No,
            min_holders: Some(25),
            max_holders: None,
            min_trades: Some(25),
            max_trades: None,
            min_volume: Some(20.0),
            max_volume: None,
            min_sol_reserve: Some(10.0),
            max_sol_reserve: None,
        }
    }
}

impl Filters {
    /// No constraint at all
    pub fn none() -> Self {
        Self {
            min_date: None,
            max_date: None,
            migrated: MigratedFilter::All,
            min_holders: None,
            max_holders: None,
            min_trades: None,
            max_trades: None,
            min_volume: None,
            max_volume: None,
            min_sol_reserve: None,
            max_sol_reserve: None,
        }
    }

    /// Query parameters in the API's camelCase names; unset fields are omitted
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        push_param(&mut query, "minDate", self.min_date);
        push_param(&mut query, "maxDate", self.max_date);
        if self.migrated != MigratedFilter::All {
            query.push(("migrated", self.migrated.as_str().to_string()));
        }
        push_param(&mut query, "minHolders", self.min_holders);
        push_param(&mut query, "maxHolders", self.max_holders);
        push_param(&mut query, "minTrades", self.min_trades);
        push_param(&mut query, "maxTrades", self.max_trades);
        push_param(&mut query, "minVolume", self.min_volume);
        push_param(&mut query, "maxVolume", self.max_volume);
        push_param(&mut query, "minSolReserve", self.min_sol_reserve);
        push_param(&mut query, "maxSolReserve", self.max_sol_reserve);
        query
    }

    /// Sets one field from its query name. An empty value or `all` clears it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        let value = value.trim();
        let clear = value.is_empty() || value == "all";

        if key == "migrated" {
            self.migrated = if clear { MigratedFilter::All } else { value.parse()? };
            return Ok(());
        }

        match key {
            "minDate" => self.min_date = parse_opt(key, value, clear)?,
            "maxDate" => self.max_date = parse_opt(key, value, clear)?,
            "minHolders" => self.min_holders = parse_opt(key, value, clear)?,
            "maxHolders" => self.max_holders = parse_opt(key, value, clear)?,
            "minTrades" => self.min_trades = parse_opt(key, value, clear)?,
            "maxTrades" => self.max_trades = parse_opt(key, value, clear)?,
            "minVolume" => self.min_volume = parse_opt(key, value, clear)?,
            "maxVolume" => self.max_volume = parse_opt(key, value, clear)?,
            "minSolReserve" => self.min_sol_reserve = parse_opt(key, value, clear)?,
            "maxSolReserve" => self.max_sol_reserve = parse_opt(key, value, clear)?,
            other => return Err(format!("Unknown filter: {}", other)),
        }
        Ok(())
    }
}

fn push_param<T: ToString>(query: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<T>) {
    if let Some(v) = value {
        query.push((key, v.to_string()));
    }
}

fn parse_opt<T: FromStr>(key: &str, value: &str, clear: bool) -> Result<Option<T>, String> {
    if clear {
        return Ok(None);
    }
    value
        .parse::<T>()
        .map(Some)
        .map_err(|_| format!("Invalid value for {}: {}", key, value))
}

// =================================================================
// Evaluation payloads
// =================================================================

/// Which progress queue is served: first evaluation or re-evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalMode {
    Eval,
    Reval,
}

impl EvalMode {
    pub fn path(self) -> &'static str {
        match self {
            EvalMode::Eval => "eval",
            EvalMode::Reval => "reval",
        }
    }
}

impl fmt::Display for EvalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRatingRequest {
    pub token: String,
    pub rating: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRatingRequest {
    pub mint: String,
    pub rating: u8,
}

/// A token's progress waiting for an operator verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvaluation {
    pub mint: String,
    #[serde(default)]
    pub progress: Vec<StateRecord>,
    /// Model rating shown next to the stars
    #[serde(default)]
    pub rating_overall: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_query() {
        let query = Filters::default().to_query();
        assert_eq!(
            query,
            vec![
                ("minDate", "1800000".to_string()),
                ("migrated", "false".to_string()),
                ("minHolders", "25".to_string()),
                ("minTrades", "25".to_string()),
                ("minVolume", "20".to_string()),
                ("minSolReserve", "10".to_string()),
            ]
        );
    }

    #[test]
    fn test_time_range_labels() {
        assert_eq!(time_range_label(None), "All");
        assert_eq!(time_range_label(Some(30 * 60 * 1000)), "Last 30 minutes");
        assert_eq!(time_range_label(Some(45 * 60 * 1000)), "Last 45 minutes");
    }

    #[test]
    fn test_empty_filters_send_nothing() {
        assert!(Filters::none().to_query().is_empty());
    }

    #[test]
    fn test_set_and_clear() {
        let mut filters = Filters::none();
        filters.set("maxHolders", "500").unwrap();
        filters.set("migrated", "true").unwrap();
        assert_eq!(filters.max_holders, Some(500));
        assert_eq!(filters.migrated, MigratedFilter::Yes);

        filters.set("maxHolders", "").unwrap();
        filters.set("migrated", "all").unwrap();
        assert_eq!(filters, Filters::none());

        assert!(filters.set("minVolume", "lots").is_err());
        assert!(filters.set("marketCap", "1").is_err());
    }

    #[test]
    fn test_progress_evaluation_wire_format() {
        let json = r#"{"mint":"m1","progress":[{"state":10,"tx_count":4}],"rating_overall":2}"#;
        let eval: ProgressEvaluation = serde_json::from_str(json).unwrap();
        assert_eq!(eval.progress.len(), 1);
        assert_eq!(eval.rating_overall, 2.0);
        assert_eq!(EvalMode::Reval.path(), "reval");
    }
}
