use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

// =================================================================
// Errors
// =================================================================

/// Errors raised by the pure data layer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Invalid rating: {0}")]
    InvalidRating(i64),

    #[error("Invalid rating filter: {0}")]
    InvalidRatingFilter(String),

    #[error("Unknown sort column: {0}")]
    UnknownColumn(String),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type DataResult<T> = Result<T, DataError>;

// =================================================================
// Lenient wire decoding
// =================================================================

/// `null` decodes as the type's default
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Counters may arrive as `12`, `12.0` or `null`; negatives and non-finite values give 0
fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(|v| v.round() as u64)
        .unwrap_or(0))
}

// =================================================================
// State records
// =================================================================

/// One token's metrics snapshot at one lifecycle checkpoint.
///
/// Counters are delivered by the upstream indexer and are not cross-checked:
/// `tx_count` is usually `buy_count + sell_count` and `total_sol_volume` is
/// usually `buy_volume + sell_volume`, but noisy rows are kept as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateRecord {
    #[serde(rename = "statebenchmark", deserialize_with = "null_as_default")]
    pub state_label: String,
    #[serde(deserialize_with = "null_as_default")]
    pub state: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub mint: String,
    /// Seconds since epoch
    #[serde(deserialize_with = "null_as_default")]
    pub timestamp: i64,
    /// Seconds elapsed since the previous state was reached
    #[serde(deserialize_with = "null_as_default")]
    pub time_before_state: f64,

    #[serde(deserialize_with = "lenient_count")]
    pub buy_count: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub sell_count: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub tx_count: u64,

    #[serde(deserialize_with = "null_as_default")]
    pub total_sol_volume: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub buy_volume: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub sell_volume: f64,

    #[serde(deserialize_with = "null_as_default")]
    pub real_sol_reserves: f64,

    #[serde(deserialize_with = "lenient_count")]
    pub maker_count: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub holder_count: u64,
}

impl StateRecord {
    pub fn reached_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.timestamp, 0).single()
    }
}

// =================================================================
// Ratings
// =================================================================

/// Ratings recognised by the analytics pages.
///
/// The training pages hand out other values too (1..=5 for tokens), those
/// tokens never reach aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Rating {
    One,
    Three,
}

impl Rating {
    pub const ALL: [Rating; 2] = [Rating::One, Rating::Three];

    pub fn value(self) -> i64 {
        match self {
            Rating::One => 1,
            Rating::Three => 3,
        }
    }
}

impl TryFrom<i64> for Rating {
    type Error = DataError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Rating::One),
            3 => Ok(Rating::Three),
            other => Err(DataError::InvalidRating(other)),
        }
    }
}

impl From<Rating> for i64 {
    fn from(rating: Rating) -> Self {
        rating.value()
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Rating selector of the analytics table: `all`, `1` or `3`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RatingFilter {
    #[default]
    All,
    Only(Rating),
}

impl RatingFilter {
    pub fn accepts(&self, rating: Rating) -> bool {
        match self {
            RatingFilter::All => true,
            RatingFilter::Only(wanted) => *wanted == rating,
        }
    }

    /// Caption used under the analytics table
    pub fn caption(&self) -> String {
        match self {
            RatingFilter::All => "1 and 3".to_string(),
            RatingFilter::Only(rating) => rating.to_string(),
        }
    }
}

impl std::str::FromStr for RatingFilter {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "all" | "" => Ok(RatingFilter::All),
            other => other
                .parse::<i64>()
                .map_err(|_| DataError::InvalidRatingFilter(other.to_string()))
                .and_then(Rating::try_from)
                .map(RatingFilter::Only),
        }
    }
}

impl TryFrom<String> for RatingFilter {
    type Error = DataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RatingFilter> for String {
    fn from(filter: RatingFilter) -> Self {
        filter.to_string()
    }
}

impl fmt::Display for RatingFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatingFilter::All => write!(f, "all"),
            RatingFilter::Only(rating) => write!(f, "{}", rating),
        }
    }
}

/// A token with its state history and the operator's rating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatedToken {
    pub mint: String,
    /// Raw rating as delivered by the API
    pub rating: i64,
    #[serde(default)]
    pub states: Vec<StateRecord>,
}

impl RatedToken {
    /// Typed rating, `None` when the token is outside the analytic scale
    pub fn analytic_rating(&self) -> Option<Rating> {
        Rating::try_from(self.rating).ok()
    }
}

// =================================================================
// Leaderboard summaries
// =================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetadata {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub show_name: Option<bool>,
    pub created_on: Option<String>,
    pub twitter: Option<String>,
    pub website: Option<String>,
}

/// Leaderboard-facing view of a token, as served by `GET /tokens`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenSummary {
    #[serde(deserialize_with = "null_as_default")]
    pub mint: String,
    #[serde(deserialize_with = "null_as_default")]
    pub user: String,
    #[serde(deserialize_with = "null_as_default")]
    pub bonding_curve: String,
    pub metadata: Option<TokenMetadata>,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub symbol: String,
    #[serde(rename = "metadata_uri")]
    pub metadata_uri: Option<String>,
    #[serde(deserialize_with = "lenient_count")]
    pub holders_count: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub trade_count: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub volume: f64,
    #[serde(deserialize_with = "lenient_count")]
    pub buy_count: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub sell_count: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub buy_volume: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub sell_volume: f64,
    /// Milliseconds since epoch
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub migrated: bool,
    pub migrated_at: Option<i64>,
    #[serde(rename = "sol_reserve", deserialize_with = "null_as_default")]
    pub sol_reserve: f64,
    /// Operator rating shown in the list, when the token was already rated
    pub rating: Option<i64>,
    /// Model rating shown in the list
    pub overall: Option<i64>,
}

impl TokenSummary {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "Unknown Token"
        } else {
            &self.name
        }
    }

    pub fn display_symbol(&self) -> &str {
        if self.symbol.is_empty() {
            "N/A"
        } else {
            &self.symbol
        }
    }

    pub fn image(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.image.as_deref())
    }
}
