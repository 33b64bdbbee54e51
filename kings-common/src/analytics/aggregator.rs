use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use super::metrics::ratio_or_zero;
use crate::data::types::{DataError, RatedToken, Rating, RatingFilter, StateRecord};

// =================================================================
// Aggregated rows
// =================================================================

/// Statistics of one lifecycle state across every contributing token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedRow {
    pub state: i64,
    #[serde(rename = "statebenchmark")]
    pub state_label: String,
    /// Rating of the first token seen at this state, for display only
    pub rating: Rating,
    pub tx_count: u64,
    pub buy_count: u64,
    pub sell_count: u64,
    pub total_sol_volume: f64,
    pub buy_volume: f64,
    pub sell_volume: f64,
    pub tx_speed: f64,
    /// Mean reserve observed at this state across contributing tokens
    pub real_sol_reserves: f64,
    pub maker_count: u64,
    pub avg_maker_per_token: f64,
    pub holder_count: u64,
    pub avg_holder_per_token: f64,
    /// Seconds
    pub avg_time_before_state_change: f64,
    pub token_count: usize,
}

impl AggregatedRow {
    fn empty(record: &StateRecord, rating: Rating) -> Self {
        Self {
            state: record.state,
            state_label: record.state_label.clone(),
            rating,
            tx_count: 0,
            buy_count: 0,
            sell_count: 0,
            total_sol_volume: 0.0,
            buy_volume: 0.0,
            sell_volume: 0.0,
            tx_speed: 0.0,
            real_sol_reserves: 0.0,
            maker_count: 0,
            avg_maker_per_token: 0.0,
            holder_count: 0,
            avg_holder_per_token: 0.0,
            avg_time_before_state_change: 0.0,
            token_count: 0,
        }
    }

    fn accumulate(&mut self, record: &StateRecord) {
        self.tx_count += record.tx_count;
        self.buy_count += record.buy_count;
        self.sell_count += record.sell_count;
        self.total_sol_volume += record.total_sol_volume;
        self.buy_volume += record.buy_volume;
        self.sell_volume += record.sell_volume;
        self.real_sol_reserves += record.real_sol_reserves;
        self.maker_count += record.maker_count;
        self.holder_count += record.holder_count;
        self.avg_time_before_state_change += record.time_before_state;
        self.token_count += 1;
    }

    /// Turns the accumulated sums into per-token averages and rates
    fn finalize(&mut self) {
        if self.token_count > 0 {
            let tokens = self.token_count as f64;
            self.real_sol_reserves /= tokens;
            self.avg_maker_per_token = self.maker_count as f64 / tokens;
            self.avg_holder_per_token = self.holder_count as f64 / tokens;
            self.avg_time_before_state_change /= tokens;
        }
        self.tx_speed = ratio_or_zero(self.tx_count as f64, self.total_sol_volume);
    }
}

/// Tokens taking part in analytics for the given filter.
///
/// Tokens rated outside {1, 3} never count, not even under `all`.
pub fn analytic_tokens(
    tokens: &[RatedToken],
    filter: RatingFilter,
) -> impl Iterator<Item = (&RatedToken, Rating)> {
    tokens.iter().filter_map(move |token| {
        token
            .analytic_rating()
            .filter(|rating| filter.accepts(*rating))
            .map(|rating| (token, rating))
    })
}

/// Groups every state reached by the selected tokens into one row per state.
///
/// Rows come back in order of first occurrence. The input is not touched, so
/// repeated calls on the same slice give identical results.
pub fn aggregate_by_state(tokens: &[RatedToken], filter: RatingFilter) -> Vec<AggregatedRow> {
    let mut rows: Vec<AggregatedRow> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    for (token, rating) in analytic_tokens(tokens, filter) {
        for record in &token.states {
            let slot = *index.entry(record.state).or_insert_with(|| {
                rows.push(AggregatedRow::empty(record, rating));
                rows.len() - 1
            });
            rows[slot].accumulate(record);
        }
    }

    for row in rows.iter_mut() {
        row.finalize();
    }

    debug!(
        "Aggregated {} tokens into {} state rows (filter={})",
        tokens.len(),
        rows.len(),
        filter
    );
    rows
}

// =================================================================
// Sorting
// =================================================================

/// Sortable columns of the state table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortColumn {
    State,
    #[serde(rename = "statebenchmark")]
    StateLabel,
    Rating,
    TxCount,
    BuyCount,
    SellCount,
    TotalSolVolume,
    BuyVolume,
    SellVolume,
    TxSpeed,
    RealSolReserves,
    MakerCount,
    AvgMakerPerToken,
    HolderCount,
    AvgHolderPerToken,
    AvgTimeBeforeStateChange,
    TokenCount,
}

impl SortColumn {
    pub const ALL: [SortColumn; 17] = [
        SortColumn::State,
        SortColumn::StateLabel,
        SortColumn::Rating,
        SortColumn::TxCount,
        SortColumn::BuyCount,
        SortColumn::SellCount,
        SortColumn::TotalSolVolume,
        SortColumn::BuyVolume,
        SortColumn::SellVolume,
        SortColumn::TxSpeed,
        SortColumn::RealSolReserves,
        SortColumn::MakerCount,
        SortColumn::AvgMakerPerToken,
        SortColumn::HolderCount,
        SortColumn::AvgHolderPerToken,
        SortColumn::AvgTimeBeforeStateChange,
        SortColumn::TokenCount,
    ];

    pub fn key(self) -> &'static str {
        match self {
            SortColumn::State => "state",
            SortColumn::StateLabel => "statebenchmark",
            SortColumn::Rating => "rating",
            SortColumn::TxCount => "txCount",
            SortColumn::BuyCount => "buyCount",
            SortColumn::SellCount => "sellCount",
            SortColumn::TotalSolVolume => "totalSolVolume",
            SortColumn::BuyVolume => "buyVolume",
            SortColumn::SellVolume => "sellVolume",
            SortColumn::TxSpeed => "txSpeed",
            SortColumn::RealSolReserves => "realSolReserves",
            SortColumn::MakerCount => "makerCount",
            SortColumn::AvgMakerPerToken => "avgMakerPerToken",
            SortColumn::HolderCount => "holderCount",
            SortColumn::AvgHolderPerToken => "avgHolderPerToken",
            SortColumn::AvgTimeBeforeStateChange => "avgTimeBeforeStateChange",
            SortColumn::TokenCount => "tokenCount",
        }
    }

    /// Numeric sort key; `None` for the text column
    fn numeric(self, row: &AggregatedRow) -> Option<f64> {
        let value = match self {
            SortColumn::State => row.state as f64,
            SortColumn::StateLabel => return None,
            SortColumn::Rating => row.rating.value() as f64,
            SortColumn::TxCount => row.tx_count as f64,
            SortColumn::BuyCount => row.buy_count as f64,
            SortColumn::SellCount => row.sell_count as f64,
            SortColumn::TotalSolVolume => row.total_sol_volume,
            SortColumn::BuyVolume => row.buy_volume,
            SortColumn::SellVolume => row.sell_volume,
            SortColumn::TxSpeed => row.tx_speed,
            SortColumn::RealSolReserves => row.real_sol_reserves,
            SortColumn::MakerCount => row.maker_count as f64,
            SortColumn::AvgMakerPerToken => row.avg_maker_per_token,
            SortColumn::HolderCount => row.holder_count as f64,
            SortColumn::AvgHolderPerToken => row.avg_holder_per_token,
            SortColumn::AvgTimeBeforeStateChange => row.avg_time_before_state_change,
            SortColumn::TokenCount => row.token_count as f64,
        };
        Some(value)
    }

    pub fn compare(self, a: &AggregatedRow, b: &AggregatedRow) -> Ordering {
        match (self.numeric(a), self.numeric(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => a.state_label.cmp(&b.state_label),
        }
    }
}

impl FromStr for SortColumn {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortColumn::ALL
            .iter()
            .copied()
            .find(|column| column.key() == s)
            .ok_or_else(|| DataError::UnknownColumn(s.to_string()))
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl FromStr for SortDirection {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(DataError::Validation(format!(
                "Sort direction must be asc or desc, got '{}'",
                other
            ))),
        }
    }
}

/// Column plus direction, as driven by the table headers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            column: SortColumn::State,
            direction: SortDirection::Asc,
        }
    }
}

impl SortSpec {
    /// Header click: the active column flips direction, any other column
    /// becomes active in ascending order.
    pub fn select(self, column: SortColumn) -> Self {
        if self.column == column {
            Self {
                column,
                direction: self.direction.toggled(),
            }
        } else {
            Self {
                column,
                direction: SortDirection::Asc,
            }
        }
    }
}

/// Returns a sorted copy of `rows`. Ties keep their incoming order.
pub fn sort_rows(rows: &[AggregatedRow], spec: SortSpec) -> Vec<AggregatedRow> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| match spec.direction {
        SortDirection::Asc => spec.column.compare(a, b),
        SortDirection::Desc => spec.column.compare(b, a),
    });
    sorted
}
