use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::metrics::{catalog, MetricDef, MetricKind};
use crate::data::types::{DataError, RatedToken, Rating};

/// Lifecycle checkpoints covered by the distribution grid
pub const GRID_STATES: [i64; 8] = [10, 20, 30, 40, 50, 60, 70, 80];

// =================================================================
// Statistics
// =================================================================

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Middle element of the sorted values, or the mean of the two middle
/// elements for an even count.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

// =================================================================
// Grid
// =================================================================

/// Observations for one (state, metric, rating) triple
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DistributionCell {
    pub avg: Option<f64>,
    pub median: Option<f64>,
    pub values: Vec<f64>,
}

impl DistributionCell {
    fn push(&mut self, value: f64) {
        self.values.push(value);
    }

    fn finalize(&mut self) {
        self.avg = mean(&self.values);
        self.median = median(&self.values);
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One metric at one state, split by rating
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionRow {
    pub state: i64,
    pub metric: &'static MetricDef,
    pub rating_one: DistributionCell,
    pub rating_three: DistributionCell,
}

impl DistributionRow {
    pub fn cell(&self, rating: Rating) -> &DistributionCell {
        match rating {
            Rating::One => &self.rating_one,
            Rating::Three => &self.rating_three,
        }
    }

    fn cell_mut(&mut self, rating: Rating) -> &mut DistributionCell {
        match rating {
            Rating::One => &mut self.rating_one,
            Rating::Three => &mut self.rating_three,
        }
    }
}

/// Mean and median of every catalog metric per grid state and rating.
///
/// Rows are stored state-major in `GRID_STATES` order, metrics in catalog
/// order within a state.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionGrid {
    rows: Vec<DistributionRow>,
}

impl DistributionGrid {
    fn empty() -> Self {
        let rows = GRID_STATES
            .iter()
            .flat_map(|&state| {
                catalog().map(move |metric| DistributionRow {
                    state,
                    metric,
                    rating_one: DistributionCell::default(),
                    rating_three: DistributionCell::default(),
                })
            })
            .collect();
        Self { rows }
    }

    /// Builds the grid from every individual state observation.
    ///
    /// Tokens rated outside {1, 3} and states outside the grid are skipped.
    pub fn build(tokens: &[RatedToken]) -> Self {
        let mut grid = Self::empty();
        let metrics_per_state = catalog().count();

        for token in tokens {
            let Some(rating) = token.analytic_rating() else {
                continue;
            };
            for record in &token.states {
                let Some(state_idx) = GRID_STATES.iter().position(|&s| s == record.state) else {
                    continue;
                };
                let base = state_idx * metrics_per_state;
                for (offset, metric) in catalog().enumerate() {
                    grid.rows[base + offset]
                        .cell_mut(rating)
                        .push(metric.value(record));
                }
            }
        }

        for row in grid.rows.iter_mut() {
            row.rating_one.finalize();
            row.rating_three.finalize();
        }
        grid
    }

    pub fn rows(&self) -> &[DistributionRow] {
        &self.rows
    }

    pub fn get(&self, state: i64, metric_key: &str) -> Option<&DistributionRow> {
        self.rows
            .iter()
            .find(|row| row.state == state && row.metric.key == metric_key)
    }

    /// Subset selected by the page filters; the grid itself is unchanged
    pub fn view(&self, states: StateFilter, kinds: MetricTypeFilter) -> Vec<&DistributionRow> {
        self.rows
            .iter()
            .filter(|row| states.accepts(row.state) && kinds.accepts(row.metric.kind))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows
            .iter()
            .all(|row| row.rating_one.is_empty() && row.rating_three.is_empty())
    }
}

// =================================================================
// View filters
// =================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateFilter {
    #[default]
    All,
    Single(i64),
}

impl StateFilter {
    pub fn accepts(&self, state: i64) -> bool {
        match self {
            StateFilter::All => true,
            StateFilter::Single(wanted) => *wanted == state,
        }
    }
}

impl FromStr for StateFilter {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "all" | "" => Ok(StateFilter::All),
            other => other
                .parse::<i64>()
                .map(StateFilter::Single)
                .map_err(|_| DataError::Validation(format!("Invalid state filter: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetricTypeFilter {
    #[default]
    All,
    Basic,
    Derived,
}

impl MetricTypeFilter {
    pub fn accepts(&self, kind: MetricKind) -> bool {
        match self {
            MetricTypeFilter::All => true,
            MetricTypeFilter::Basic => kind == MetricKind::Basic,
            MetricTypeFilter::Derived => kind == MetricKind::Derived,
        }
    }
}

impl FromStr for MetricTypeFilter {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "" => Ok(MetricTypeFilter::All),
            "basic" => Ok(MetricTypeFilter::Basic),
            "derived" => Ok(MetricTypeFilter::Derived),
            other => Err(DataError::Validation(format!(
                "Invalid metric type filter: {}",
                other
            ))),
        }
    }
}
