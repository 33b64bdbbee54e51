use serde::{Deserialize, Serialize};
use tracing::debug;

use super::aggregator::AggregatedRow;
use crate::data::types::DataError;

/// A row is anomalous when its value exceeds this multiple of the cross-row mean
pub const ANOMALY_THRESHOLD: f64 = 1.5;

/// Metrics watched by the detector, in check order. Serialized by label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TrackedMetric {
    TxCount,
    SolVolume,
    TxSpeed,
}

impl TrackedMetric {
    pub const ALL: [TrackedMetric; 3] = [
        TrackedMetric::TxCount,
        TrackedMetric::SolVolume,
        TrackedMetric::TxSpeed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TrackedMetric::TxCount => "Transaction Count",
            TrackedMetric::SolVolume => "SOL Volume",
            TrackedMetric::TxSpeed => "Transaction Speed",
        }
    }

    fn read(self, row: &AggregatedRow) -> f64 {
        match self {
            TrackedMetric::TxCount => row.tx_count as f64,
            TrackedMetric::SolVolume => row.total_sol_volume,
            TrackedMetric::TxSpeed => row.tx_speed,
        }
    }
}

impl TryFrom<String> for TrackedMetric {
    type Error = DataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TrackedMetric::ALL
            .into_iter()
            .find(|metric| metric.label() == value)
            .ok_or(DataError::UnknownMetric(value))
    }
}

impl From<TrackedMetric> for String {
    fn from(metric: TrackedMetric) -> Self {
        metric.label().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub state: i64,
    pub metric: TrackedMetric,
    pub value: f64,
    pub avg: f64,
}

impl Anomaly {
    pub fn metric_label(&self) -> &'static str {
        self.metric.label()
    }
}

/// Flags every (row, metric) pair above `ANOMALY_THRESHOLD` times the mean
/// of that metric across `rows`.
///
/// Output follows row order, then metric order within a row.
pub fn find_anomalies(rows: &[AggregatedRow]) -> Vec<Anomaly> {
    if rows.is_empty() {
        return Vec::new();
    }

    let n = rows.len() as f64;
    let averages = TrackedMetric::ALL.map(|metric| {
        let sum: f64 = rows.iter().map(|row| metric.read(row)).sum();
        (metric, sum / n)
    });

    let anomalies: Vec<Anomaly> = rows
        .iter()
        .flat_map(|row| {
            averages.iter().filter_map(move |&(metric, avg)| {
                let value = metric.read(row);
                (value > avg * ANOMALY_THRESHOLD).then(|| Anomaly {
                    state: row.state,
                    metric,
                    value,
                    avg,
                })
            })
        })
        .collect();

    debug!("Found {} anomalies across {} rows", anomalies.len(), rows.len());
    anomalies
}
