pub mod aggregator;
pub mod anomaly;
pub mod distribution;
pub mod metrics;

pub use aggregator::{
    aggregate_by_state, sort_rows, AggregatedRow, SortColumn, SortDirection, SortSpec,
};
pub use anomaly::{find_anomalies, Anomaly, TrackedMetric, ANOMALY_THRESHOLD};
pub use distribution::{
    median, DistributionCell, DistributionGrid, DistributionRow, MetricTypeFilter, StateFilter,
    GRID_STATES,
};
pub use metrics::{catalog, get_metric, list_basic_metrics, list_derived_metrics, MetricDef, MetricKind};
