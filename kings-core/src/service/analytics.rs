// service/analytics.rs

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use kings_common::analytics::{
    aggregate_by_state, find_anomalies, sort_rows, AggregatedRow, Anomaly, DistributionGrid,
    SortSpec,
};
use kings_common::data::{RatedToken, RatingFilter};

use super::errors::ServiceError;
use crate::api::TokenApi;

/// Everything the analytics screen shows for one filter and sort order
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsReport {
    pub filter: RatingFilter,
    pub sort: SortSpec,
    /// Aggregated rows in display order
    pub rows: Vec<AggregatedRow>,
    /// Detected over `rows`
    pub anomalies: Vec<Anomaly>,
    pub distribution: DistributionGrid,
    pub token_count: usize,
}

impl AnalyticsReport {
    pub fn build(tokens: &[RatedToken], filter: RatingFilter, sort: SortSpec) -> Self {
        let rows = sort_rows(&aggregate_by_state(tokens, filter), sort);
        let anomalies = if rows.is_empty() {
            Vec::new()
        } else {
            find_anomalies(&rows)
        };

        Self {
            filter,
            sort,
            rows,
            anomalies,
            distribution: DistributionGrid::build(tokens),
            token_count: tokens.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Holds the last rated-token snapshot fetched from the API
pub struct AnalyticsService {
    api: Arc<dyn TokenApi>,
    snapshot: RwLock<Vec<RatedToken>>,
}

impl AnalyticsService {
    pub fn new(api: Arc<dyn TokenApi>) -> Self {
        Self {
            api,
            snapshot: RwLock::new(Vec::new()),
        }
    }

    /// Replaces the snapshot; on failure the previous one stays
    pub async fn refresh(&self) -> Result<usize, ServiceError> {
        match self.api.rated_tokens().await {
            Ok(tokens) => {
                let count = tokens.len();
                *self.snapshot.write().await = tokens;
                info!("Loaded {} rated tokens", count);
                Ok(count)
            }
            Err(e) => {
                warn!("Error fetching analytics data: {}", e);
                Err(e.into())
            }
        }
    }

    pub async fn tokens(&self) -> Vec<RatedToken> {
        self.snapshot.read().await.clone()
    }

    pub async fn report(&self, filter: RatingFilter, sort: SortSpec) -> AnalyticsReport {
        AnalyticsReport::build(&self.snapshot.read().await, filter, sort)
    }
}
