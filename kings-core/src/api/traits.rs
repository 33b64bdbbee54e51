// kings-core/src/api/traits.rs

use async_trait::async_trait;
use kings_common::data::{RatedToken, StateRecord, TokenSummary};

use crate::api::errors::ApiError;
use crate::api::types::{EvalMode, Filters, ProgressEvaluation};

/// The Token Kings backend as seen by the client
#[async_trait]
pub trait TokenApi: Send + Sync {
    /// Leaderboard tokens matching `filters`
    async fn list_tokens(&self, filters: &Filters) -> Result<Vec<TokenSummary>, ApiError>;

    /// State history of one token
    async fn token_states(&self, mint: &str) -> Result<Vec<StateRecord>, ApiError>;

    /// Mints waiting for a first rating, oldest first
    async fn tokens_to_evaluate(&self) -> Result<Vec<String>, ApiError>;

    async fn submit_token_rating(&self, token: &str, rating: u8) -> Result<(), ApiError>;

    /// Next progress to rate in the given queue
    async fn progress_to_evaluate(&self, mode: EvalMode) -> Result<ProgressEvaluation, ApiError>;

    async fn submit_progress_rating(
        &self,
        mode: EvalMode,
        mint: &str,
        rating: u8,
    ) -> Result<(), ApiError>;

    /// Every rated token with its full state history
    async fn rated_tokens(&self) -> Result<Vec<RatedToken>, ApiError>;
}
