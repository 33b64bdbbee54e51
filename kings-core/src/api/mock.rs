// In-memory TokenApi used by the service tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use kings_common::data::{RatedToken, StateRecord, TokenSummary};

use super::errors::ApiError;
use super::traits::TokenApi;
use super::types::{EvalMode, Filters, ProgressEvaluation};

#[derive(Default)]
pub struct MockTokenApi {
    pub tokens: Mutex<Vec<TokenSummary>>,
    pub rated: Mutex<Vec<RatedToken>>,
    pub eval_queue: Mutex<Vec<String>>,
    pub progress_queue: Mutex<Vec<ProgressEvaluation>>,
    /// (endpoint, mint, rating) of every accepted submission
    pub submissions: Mutex<Vec<(String, String, u8)>>,
    pub last_filters: Mutex<Option<Filters>>,
    pub fail: AtomicBool,
    pub list_calls: AtomicUsize,
    pub latency: Option<Duration>,
}

impl MockTokenApi {
    pub fn with_tokens(tokens: Vec<TokenSummary>) -> Self {
        Self {
            tokens: Mutex::new(tokens),
            ..Default::default()
        }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), ApiError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(ApiError::NetworkError("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TokenApi for MockTokenApi {
    async fn list_tokens(&self, filters: &Filters) -> Result<Vec<TokenSummary>, ApiError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.check()?;
        *self.last_filters.lock().unwrap() = Some(filters.clone());
        Ok(self.tokens.lock().unwrap().clone())
    }

    async fn token_states(&self, mint: &str) -> Result<Vec<StateRecord>, ApiError> {
        self.check()?;
        Ok(self
            .rated
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.mint == mint)
            .map(|t| t.states.clone())
            .unwrap_or_default())
    }

    async fn tokens_to_evaluate(&self) -> Result<Vec<String>, ApiError> {
        self.check()?;
        Ok(self.eval_queue.lock().unwrap().clone())
    }

    async fn submit_token_rating(&self, token: &str, rating: u8) -> Result<(), ApiError> {
        self.check()?;
        self.eval_queue.lock().unwrap().retain(|m| m != token);
        self.submissions
            .lock()
            .unwrap()
            .push(("eval/token".to_string(), token.to_string(), rating));
        Ok(())
    }

    async fn progress_to_evaluate(&self, mode: EvalMode) -> Result<ProgressEvaluation, ApiError> {
        self.check()?;
        self.progress_queue
            .lock()
            .unwrap()
            .first()
            .cloned()
            .ok_or_else(|| ApiError::EmptyResponse(format!("/tokens/{}/state", mode)))
    }

    async fn submit_progress_rating(
        &self,
        mode: EvalMode,
        mint: &str,
        rating: u8,
    ) -> Result<(), ApiError> {
        self.check()?;
        self.progress_queue.lock().unwrap().retain(|p| p.mint != mint);
        self.submissions
            .lock()
            .unwrap()
            .push((format!("{}/state", mode), mint.to_string(), rating));
        Ok(())
    }

    async fn rated_tokens(&self) -> Result<Vec<RatedToken>, ApiError> {
        self.check()?;
        Ok(self.rated.lock().unwrap().clone())
    }
}
