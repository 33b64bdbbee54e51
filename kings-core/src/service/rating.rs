// service/rating.rs
// Operator ratings: whole tokens and state progress

use std::ops::RangeInclusive;
use std::sync::Arc;
use tracing::{info, warn};

use kings_common::data::DataError;

use super::errors::ServiceError;
use crate::api::{EvalMode, ProgressEvaluation, TokenApi};

/// Star scale of the token rater
pub const TOKEN_RATING_SCALE: RangeInclusive<u8> = 1..=5;

/// Star scale of the progress rater
pub const PROGRESS_RATING_SCALE: RangeInclusive<u8> = 1..=3;

fn check_scale(rating: u8, scale: &RangeInclusive<u8>) -> Result<u8, DataError> {
    if scale.contains(&rating) {
        Ok(rating)
    } else {
        Err(DataError::InvalidRating(rating as i64))
    }
}

pub fn validate_token_rating(rating: u8) -> Result<u8, DataError> {
    check_scale(rating, &TOKEN_RATING_SCALE)
}

pub fn validate_progress_rating(rating: u8) -> Result<u8, DataError> {
    check_scale(rating, &PROGRESS_RATING_SCALE)
}

pub struct RatingService {
    api: Arc<dyn TokenApi>,
}

impl RatingService {
    pub fn new(api: Arc<dyn TokenApi>) -> Self {
        Self { api }
    }

    /// Head of the token evaluation queue
    pub async fn next_token(&self) -> Result<Option<String>, ServiceError> {
        let queue = self.api.tokens_to_evaluate().await?;
        Ok(queue.into_iter().next())
    }

    /// Submits a token rating.
    ///
    /// Out-of-scale ratings are rejected without a request. A failed
    /// submission is logged and reported as `Ok(false)`; the caller moves on
    /// to the next token either way.
    pub async fn rate_token(&self, token: &str, rating: u8) -> Result<bool, ServiceError> {
        let rating = validate_token_rating(rating)?;
        match self.api.submit_token_rating(token, rating).await {
            Ok(()) => {
                info!("Rated token {} with {}", token, rating);
                Ok(true)
            }
            Err(e) => {
                warn!("Failed to submit rating for {}: {}", token, e);
                Ok(false)
            }
        }
    }

    /// Next progress to rate in `mode`'s queue
    pub async fn next_progress(&self, mode: EvalMode) -> Result<ProgressEvaluation, ServiceError> {
        Ok(self.api.progress_to_evaluate(mode).await?)
    }

    /// Submits a progress rating; same failure handling as `rate_token`
    pub async fn rate_progress(
        &self,
        mode: EvalMode,
        mint: &str,
        rating: u8,
    ) -> Result<bool, ServiceError> {
        let rating = validate_progress_rating(rating)?;
        match self.api.submit_progress_rating(mode, mint, rating).await {
            Ok(()) => {
                info!("Rated {} progress of {} with {}", mode, mint, rating);
                Ok(true)
            }
            Err(e) => {
                warn!("Failed to submit {} rating for {}: {}", mode, mint, e);
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockTokenApi;
    use std::sync::Mutex;

    fn api_with_queue(mints: &[&str]) -> Arc<MockTokenApi> {
        Arc::new(MockTokenApi {
            eval_queue: Mutex::new(mints.iter().map(|m| m.to_string()).collect()),
            ..Default::default()
        })
    }

    #[test]
    fn test_rating_scales() {
        assert!(validate_token_rating(0).is_err());
        assert_eq!(validate_token_rating(5), Ok(5));
        assert!(validate_token_rating(6).is_err());

        assert_eq!(validate_progress_rating(1), Ok(1));
        assert_eq!(validate_progress_rating(4), Err(DataError::InvalidRating(4)));
    }

    #[tokio::test]
    async fn test_rate_token_advances_queue() {
        let api = api_with_queue(&["m1", "m2"]);
        let service = RatingService::new(api.clone());

        let current = service.next_token().await.unwrap().unwrap();
        assert_eq!(current, "m1");
        assert!(service.rate_token(&current, 4).await.unwrap());
        assert_eq!(service.next_token().await.unwrap().as_deref(), Some("m2"));

        let submissions = api.submissions.lock().unwrap().clone();
        assert_eq!(submissions, vec![("eval/token".to_string(), "m1".to_string(), 4)]);
    }

    #[tokio::test]
    async fn test_out_of_scale_sends_nothing() {
        let api = api_with_queue(&["m1"]);
        let service = RatingService::new(api.clone());

        let result = service.rate_token("m1", 9).await;
        assert!(matches!(result, Err(ServiceError::Data(DataError::InvalidRating(9)))));
        let result = service.rate_progress(EvalMode::Eval, "m1", 5).await;
        assert!(result.is_err());
        assert!(api.submissions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_submission_is_not_an_error() {
        let api = api_with_queue(&["m1"]);
        api.set_failing(true);
        let service = RatingService::new(api.clone());

        assert!(!service.rate_token("m1", 3).await.unwrap());
        assert!(!service.rate_progress(EvalMode::Reval, "m1", 2).await.unwrap());
    }

    #[tokio::test]
    async fn test_progress_queue() {
        let api = Arc::new(MockTokenApi {
            progress_queue: Mutex::new(vec![ProgressEvaluation {
                mint: "p1".to_string(),
                progress: Vec::new(),
                rating_overall: 2.0,
            }]),
            ..Default::default()
        });
        let service = RatingService::new(api.clone());

        let next = service.next_progress(EvalMode::Reval).await.unwrap();
        assert_eq!(next.mint, "p1");
        assert!(service.rate_progress(EvalMode::Reval, "p1", 3).await.unwrap());
        assert!(service.next_progress(EvalMode::Reval).await.is_err());
        assert_eq!(
            api.submissions.lock().unwrap()[0],
            ("reval/state".to_string(), "p1".to_string(), 3)
        );
    }
}
