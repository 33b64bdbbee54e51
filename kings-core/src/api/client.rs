// ====
// Token Kings API Client
// ====
// REST implementation of `TokenApi` over reqwest
// ====

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use kings_common::data::{RatedToken, StateRecord, TokenSummary};

use super::errors::ApiError;
use super::traits::TokenApi;
use super::types::{
    EvalMode, Filters, ProgressEvaluation, ProgressRatingRequest, TokenRatingRequest,
};
use crate::config::Settings;

/// Token Kings REST client
pub struct KingsApiClient {
    /// HTTP client
    client: Client,
    /// API base URL, without trailing slash
    base_url: String,
}

impl KingsApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        // reject garbage early instead of on the first request
        Url::parse(&base_url)?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ApiError> {
        Self::new(
            settings.api_url(),
            Duration::from_secs(settings.api.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of `path` with `query` appended; an empty query adds no `?`
    pub fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&format!("{}/{}", self.base_url, path.trim_start_matches('/')))?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    // ====================================================================
    // TRANSPORT
    // ====================================================================

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let endpoint = url.path().to_string();
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::StatusError {
                status: status.as_u16(),
                endpoint,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn post_json<B: Serialize + ?Sized>(&self, url: Url, body: &B) -> Result<(), ApiError> {
        let endpoint = url.path().to_string();
        debug!("POST {}", url);

        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::StatusError {
                status: status.as_u16(),
                endpoint,
            });
        }
        Ok(())
    }
}

fn progress_path(mode: EvalMode) -> String {
    format!("tokens/{}/state", mode.path())
}

#[async_trait]
impl TokenApi for KingsApiClient {
    async fn list_tokens(&self, filters: &Filters) -> Result<Vec<TokenSummary>, ApiError> {
        let url = self.endpoint("tokens", &filters.to_query())?;
        self.get_json(url).await
    }

    async fn token_states(&self, mint: &str) -> Result<Vec<StateRecord>, ApiError> {
        let url = self.endpoint("tokens/state", &[("mint", mint.to_string())])?;
        self.get_json(url).await
    }

    async fn tokens_to_evaluate(&self) -> Result<Vec<String>, ApiError> {
        let url = self.endpoint("tokens/eval/token", &[])?;
        self.get_json(url).await
    }

    async fn submit_token_rating(&self, token: &str, rating: u8) -> Result<(), ApiError> {
        let url = self.endpoint("tokens/eval/token", &[])?;
        let body = TokenRatingRequest {
            token: token.to_string(),
            rating,
        };
        self.post_json(url, &body).await
    }

    async fn progress_to_evaluate(&self, mode: EvalMode) -> Result<ProgressEvaluation, ApiError> {
        let url = self.endpoint(&progress_path(mode), &[])?;
        let endpoint = url.path().to_string();
        let evaluation: Option<ProgressEvaluation> = self.get_json(url).await?;
        evaluation.ok_or(ApiError::EmptyResponse(endpoint))
    }

    async fn submit_progress_rating(
        &self,
        mode: EvalMode,
        mint: &str,
        rating: u8,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&progress_path(mode), &[])?;
        let body = ProgressRatingRequest {
            mint: mint.to_string(),
            rating,
        };
        self.post_json(url, &body).await
    }

    async fn rated_tokens(&self) -> Result<Vec<RatedToken>, ApiError> {
        let url = self.endpoint("tokens/analytics", &[])?;
        self.get_json(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::MigratedFilter;

    fn client() -> KingsApiClient {
        KingsApiClient::new("http://127.0.0.1:3001/", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_base_url_is_normalised() {
        assert_eq!(client().base_url(), "http://127.0.0.1:3001");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let result = KingsApiClient::new("not a url", Duration::from_secs(5));
        assert!(matches!(result, Err(ApiError::InvalidUrl(_))));
    }

    #[test]
    fn test_endpoint_without_query() {
        let url = client().endpoint("tokens", &[]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:3001/tokens");
    }

    #[test]
    fn test_endpoint_with_filters() {
        let mut filters = Filters::none();
        filters.min_holders = Some(25);
        filters.migrated = MigratedFilter::Yes;

        let url = client().endpoint("tokens", &filters.to_query()).unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:3001/tokens?migrated=true&minHolders=25"
        );
    }

    #[test]
    fn test_progress_paths() {
        assert_eq!(progress_path(EvalMode::Eval), "tokens/eval/state");
        assert_eq!(progress_path(EvalMode::Reval), "tokens/reval/state");

        let url = client()
            .endpoint("tokens/state", &[("mint", "Abc123".to_string())])
            .unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:3001/tokens/state?mint=Abc123");
    }
}
