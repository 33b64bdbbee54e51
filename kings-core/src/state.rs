// kings-core/src/state.rs
// Shared application state handed to services and binaries

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use kings_common::data::{StateRecord, TokenSummary};
use kings_common::ranking::{rank_by_reserve, Podium};

use crate::api::{Filters, KingsApiClient, TokenApi};
use crate::config::Settings;
use crate::service::ServiceError;

// =================================================================
// Token store
// =================================================================

#[derive(Debug, Default)]
struct TokenSnapshot {
    seq: u64,
    tokens: Vec<TokenSummary>,
    updated_at: Option<DateTime<Utc>>,
}

/// Latest leaderboard list.
///
/// Every request takes a sequence number before it starts; a response is
/// applied only when its number is newer than the one already applied, so
/// a slow response can never overwrite a fresher list.
#[derive(Debug, Default)]
pub struct TokenStore {
    issued: AtomicU64,
    snapshot: RwLock<TokenSnapshot>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the sequence number for a new request
    pub fn next_seq(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Stores `tokens` fetched under `seq`. Returns false for stale responses.
    pub async fn apply(&self, seq: u64, tokens: Vec<TokenSummary>) -> bool {
        let mut snapshot = self.snapshot.write().await;
        if seq <= snapshot.seq {
            debug!("Discarding stale token list #{} (applied #{})", seq, snapshot.seq);
            return false;
        }
        snapshot.seq = seq;
        snapshot.tokens = tokens;
        snapshot.updated_at = Some(Utc::now());
        true
    }

    pub async fn tokens(&self) -> Vec<TokenSummary> {
        self.snapshot.read().await.tokens.clone()
    }

    pub async fn applied_seq(&self) -> u64 {
        self.snapshot.read().await.seq
    }

    pub async fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.snapshot.read().await.updated_at
    }

    pub async fn podium(&self) -> Podium {
        Podium::select(&self.snapshot.read().await.tokens)
    }

    /// Scrollable list order: SOL reserve descending
    pub async fn ranked_list(&self) -> Vec<TokenSummary> {
        rank_by_reserve(&self.snapshot.read().await.tokens)
    }
}

// =================================================================
// Filter state
// =================================================================

#[derive(Debug, Clone, PartialEq)]
struct FilterPair {
    draft: Filters,
    applied: Filters,
}

/// Filters being edited (draft) versus filters used for fetching (applied)
#[derive(Debug)]
pub struct FilterState {
    inner: RwLock<FilterPair>,
}

impl FilterState {
    pub fn new(initial: Filters) -> Self {
        Self {
            inner: RwLock::new(FilterPair {
                draft: initial.clone(),
                applied: initial,
            }),
        }
    }

    pub async fn draft(&self) -> Filters {
        self.inner.read().await.draft.clone()
    }

    pub async fn applied(&self) -> Filters {
        self.inner.read().await.applied.clone()
    }

    /// Edits one draft field by its query name
    pub async fn set_draft(&self, key: &str, value: &str) -> Result<(), String> {
        self.inner.write().await.draft.set(key, value)
    }

    /// True when the draft differs from what is applied
    pub async fn filters_changed(&self) -> bool {
        let pair = self.inner.read().await;
        pair.draft != pair.applied
    }

    /// Promotes the draft and returns the newly applied filters
    pub async fn apply(&self) -> Filters {
        let mut pair = self.inner.write().await;
        pair.applied = pair.draft.clone();
        info!("Applied filters: {:?}", pair.applied);
        pair.applied.clone()
    }

    /// Drops pending edits
    pub async fn discard(&self) {
        let mut pair = self.inner.write().await;
        pair.draft = pair.applied.clone();
    }
}

// =================================================================
// App state
// =================================================================

#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn TokenApi>,
    pub tokens: Arc<TokenStore>,
    pub filters: Arc<FilterState>,
    pub settings: Settings,
}

impl AppState {
    /// State backed by the REST client configured in `settings`
    pub fn new(settings: Settings) -> Result<Self, ServiceError> {
        info!("Initializing Token Kings state against {}", settings.api_url());
        let client = KingsApiClient::from_settings(&settings)?;
        Ok(Self::with_api(Arc::new(client), settings))
    }

    pub fn with_api(api: Arc<dyn TokenApi>, settings: Settings) -> Self {
        let filters = FilterState::new(settings.filters.clone());
        Self {
            api,
            tokens: Arc::new(TokenStore::new()),
            filters: Arc::new(filters),
            settings,
        }
    }

    /// State history of one token in lifecycle order
    pub async fn token_progress(&self, mint: &str) -> Result<Vec<StateRecord>, ServiceError> {
        let mut states = self.api.token_states(mint).await?;
        states.sort_by_key(|s| s.state);
        debug!("Loaded {} states for {}", states.len(), mint);
        Ok(states)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockTokenApi;
    use kings_common::data::RatedToken;

    fn token(mint: &str, sol_reserve: f64) -> TokenSummary {
        TokenSummary {
            mint: mint.to_string(),
            sol_reserve,
            holders_count: 10,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_store_discards_stale_responses() {
        let store = TokenStore::new();
        let first = store.next_seq();
        let second = store.next_seq();

        assert!(store.apply(second, vec![token("new", 1.0)]).await);
        assert!(!store.apply(first, vec![token("old", 1.0)]).await);

        let tokens = store.tokens().await;
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].mint, "new");
        assert_eq!(store.applied_seq().await, second);
        assert!(store.updated_at().await.is_some());
    }

    #[tokio::test]
    async fn test_store_orderings() {
        let store = TokenStore::new();
        let seq = store.next_seq();
        store
            .apply(seq, vec![token("a", 5.0), token("b", 50.0), token("c", 20.0)])
            .await;

        let list: Vec<String> = store.ranked_list().await.into_iter().map(|t| t.mint).collect();
        assert_eq!(list, vec!["b", "c", "a"]);
        // score = reserve / 10 here, lowest first
        let podium = store.podium().await;
        assert_eq!(podium.first.token.unwrap().mint, "a");
    }

    #[tokio::test]
    async fn test_filter_draft_and_apply() {
        let state = FilterState::new(Filters::default());
        assert!(!state.filters_changed().await);

        state.set_draft("maxHolders", "1000").await.unwrap();
        assert!(state.filters_changed().await);
        assert_eq!(state.applied().await, Filters::default());

        let applied = state.apply().await;
        assert_eq!(applied.max_holders, Some(1000));
        assert!(!state.filters_changed().await);

        state.set_draft("minTrades", "").await.unwrap();
        state.discard().await;
        assert_eq!(state.draft().await.min_trades, Some(25));
    }

    #[tokio::test]
    async fn test_app_state_uses_configured_filters() {
        let settings = Settings::from_defaults().unwrap();
        let state = AppState::with_api(Arc::new(MockTokenApi::default()), settings);
        assert_eq!(state.filters.applied().await, Filters::default());
        assert!(state.tokens.tokens().await.is_empty());
    }

    #[tokio::test]
    async fn test_token_progress_in_state_order() {
        let record = |state: i64, tx_count: u64| StateRecord {
            state,
            mint: "m1".to_string(),
            tx_count,
            ..Default::default()
        };
        let api = Arc::new(MockTokenApi::default());
        api.rated.lock().unwrap().push(RatedToken {
            mint: "m1".to_string(),
            rating: 3,
            states: vec![record(30, 90), record(10, 12), record(20, 40)],
        });
        let state = AppState::with_api(api.clone(), Settings::from_defaults().unwrap());

        let states = state.token_progress("m1").await.unwrap();
        let order: Vec<i64> = states.iter().map(|s| s.state).collect();
        assert_eq!(order, vec![10, 20, 30]);
        assert!(state.token_progress("unknown").await.unwrap().is_empty());

        api.set_failing(true);
        assert!(matches!(
            state.token_progress("m1").await,
            Err(ServiceError::Api(_))
        ));
    }
}
