// service/poller.rs
// Leaderboard polling loop

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::errors::ServiceError;
use crate::state::AppState;

/// What a single refresh did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied { count: usize },
    /// A newer response landed first
    Stale,
    /// Another fetch was still outstanding
    Skipped,
}

/// Clears the in-flight flag however the fetch ends
struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct TokenPoller {
    state: AppState,
    interval: Duration,
    in_flight: AtomicBool,
}

impl TokenPoller {
    pub fn new(state: AppState) -> Self {
        let interval = Duration::from_millis(state.settings.polling.interval_ms.max(1));
        Self::with_interval(state, interval)
    }

    pub fn with_interval(state: AppState, interval: Duration) -> Self {
        Self {
            state,
            interval,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Fetches the list with the applied filters, at most one fetch at a time
    pub async fn refresh(&self) -> Result<RefreshOutcome, ServiceError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Fetch already in flight, skipping");
            return Ok(RefreshOutcome::Skipped);
        }
        let _guard = FlightGuard(&self.in_flight);

        let filters = self.state.filters.applied().await;
        let seq = self.state.tokens.next_seq();
        let tokens = self.state.api.list_tokens(&filters).await?;
        let count = tokens.len();

        if self.state.tokens.apply(seq, tokens).await {
            debug!("Token list #{} applied ({} tokens)", seq, count);
            Ok(RefreshOutcome::Applied { count })
        } else {
            Ok(RefreshOutcome::Stale)
        }
    }

    /// Polls until the shutdown channel fires. Failed fetches keep the old list.
    pub async fn start(&self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<(), ServiceError> {
        info!("Token poller started (every {:?})", self.interval);
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown_rx.recv() => break,
            }
            // an outstanding fetch is abandoned on shutdown
            tokio::select! {
                result = self.refresh() => {
                    if let Err(e) = result {
                        warn!("Error fetching tokens: {}", e);
                    }
                }
                _ = shutdown_rx.recv() => break,
            }
        }
        info!("Token poller stopping");
        Ok(())
    }

    /// Runs `start` on its own task
    pub fn spawn(
        self: Arc<Self>,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> JoinHandle<Result<(), ServiceError>> {
        tokio::spawn(async move { self.start(shutdown_rx).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockTokenApi;
    use crate::config::Settings;
    use kings_common::data::TokenSummary;

    fn token(mint: &str) -> TokenSummary {
        TokenSummary {
            mint: mint.to_string(),
            holders_count: 30,
            sol_reserve: 40.0,
            ..Default::default()
        }
    }

    fn state_with(api: Arc<MockTokenApi>) -> AppState {
        AppState::with_api(api, Settings::from_defaults().unwrap())
    }

    #[tokio::test]
    async fn test_refresh_applies_list_with_applied_filters() {
        let api = Arc::new(MockTokenApi::with_tokens(vec![token("a"), token("b")]));
        let state = state_with(api.clone());
        state.filters.set_draft("minHolders", "100").await.unwrap();

        let poller = TokenPoller::new(state.clone());
        assert_eq!(poller.refresh().await.unwrap(), RefreshOutcome::Applied { count: 2 });
        assert_eq!(state.tokens.tokens().await.len(), 2);

        // draft edits are not sent until applied
        let sent = api.last_filters.lock().unwrap().clone().unwrap();
        assert_eq!(sent.min_holders, Some(25));
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_list() {
        let api = Arc::new(MockTokenApi::with_tokens(vec![token("a")]));
        let state = state_with(api.clone());
        let poller = TokenPoller::new(state.clone());

        poller.refresh().await.unwrap();
        api.set_failing(true);
        assert!(poller.refresh().await.is_err());

        let tokens = state.tokens.tokens().await;
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].mint, "a");
    }

    #[tokio::test]
    async fn test_single_flight() {
        let api = Arc::new(MockTokenApi {
            latency: Some(Duration::from_millis(50)),
            ..MockTokenApi::with_tokens(vec![token("a")])
        });
        let poller = TokenPoller::new(state_with(api.clone()));

        let (first, second) = tokio::join!(poller.refresh(), poller.refresh());
        assert_eq!(first.unwrap(), RefreshOutcome::Applied { count: 1 });
        assert_eq!(second.unwrap(), RefreshOutcome::Skipped);
        assert_eq!(api.list_calls.load(Ordering::SeqCst), 1);

        // the flag is released once the fetch completes
        assert!(matches!(
            poller.refresh().await.unwrap(),
            RefreshOutcome::Applied { .. }
        ));
    }

    #[tokio::test]
    async fn test_poll_loop_stops_on_shutdown() {
        let api = Arc::new(MockTokenApi::with_tokens(vec![token("a")]));
        let state = state_with(api.clone());
        let poller = Arc::new(TokenPoller::with_interval(state.clone(), Duration::from_millis(10)));

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = poller.spawn(shutdown_rx);

        time::sleep(Duration::from_millis(60)).await;
        shutdown_tx.send(()).unwrap();
        handle.await.unwrap().unwrap();

        assert!(api.list_calls.load(Ordering::SeqCst) >= 2);
        assert_eq!(state.tokens.tokens().await.len(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_slow_fetch() {
        let api = Arc::new(MockTokenApi {
            latency: Some(Duration::from_secs(30)),
            ..MockTokenApi::with_tokens(vec![token("a")])
        });
        let state = state_with(api.clone());
        let poller = Arc::new(TokenPoller::with_interval(state.clone(), Duration::from_millis(10)));

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = poller.clone().spawn(shutdown_rx);

        time::sleep(Duration::from_millis(50)).await;
        assert_eq!(api.list_calls.load(Ordering::SeqCst), 1);
        shutdown_tx.send(()).unwrap();

        let stopped = time::timeout(Duration::from_secs(2), handle).await;
        assert!(stopped.is_ok(), "poller kept waiting on the fetch");
        assert!(state.tokens.tokens().await.is_empty());

        // the in-flight flag was released with the abandoned fetch
        assert!(!poller.in_flight.load(Ordering::SeqCst));
    }
}
