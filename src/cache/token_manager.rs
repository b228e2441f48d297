use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::token::TokenRecord;
use crate::config::settings::TokenSettings;
use crate::helpers::time::{get_instant, now_millis, seconds_to_millis};
use crate::observability::metrics::get_metrics;
use crate::sources::error::FetchError;
use crate::sources::FetchToken;

/// Handle every caller waiting on the same upstream exchange polls.
type InflightFetch = Shared<BoxFuture<'static, Result<TokenRecord, FetchError>>>;

#[derive(Default)]
struct CacheState {
    cached: Option<TokenRecord>,
    inflight: Option<InflightFetch>,
    /// bumped for every started fetch, identifies the current `inflight`
    fetch_id: u64,
}

/// Holds the single cached token and coalesces concurrent refreshes into one
/// upstream exchange.
///
/// Cloning is cheap and every clone shares the same cache.
#[derive(Clone)]
pub struct TokenManager {
    source: Arc<dyn FetchToken>,
    state: Arc<Mutex<CacheState>>,
    safety_margin_ms: i64,
}

impl TokenManager {
    pub fn new(source: Arc<dyn FetchToken>, settings: &TokenSettings) -> Self {
        Self {
            source,
            state: Arc::new(Mutex::new(CacheState::default())),
            safety_margin_ms: seconds_to_millis(settings.safety_margin_seconds),
        }
    }

    /// Return a token valid for at least the safety margin, fetching one if
    /// needed. Concurrent callers share a single upstream exchange and all
    /// observe its outcome.
    pub async fn get_token(&self) -> Result<TokenRecord, FetchError> {
        let metrics = get_metrics().await;

        let fetch = {
            let mut state = self.state.lock().await;

            if let Some(record) = state
                .cached
                .as_ref()
                .filter(|record| record.is_fresh(now_millis(), self.safety_margin_ms))
            {
                debug!("serving cached token, expires at {}", record.expires_at);
                metrics.cache_hits.inc();
                return Ok(record.clone());
            }

            if let Some(fetch) = state.inflight.clone() {
                debug!("joining in-flight token fetch");
                metrics.coalesced_waiters.inc();
                fetch
            } else {
                state.fetch_id = state.fetch_id.wrapping_add(1);
                let fetch = self.start_fetch(state.fetch_id);
                state.inflight = Some(fetch.clone());
                fetch
            }
        };

        fetch.await
    }

    /// Last stored record, stale or not. Never triggers a fetch.
    pub async fn cached(&self) -> Option<TokenRecord> {
        self.state.lock().await.cached.clone()
    }

    /// Spawn the exchange so it completes even when the caller that started
    /// it goes away. Must be called with the state lock held.
    fn start_fetch(&self, fetch_id: u64) -> InflightFetch {
        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);

        let task = tokio::spawn(async move {
            let metrics = get_metrics().await;
            let start = get_instant();
            metrics.token_fetch_requests.inc();
            info!("fetching token from upstream");

            // a panicking source still has to release the in-flight handle
            let outcome = AssertUnwindSafe(source.fetch_token())
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| {
                    Err(FetchError::Transport(format!(
                        "token fetch panicked: {}",
                        panic_message(panic.as_ref())
                    )))
                });
            metrics
                .token_fetch_duration
                .observe(start.elapsed().as_secs_f64());

            // the lock is released by the caller before this task can take it,
            // so `inflight` is always set by the time it gets cleared here
            let mut state = state.lock().await;
            match &outcome {
                Ok(record) => {
                    info!("token fetched, expires at {}", record.expires_at);
                    metrics.token_expiry_unix_ms.set(record.expires_at);
                    state.cached = Some(record.clone());
                }
                Err(e) => {
                    warn!(reason = e.reason(), "token fetch failed: {}", e);
                    metrics
                        .token_fetch_failures
                        .with_label_values(&[e.reason()])
                        .inc();
                }
            }
            state.inflight = None;
            outcome
        });

        let state = Arc::clone(&self.state);
        async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(join_err) => {
                    // the task never reached its own cleanup
                    let mut state = state.lock().await;
                    if state.fetch_id == fetch_id {
                        state.inflight = None;
                    }
                    Err(FetchError::Transport(format!(
                        "token fetch task aborted: {}",
                        join_err
                    )))
                }
            }
        }
        .boxed()
        .shared()
    }

    #[cfg(test)]
    pub(crate) async fn seed(&self, record: TokenRecord) {
        self.state.lock().await.cached = Some(record);
    }

    #[cfg(test)]
    pub(crate) async fn has_inflight(&self) -> bool {
        self.state.lock().await.inflight.is_some()
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|msg| msg.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_owned())
}
