use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use tracing::info;
use std::sync::Arc;
use tokio::sync::OnceCell;


// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Metrics::new()}
    ).await
}


#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Upstream fetch metrics
    pub token_fetch_requests: IntCounter,
    pub token_fetch_failures: IntCounterVec,
    pub token_fetch_duration: Histogram,

    // Cache metrics
    pub cache_hits: IntCounter,
    pub coalesced_waiters: IntCounter,
    pub token_expiry_unix_ms: IntGauge,

    // Endpoint metrics
    pub endpoint_requests: IntCounterVec,

    // Config/runtime
    pub config_validation_errors: IntCounter,
    pub up: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("tokenproxy".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Upstream
            token_fetch_requests: IntCounter::new("token_fetch_requests_total", "Upstream token exchanges started").unwrap(),
            token_fetch_failures: IntCounterVec::new(Opts::new("token_fetch_failures_total", "Upstream token exchange failures by reason"),&["reason"],).unwrap(),
            token_fetch_duration: Histogram::with_opts(HistogramOpts::new("token_fetch_duration_seconds", "Upstream token exchange duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0])).unwrap(),

            // Cache
            cache_hits: IntCounter::new("token_cache_hits_total", "Requests served from the cached token").unwrap(),
            coalesced_waiters: IntCounter::new("token_coalesced_waiters_total", "Requests that joined an in-flight exchange").unwrap(),
            token_expiry_unix_ms: IntGauge::new("token_expiry_unix_ms", "Expiry of the cached token, unix milliseconds").unwrap(),

            // Endpoint
            endpoint_requests: IntCounterVec::new(Opts::new("endpoint_requests_total", "Token endpoint requests by method and status"),&["method", "status"],).unwrap(),

            // Config/runtime
            config_validation_errors: IntCounter::new("config_validation_errors_total","Validation errors during startup",).unwrap(),
            up: IntGauge::new("up", "1 if service is healthy").unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.token_fetch_requests.clone())).unwrap();
        reg.register(Box::new(metrics.token_fetch_failures.clone())).unwrap();
        reg.register(Box::new(metrics.token_fetch_duration.clone())).unwrap();
        reg.register(Box::new(metrics.cache_hits.clone())).unwrap();
        reg.register(Box::new(metrics.coalesced_waiters.clone())).unwrap();
        reg.register(Box::new(metrics.token_expiry_unix_ms.clone())).unwrap();
        reg.register(Box::new(metrics.endpoint_requests.clone())).unwrap();
        reg.register(Box::new(metrics.config_validation_errors.clone())).unwrap();
        reg.register(Box::new(metrics.up.clone())).unwrap();

        metrics
    }
}
