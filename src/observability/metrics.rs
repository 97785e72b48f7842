use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

pub const OUTCOME_SUCCESS: &str = "success";
pub const OUTCOME_ERROR: &str = "error";

static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE
        .get_or_init(|| async {
            info!("Initializing Metrics ...");
            Arc::new(Metrics::new())
        })
        .await
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Token metrics
    pub token_cache_hits: IntCounter,
    pub token_exchanges: IntCounterVec,

    // Api metrics
    pub api_requests: IntCounterVec,
    pub api_request_duration: HistogramVec,

    // Config
    pub config_errors: IntCounter,
}

impl Metrics {
    fn new() -> Self {
        // fresh registry and fixed metric names: construction and registration cannot collide
        let registry = Registry::new_custom(Some("restclient".into()), None)
            .expect("registry prefix is valid");

        let metrics = Self {
            token_cache_hits: IntCounter::new("token_cache_hits_total", "Tokens served from cache without exchange")
                .expect("valid metric"),
            token_exchanges: IntCounterVec::new(Opts::new("token_exchanges_total", "Token exchanges by outcome"), &["outcome"])
                .expect("valid metric"),
            api_requests: IntCounterVec::new(Opts::new("api_requests_total", "Api calls by api, method and outcome"), &["api", "method", "outcome"])
                .expect("valid metric"),
            api_request_duration: HistogramVec::new(
                HistogramOpts::new("api_request_duration_seconds", "Api call duration seconds")
                    .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
                &["api"],
            )
            .expect("valid metric"),
            config_errors: IntCounter::new("config_errors_total", "Config parse and validation failures")
                .expect("valid metric"),
            registry,
        };

        let reg = &metrics.registry;
        reg.register(Box::new(metrics.token_cache_hits.clone())).expect("unique metric");
        reg.register(Box::new(metrics.token_exchanges.clone())).expect("unique metric");
        reg.register(Box::new(metrics.api_requests.clone())).expect("unique metric");
        reg.register(Box::new(metrics.api_request_duration.clone())).expect("unique metric");
        reg.register(Box::new(metrics.config_errors.clone())).expect("unique metric");

        metrics
    }

    /// Prometheus text exposition of everything registered.
    pub fn gather_text(&self) -> String {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buffer) {
            tracing::warn!("metrics encoding failed: {}", e);
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}
