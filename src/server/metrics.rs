use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Encoder, Gauge, Histogram, HistogramOpts, HistogramVec, IntCounter, Opts,
    Registry, TextEncoder,
};
use std::time::Duration;

/// Metric name prefix for all recommender metrics
const PREFIX: &str = "recipes";

lazy_static! {
    // Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "endpoint", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]),
        &["method", "endpoint"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Recommendation Metrics
    pub static ref RECOMMENDATIONS_TOTAL: IntCounter = IntCounter::new(
        format!("{PREFIX}_recommendations_total"),
        "Total recipes returned by recommendation requests"
    ).expect("Failed to create recommendations_total metric");

    pub static ref RECOMMENDATION_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            format!("{PREFIX}_recommendation_duration_seconds"),
            "Time spent ranking and resolving images for one request"
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 120.0])
    ).expect("Failed to create recommendation_duration_seconds metric");

    // Image Metrics
    pub static ref IMAGE_PROVIDER_RESULTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(
            format!("{PREFIX}_image_provider_results_total"),
            "Image provider searches by outcome"
        ),
        &["provider", "outcome"]
    ).expect("Failed to create image_provider_results_total metric");

    pub static ref IMAGE_RESOLUTIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(
            format!("{PREFIX}_image_resolutions_total"),
            "Image resolutions by where the URLs came from"
        ),
        &["source"]
    ).expect("Failed to create image_resolutions_total metric");

    // Corpus Metrics
    pub static ref CORPUS_RECIPES_TOTAL: Gauge = Gauge::new(
        format!("{PREFIX}_corpus_recipes_total"),
        "Number of recipes in the loaded corpus"
    ).expect("Failed to create corpus_recipes_total metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Register all metrics - ignore errors if already registered (for tests)
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(RECOMMENDATIONS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(RECOMMENDATION_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(IMAGE_PROVIDER_RESULTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(IMAGE_RESOLUTIONS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(CORPUS_RECIPES_TOTAL.clone()));

    tracing::info!("Metrics system initialized successfully");
}

/// Maps a request path to a fixed label so unknown paths cannot blow up
/// label cardinality.
pub fn categorize_endpoint(path: &str) -> &'static str {
    match path.trim_end_matches('/') {
        "/api/health" => "health",
        "/api/form-data" => "form_data",
        "/api/recommend" => "recommend",
        "/api/extract-recipe-attributes" => "extract",
        "/api/analyze-food-image" => "analyze_image",
        _ => "other",
    }
}

/// Record an HTTP request
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let endpoint = categorize_endpoint(path);
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, endpoint, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, endpoint])
        .observe(duration.as_secs_f64());
}

/// Record a finished recommendation request
pub fn record_recommendation(count: usize, duration: Duration) {
    RECOMMENDATIONS_TOTAL.inc_by(count as u64);
    RECOMMENDATION_DURATION_SECONDS.observe(duration.as_secs_f64());
}

/// Record one provider search. `outcome` is one of ok, empty, error, timeout.
pub fn record_image_provider_result(provider: &str, outcome: &str) {
    IMAGE_PROVIDER_RESULTS_TOTAL
        .with_label_values(&[provider, outcome])
        .inc();
}

/// Record where a recipe's images came from: reused, providers or placeholder.
pub fn record_image_resolution(source: &str) {
    IMAGE_RESOLUTIONS_TOTAL.with_label_values(&[source]).inc();
}

pub fn set_corpus_recipes(count: usize) {
    CORPUS_RECIPES_TOTAL.set(count as f64);
    tracing::info!("Corpus metrics initialized: {} recipes", count);
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_default();
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
