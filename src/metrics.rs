use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

pub static DASHBOARD_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "dashboard_requests_total",
        "Total number of API requests served",
        &["instance_id", "endpoint", "status"]
    )
    .expect("register dashboard_requests_total")
});

pub static DASHBOARD_SNAPSHOT_BUILD_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "dashboard_snapshot_build_seconds",
        "Histogram of full snapshot computation time",
        &["instance_id"],
        vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]
    )
    .expect("register dashboard_snapshot_build_seconds")
});

pub static DATASOURCE_FETCH_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "dashboard_datasource_fetch_seconds",
        "Histogram of dataset load time per source",
        &["instance_id", "source"],
        vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0]
    )
    .expect("register dashboard_datasource_fetch_seconds")
});

pub static DATASOURCE_FALLBACK_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "dashboard_datasource_fallback_total",
        "Times the demo dataset replaced the backend store",
        &["instance_id", "reason"]
    )
    .expect("register dashboard_datasource_fallback_total")
});

pub fn gather_metrics() -> String {
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&metric_families, &mut buffer)
        .expect("encode metrics");
    String::from_utf8(buffer).unwrap_or_default()
}
