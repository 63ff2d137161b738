//! Logging and metrics set-up for the server binary.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::EnvFilter;

/// Filter used when the configured one does not parse.
pub const DEFAULT_LOG_FILTER: &str = "info,rmcp=warn,serve_inner=warn";

/// Log level from `PULSE_LOG_LEVEL`, falling back to `RUST_LOG`, then `info`.
pub fn log_level_with<F>(mut get: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    get("PULSE_LOG_LEVEL")
        .or_else(|| get("RUST_LOG"))
        .unwrap_or_else(|| "info".to_string())
}

/// Combined filter string; rmcp internals stay quiet by default.
pub fn combined_filter(log_level: &str) -> String {
    format!("{},rmcp=warn,serve_inner=warn", log_level)
}

pub fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_new(combined_filter(log_level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Install the global Prometheus recorder for the client's request counters.
pub fn install_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}
