//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gatekeeper_admission_total` (counter): admission decisions by outcome
//! - `gatekeeper_load_test_requests_total` (counter): requests that bypassed the limiter
//! - `gatekeeper_rejections_total` (counter): pipeline aborts by guard and status
//! - `gatekeeper_token_refresh_total` (counter): token reissues by outcome
//! - `gatekeeper_session_refresh_total` (counter): session re-persists by outcome
//!
//! Recording is a no-op until a recorder is installed by [`init_metrics`].

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::pipeline::Refresh;

/// Install the Prometheus recorder and serve it on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_admission(outcome: &'static str) {
    counter!("gatekeeper_admission_total", "outcome" => outcome).increment(1);
}

pub fn record_load_test() {
    counter!("gatekeeper_load_test_requests_total").increment(1);
}

pub fn record_rejection(guard: &'static str, status: u16) {
    counter!("gatekeeper_rejections_total", "guard" => guard, "status" => status.to_string()).increment(1);
}

pub fn record_token_refresh(refresh: Refresh) {
    if let Some(outcome) = refresh_label(refresh) {
        counter!("gatekeeper_token_refresh_total", "outcome" => outcome).increment(1);
    }
}

pub fn record_session_refresh(refresh: Refresh) {
    if let Some(outcome) = refresh_label(refresh) {
        counter!("gatekeeper_session_refresh_total", "outcome" => outcome).increment(1);
    }
}

fn refresh_label(refresh: Refresh) -> Option<&'static str> {
    match refresh {
        Refresh::Skipped => None,
        Refresh::Refreshed => Some("refreshed"),
        Refresh::Failed => Some("failed"),
    }
}
