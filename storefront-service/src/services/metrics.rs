use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Safe to call more than once; later
/// calls are no-ops (a process has one global recorder).
pub fn init_metrics() {
    if METRICS_HANDLE.get().is_some() {
        return;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = METRICS_HANDLE.set(handle);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Prometheus recorder already installed");
        }
    }
}

pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Count created orders and their amounts for revenue dashboards.
pub fn record_order_created(currency: &str, amount: i64) {
    let labels = [("currency", currency.to_string())];
    counter!("orders_created_total", &labels).increment(1);
    counter!("order_amount_total", &labels).increment(amount.max(0) as u64);
}

/// Count settlement outcomes: paid, replayed, rejected.
pub fn record_settlement(outcome: &str) {
    let labels = [("outcome", outcome.to_string())];
    counter!("payment_settlements_total", &labels).increment(1);
}
