//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bank_requests_total` (counter): HTTP requests by method, path, status
//! - `bank_request_duration_seconds` (histogram): HTTP latency
//! - `bank_rpc_calls_total` (counter): RPC calls by method and outcome
//! - `bank_rpc_duration_seconds` (histogram): RPC latency including failover
//! - `bank_transfers_total` (counter): transfers by kind and outcome
//! - `bank_accounts_created_total` (counter)
//! - `bank_rate_limited_total` (counter)
//!
//! Without an installed recorder every call is a no-op.

use ::metrics::Label;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

use crate::error::{BankError, BankResult};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> BankResult<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| BankError::Configuration(format!("failed to start metrics exporter: {}", e)))?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, path: &str, status: u16, start: Instant) {
    let route = vec![
        Label::new("method", method.to_string()),
        Label::new("path", path.to_string()),
    ];
    let mut labels = route.clone();
    labels.push(Label::new("status", status.to_string()));

    ::metrics::counter!("bank_requests_total", labels).increment(1);
    ::metrics::histogram!("bank_request_duration_seconds", route)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_rpc_call(method: &'static str, outcome: &'static str, start: Instant) {
    ::metrics::counter!("bank_rpc_calls_total", "method" => method, "outcome" => outcome)
        .increment(1);
    ::metrics::histogram!("bank_rpc_duration_seconds", "method" => method)
        .record(start.elapsed().as_secs_f64());
}

/// `kind` is `transfer`, `fund` or `seed_gas`; `outcome` is `ok` or an error code.
pub fn record_transfer(kind: &'static str, outcome: &'static str) {
    ::metrics::counter!("bank_transfers_total", "kind" => kind, "outcome" => outcome).increment(1);
}

pub fn record_account_created() {
    ::metrics::counter!("bank_accounts_created_total").increment(1);
}

pub fn record_rate_limited() {
    ::metrics::counter!("bank_rate_limited_total").increment(1);
}
