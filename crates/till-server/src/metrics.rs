//! Prometheus metrics for connection and broadcast activity.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the process-global Prometheus recorder.
///
/// Call once at startup before any counter is touched; the returned handle
/// renders the `/metrics` endpoint.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

// Metric names, kept in one place so call sites can't drift apart.

/// Observer connections opened total (counter).
pub const WS_CONNECTIONS_TOTAL: &str = "ws_connections_total";
/// Observer disconnections total (counter).
pub const WS_DISCONNECTIONS_TOTAL: &str = "ws_disconnections_total";
/// Active observer connections (gauge).
pub const WS_CONNECTIONS_ACTIVE: &str = "ws_connections_active";
/// Observer connection duration seconds (histogram).
pub const WS_CONNECTION_DURATION_SECONDS: &str = "ws_connection_duration_seconds";
/// Store events published total (counter).
pub const EVENTS_PUBLISHED_TOTAL: &str = "events_published_total";
/// Per-connection delivery failures total (counter).
pub const EVENT_DELIVERY_FAILURES_TOTAL: &str = "event_delivery_failures_total";
