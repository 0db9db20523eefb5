//! `/health` endpoint.

use serde::Serialize;
use std::time::Instant;

/// Liveness report served at `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// `"ok"` whenever the server can answer at all.
    pub status: &'static str,
    /// Crate version, for checking what a deployment is running.
    pub version: &'static str,
    /// Seconds since startup.
    pub uptime_secs: u64,
    /// Open observer connections right now.
    pub connections: usize,
}

impl HealthResponse {
    /// Gather the current liveness numbers.
    pub fn gather(started: Instant, connections: usize) -> Self {
        Self {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
            uptime_secs: started.elapsed().as_secs(),
            connections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn fresh_server_reports_ok() {
        let resp = HealthResponse::gather(Instant::now(), 0);
        assert_eq!(resp.status, "ok");
        assert_eq!(resp.connections, 0);
        assert!(resp.uptime_secs < 2);
        assert!(!resp.version.is_empty());
    }

    #[test]
    fn uptime_reflects_start_time() {
        let started = Instant::now().checked_sub(Duration::from_secs(60)).unwrap();
        assert!(HealthResponse::gather(started, 0).uptime_secs >= 59);
    }

    #[test]
    fn wire_shape() {
        let resp = HealthResponse::gather(Instant::now(), 3);
        let parsed: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&resp).unwrap()).unwrap();
        assert_eq!(parsed["status"], "ok");
        assert_eq!(parsed["connections"], 3);
        assert!(parsed["uptime_secs"].is_number());
        assert!(parsed["version"].is_string());
    }
}
