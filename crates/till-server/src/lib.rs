//! # till-server
//!
//! Axum HTTP + `WebSocket` server for the till backend.
//!
//! - HTTP endpoints: auth, entity CRUD, health check, Prometheus metrics
//! - `WebSocket` gateway at `/ws`: one task per observer, registry-backed
//!   membership, heartbeat liveness
//! - Broadcast fan-out: mutations publish a [`StoreEvent`] through the
//!   [`BroadcastHub`] after commit; delivery failures stay per-connection
//! - Graceful shutdown via `tokio::signal` + `CancellationToken`
//!
//! [`StoreEvent`]: till_core::StoreEvent
//! [`BroadcastHub`]: websocket::broadcast::BroadcastHub

#![deny(unsafe_code)]

pub mod config;
pub mod errors;
pub mod health;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod shutdown;
pub mod websocket;

pub use config::{ServerConfig, Settings};
pub use server::{AppState, TillServer};
