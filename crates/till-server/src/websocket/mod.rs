//! Real-time observer connections: registry, lifecycle, and broadcast
//! fan-out.
//!
//! This module decouples "a mutation happened" from "every live observer
//! hears about it". Route handlers publish a [`StoreEvent`] through the
//! [`BroadcastHub`](broadcast::BroadcastHub) after each durable commit; the
//! hub fans the encoded event out to a snapshot of the
//! [`ConnectionRegistry`](registry::ConnectionRegistry), and each
//! connection's own session task ([`session`]) keeps membership exactly in
//! step with its lifecycle.
//!
//! [`StoreEvent`]: till_core::StoreEvent

pub mod broadcast;
pub mod connection;
pub mod registry;
pub mod session;

use axum::extract::{State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::server::AppState;

/// GET /ws — upgrade to a persistent observer connection.
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    if state.registry.len() >= state.config.max_connections {
        warn!(
            max = state.config.max_connections,
            "rejecting upgrade, connection limit reached"
        );
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    let registry = state.registry.clone();
    let config = state.config.clone();
    let cancel = state.shutdown.token();
    ws.max_message_size(state.config.max_message_size)
        .on_upgrade(move |socket| session::run_ws_session(socket, registry, config, cancel))
}
