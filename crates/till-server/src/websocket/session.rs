//! Per-connection lifecycle — drives a single observer from upgrade through
//! deregistration.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use metrics::{counter, gauge, histogram};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use till_core::ConnectionId;

use super::connection::{ClientConnection, ConnectionState};
use super::registry::ConnectionRegistry;
use crate::config::ServerConfig;
use crate::metrics::{
    WS_CONNECTION_DURATION_SECONDS, WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL,
    WS_DISCONNECTIONS_TOTAL,
};

/// Outbound channel depth per connection.
const OUTBOUND_BUFFER: usize = 256;

/// How long to wait for the writer task to finish the close handshake.
const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// Run one observer connection to completion.
///
/// Registers the connection, then blocks on the receive loop until the
/// client closes, the transport errors, or the server shuts down. Whatever
/// the exit path, the connection is deregistered and its writer task torn
/// down before this returns — the registry never retains a dead connection.
///
/// Inbound application payloads are not interpreted: only the close signal
/// and ping/pong liveness frames have meaning. The writer task owns the
/// socket's write half exclusively; it drains the outbound channel and sends
/// periodic pings, disconnecting clients that stop answering.
#[instrument(skip_all, fields(conn_id))]
pub async fn run_ws_session(
    socket: WebSocket,
    registry: Arc<ConnectionRegistry>,
    config: Arc<ServerConfig>,
    cancel: CancellationToken,
) {
    let id = ConnectionId::new();
    let _ = tracing::Span::current().record("conn_id", id.as_str());

    let (mut ws_tx, mut ws_rx) = socket.split();
    let (send_tx, mut send_rx) = mpsc::channel::<Arc<str>>(OUTBOUND_BUFFER);
    let connection = Arc::new(ClientConnection::new(id.clone(), send_tx));

    let _ = connection.advance(ConnectionState::Open);
    registry.add(connection.clone());

    info!("observer connected");
    counter!(WS_CONNECTIONS_TOTAL).increment(1);
    gauge!(WS_CONNECTIONS_ACTIVE).increment(1.0);

    let ping_interval = Duration::from_secs(config.heartbeat_interval_secs);
    let pong_timeout = Duration::from_secs(config.heartbeat_timeout_secs);
    let conn_cancel = CancellationToken::new();

    // Writer task: exclusive owner of the write half. Drains the outbound
    // channel, pings on an interval, and performs the close handshake when
    // the session is torn down.
    let writer_conn = connection.clone();
    let writer_cancel = conn_cancel.clone();
    let mut writer = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(ping_interval);
        let _ = ticker.tick().await; // skip the immediate first tick
        loop {
            tokio::select! {
                payload = send_rx.recv() => {
                    match payload {
                        Some(text) => {
                            if ws_tx.send(Message::Text(text.as_ref().into())).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                _ = ticker.tick() => {
                    if !writer_conn.check_alive()
                        && writer_conn.last_pong_elapsed() > pong_timeout
                    {
                        warn!(conn_id = %writer_conn.id, "observer unresponsive, disconnecting");
                        break;
                    }
                    if ws_tx.send(Message::Ping(Vec::new().into())).await.is_err() {
                        break;
                    }
                }
                () = writer_cancel.cancelled() => break,
            }
        }
        // Wake the receive loop if the writer is first to go, then attempt
        // the close handshake; the peer may already be gone.
        writer_cancel.cancel();
        let _ = ws_tx.send(Message::Close(None)).await;
    });

    // Receive loop: blocks until close, error, or shutdown. Never polls.
    loop {
        tokio::select! {
            frame = ws_rx.next() => {
                match frame {
                    Some(Ok(Message::Close(_))) => {
                        debug!("observer sent close frame");
                        break;
                    }
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => connection.mark_alive(),
                    Some(Ok(Message::Text(text))) => {
                        // Observers have no application-level protocol.
                        debug!(len = text.len(), "ignoring inbound text frame");
                    }
                    Some(Ok(Message::Binary(data))) => {
                        debug!(len = data.len(), "ignoring inbound binary frame");
                    }
                    Some(Err(e)) => {
                        debug!(error = %e, "transport read error");
                        break;
                    }
                    None => break,
                }
            }
            () = conn_cancel.cancelled() => {
                debug!("writer task ended, closing observer");
                break;
            }
            () = cancel.cancelled() => {
                info!("server shutting down, closing observer");
                break;
            }
        }
    }

    // Teardown runs on every exit path of the loop above.
    let _ = connection.advance(ConnectionState::Closing);
    conn_cancel.cancel();
    if tokio::time::timeout(CLOSE_GRACE, &mut writer).await.is_err() {
        writer.abort();
    }
    let _ = connection.advance(ConnectionState::Closed);
    let _ = registry.remove(&connection.id);

    info!(dropped = connection.drop_count(), "observer disconnected");
    counter!(WS_DISCONNECTIONS_TOTAL).increment(1);
    gauge!(WS_CONNECTIONS_ACTIVE).decrement(1.0);
    histogram!(WS_CONNECTION_DURATION_SECONDS).record(connection.age().as_secs_f64());
}
