//! Event fan-out to connected observers.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use metrics::counter;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use till_core::{ConnectionId, StoreEvent};

use super::registry::ConnectionRegistry;
use crate::metrics::{EVENT_DELIVERY_FAILURES_TOTAL, EVENTS_PUBLISHED_TOTAL};

/// Outcome of one publish call.
///
/// Diagnostics only: failed deliveries are never retried.
#[derive(Clone, Debug, Default)]
pub struct BroadcastResult {
    /// Deliveries attempted (the snapshot size).
    pub attempted: usize,
    /// Deliveries that reached the connection's writer task.
    pub delivered: usize,
    /// Connections whose delivery failed.
    pub failed: Vec<ConnectionId>,
}

/// Errors that abort a publish before any delivery attempt.
#[derive(Debug, Error)]
pub enum BroadcastError {
    /// The event payload could not be serialized.
    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Encodes an event once and fans it out to every open connection.
///
/// The hub holds the registry by reference and retains nothing across
/// publish calls; each call works against its own snapshot.
pub struct BroadcastHub {
    registry: Arc<ConnectionRegistry>,
    send_timeout: Duration,
}

impl BroadcastHub {
    /// Create a hub over the given registry.
    pub fn new(registry: Arc<ConnectionRegistry>, send_timeout: Duration) -> Self {
        Self {
            registry,
            send_timeout,
        }
    }

    /// Publish an event to every open connection.
    ///
    /// The event is encoded exactly once, so all recipients get a
    /// byte-identical payload. Per-connection sends run concurrently and are
    /// all awaited before this returns; one connection's failure neither
    /// aborts the others nor fails the call. Only an encoding failure fails
    /// the publish, and it does so before any connection is touched.
    pub async fn publish(&self, event: &StoreEvent) -> Result<BroadcastResult, BroadcastError> {
        self.publish_payload(event.kind(), event).await
    }

    async fn publish_payload<E: Serialize>(
        &self,
        kind: &str,
        event: &E,
    ) -> Result<BroadcastResult, BroadcastError> {
        let payload: Arc<str> = Arc::from(serde_json::to_string(event)?);

        let snapshot = self.registry.snapshot();
        let attempted = snapshot.len();
        let timeout = self.send_timeout;

        let sends = snapshot.iter().map(|conn| {
            let payload = Arc::clone(&payload);
            async move {
                match conn.send(payload, timeout).await {
                    Ok(()) => None,
                    Err(failure) => {
                        warn!(conn_id = %conn.id, ?failure, kind, "delivery failed");
                        Some(conn.id.clone())
                    }
                }
            }
        });
        let failed: Vec<ConnectionId> = join_all(sends).await.into_iter().flatten().collect();

        counter!(EVENTS_PUBLISHED_TOTAL).increment(1);
        if !failed.is_empty() {
            counter!(EVENT_DELIVERY_FAILURES_TOTAL).increment(failed.len() as u64);
        }
        let result = BroadcastResult {
            attempted,
            delivered: attempted - failed.len(),
            failed,
        };
        debug!(
            kind,
            attempted = result.attempted,
            delivered = result.delivered,
            "event published"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::websocket::connection::{ClientConnection, ConnectionState};
    use tokio::sync::mpsc;

    const SEND_TIMEOUT: Duration = Duration::from_millis(200);

    fn hub() -> (Arc<ConnectionRegistry>, BroadcastHub) {
        let registry = Arc::new(ConnectionRegistry::new());
        let hub = BroadcastHub::new(registry.clone(), SEND_TIMEOUT);
        (registry, hub)
    }

    fn open_connection(id: &str) -> (Arc<ClientConnection>, mpsc::Receiver<Arc<str>>) {
        let (tx, rx) = mpsc::channel(8);
        let conn = ClientConnection::new(ConnectionId::from_string(id.into()), tx);
        let _ = conn.advance(ConnectionState::Open);
        (Arc::new(conn), rx)
    }

    fn widget_event() -> StoreEvent {
        StoreEvent::NewProduct(till_core::Product {
            id: till_core::ProductId::from_string("prod_1".into()),
            name: "Widget".into(),
            units: 1,
            price: 9.99,
        })
    }

    #[tokio::test]
    async fn publish_reaches_every_open_connection() {
        let (registry, hub) = hub();
        let (a, mut rx_a) = open_connection("conn_a");
        let (b, mut rx_b) = open_connection("conn_b");
        let (c, mut rx_c) = open_connection("conn_c");
        registry.add(a);
        registry.add(b);
        registry.add(c);

        let result = hub.publish(&widget_event()).await.unwrap();
        assert_eq!(result.attempted, 3);
        assert_eq!(result.delivered, 3);
        assert!(result.failed.is_empty());

        let payload_a = rx_a.recv().await.unwrap();
        let payload_b = rx_b.recv().await.unwrap();
        let payload_c = rx_c.recv().await.unwrap();
        // Encoded exactly once: recipients see byte-identical payloads.
        assert_eq!(payload_a, payload_b);
        assert_eq!(payload_b, payload_c);
        let parsed: serde_json::Value = serde_json::from_str(&payload_a).unwrap();
        assert_eq!(parsed["type"], "new-product");
        assert_eq!(parsed["content"]["name"], "Widget");
    }

    #[tokio::test]
    async fn one_broken_connection_does_not_reduce_attempts() {
        let (registry, hub) = hub();
        let (a, rx_a) = open_connection("conn_a");
        let (b, mut rx_b) = open_connection("conn_b");
        let (c, mut rx_c) = open_connection("conn_c");
        registry.add(a);
        registry.add(b);
        registry.add(c);
        // Break A's transport.
        drop(rx_a);

        let result = hub.publish(&widget_event()).await.unwrap();
        assert_eq!(result.attempted, 3);
        assert_eq!(result.delivered, 2);
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].as_str(), "conn_a");

        assert!(rx_b.recv().await.is_some());
        assert!(rx_c.recv().await.is_some());
    }

    #[tokio::test]
    async fn stalled_connection_fails_after_timeout_without_blocking_others() {
        let registry = Arc::new(ConnectionRegistry::new());
        let hub = BroadcastHub::new(registry.clone(), Duration::from_millis(30));
        // A one-slot channel that is already full stalls until timeout.
        let (tx, _rx_stalled) = mpsc::channel(1);
        let stalled = Arc::new(ClientConnection::new(
            ConnectionId::from_string("conn_stalled".into()),
            tx,
        ));
        let _ = stalled.advance(ConnectionState::Open);
        stalled
            .send(Arc::from("filler"), Duration::from_millis(10))
            .await
            .unwrap();
        let (healthy, mut rx_healthy) = open_connection("conn_healthy");
        registry.add(stalled);
        registry.add(healthy);

        let result = hub.publish(&widget_event()).await.unwrap();
        assert_eq!(result.attempted, 2);
        assert_eq!(result.delivered, 1);
        assert_eq!(result.failed[0].as_str(), "conn_stalled");
        assert!(rx_healthy.recv().await.is_some());
    }

    #[tokio::test]
    async fn publish_to_empty_registry_is_empty_result() {
        let (_registry, hub) = hub();
        let result = hub.publish(&widget_event()).await.unwrap();
        assert_eq!(result.attempted, 0);
        assert_eq!(result.delivered, 0);
        assert!(result.failed.is_empty());
    }

    #[tokio::test]
    async fn closed_connection_is_not_a_recipient() {
        let (registry, hub) = hub();
        let (open, mut rx_open) = open_connection("conn_open");
        let (closing, mut rx_closing) = open_connection("conn_closing");
        let _ = closing.advance(ConnectionState::Closing);
        registry.add(open);
        // Mid-close connection still registered but no longer Open.
        registry.add(closing);

        let result = hub.publish(&widget_event()).await.unwrap();
        assert_eq!(result.attempted, 1);
        assert!(rx_open.recv().await.is_some());
        assert!(rx_closing.try_recv().is_err());
    }

    #[tokio::test]
    async fn unencodable_payload_fails_before_any_send() {
        let (registry, hub) = hub();
        let (conn, mut rx) = open_connection("conn_a");
        registry.add(conn);

        // Maps with non-string keys cannot be represented in JSON.
        let bad: std::collections::HashMap<(u8, u8), i32> =
            std::collections::HashMap::from([((1, 2), 3)]);
        let err = hub.publish_payload("bad-payload", &bad).await;
        assert!(matches!(err, Err(BroadcastError::Encode(_))));
        assert!(rx.try_recv().is_err(), "no delivery may be attempted");
    }

    #[tokio::test]
    async fn concurrent_publishes_interleave_safely() {
        let (registry, hub) = hub();
        let hub = Arc::new(hub);
        let (conn, mut rx) = open_connection("conn_a");
        registry.add(conn);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let hub = hub.clone();
            handles.push(tokio::spawn(async move {
                hub.publish(&widget_event()).await.unwrap()
            }));
        }
        for handle in handles {
            let result = handle.await.unwrap();
            assert_eq!(result.attempted, 1);
            assert_eq!(result.delivered, 1);
        }
        for _ in 0..8 {
            assert!(rx.recv().await.is_some());
        }
    }
}
