//! The authoritative set of currently open connections.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use till_core::ConnectionId;

use super::connection::ClientConnection;

/// Concurrency-safe set of open connections.
///
/// One registry instance is constructed at startup and shared by reference;
/// membership follows the connection lifecycle exactly — a connection is a
/// member iff its state is `Open`. The internal lock guards only membership
/// mutation and snapshot copying, never any I/O, so a stalled client can
/// never block registration, deregistration, or other publishers.
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<ConnectionId, Arc<ClientConnection>>>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a connection. A connection that is already a member is left
    /// untouched; membership is unique per connection identity.
    pub fn add(&self, connection: Arc<ClientConnection>) {
        let mut conns = self.connections.write();
        let _ = conns.entry(connection.id.clone()).or_insert(connection);
    }

    /// Remove a connection by ID. Removing an absent connection is a no-op.
    ///
    /// Returns whether a connection was actually removed.
    pub fn remove(&self, id: &ConnectionId) -> bool {
        let mut conns = self.connections.write();
        conns.remove(id).is_some()
    }

    /// A point-in-time copy of the currently open connections.
    ///
    /// The returned vector is stable: concurrent `add`/`remove` calls after
    /// this returns do not affect it. Connections mid-close (state already
    /// past `Open` but not yet removed) are excluded.
    pub fn snapshot(&self) -> Vec<Arc<ClientConnection>> {
        let conns = self.connections.read();
        conns.values().filter(|c| c.is_open()).cloned().collect()
    }

    /// Number of registered connections.
    pub fn len(&self) -> usize {
        self.connections.read().len()
    }

    /// Whether no connections are registered.
    pub fn is_empty(&self) -> bool {
        self.connections.read().is_empty()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::websocket::connection::ConnectionState;
    use proptest::prelude::*;
    use tokio::sync::mpsc;

    fn open_connection(id: &str) -> Arc<ClientConnection> {
        let (tx, rx) = mpsc::channel(8);
        // The registry only reads the state cell; the channel can be dropped.
        drop(rx);
        let conn = ClientConnection::new(ConnectionId::from_string(id.into()), tx);
        let _ = conn.advance(ConnectionState::Open);
        Arc::new(conn)
    }

    #[test]
    fn add_and_snapshot() {
        let registry = ConnectionRegistry::new();
        registry.add(open_connection("conn_a"));
        registry.add(open_connection("conn_b"));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.snapshot().len(), 2);
    }

    #[test]
    fn add_same_identity_does_not_duplicate() {
        let registry = ConnectionRegistry::new();
        let conn = open_connection("conn_a");
        registry.add(conn.clone());
        registry.add(conn);
        registry.add(open_connection("conn_a"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let conn = open_connection("conn_a");
        let id = conn.id.clone();
        registry.add(conn);
        assert!(registry.remove(&id));
        assert!(!registry.remove(&id));
        assert!(registry.is_empty());
    }

    #[test]
    fn remove_absent_is_noop() {
        let registry = ConnectionRegistry::new();
        assert!(!registry.remove(&ConnectionId::from_string("conn_ghost".into())));
    }

    #[test]
    fn snapshot_excludes_non_open_connections() {
        let registry = ConnectionRegistry::new();
        let open = open_connection("conn_open");
        let closing = open_connection("conn_closing");
        let _ = closing.advance(ConnectionState::Closing);
        registry.add(open);
        registry.add(closing);
        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id.as_str(), "conn_open");
    }

    #[test]
    fn snapshot_is_stable_under_later_mutation() {
        let registry = ConnectionRegistry::new();
        let conn = open_connection("conn_a");
        let id = conn.id.clone();
        registry.add(conn);
        let snapshot = registry.snapshot();
        let _ = registry.remove(&id);
        registry.add(open_connection("conn_b"));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, id);
    }

    #[test]
    fn concurrent_add_remove_snapshot_do_not_deadlock() {
        let registry = Arc::new(ConnectionRegistry::new());
        let mut handles = Vec::new();
        for t in 0..4 {
            let registry = registry.clone();
            handles.push(std::thread::spawn(move || {
                for i in 0..200 {
                    let id = format!("conn_{t}_{i}");
                    registry.add(open_connection(&id));
                    let _ = registry.snapshot();
                    let _ = registry.remove(&ConnectionId::from_string(id));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(registry.is_empty());
    }

    proptest! {
        /// For any interleaving of adds and removes over a small pool of
        /// identities, snapshot length equals the number of distinct
        /// identities currently present.
        #[test]
        fn snapshot_len_matches_open_membership(ops in prop::collection::vec((0u8..8, any::<bool>()), 0..64)) {
            let registry = ConnectionRegistry::new();
            let mut model = std::collections::HashSet::new();
            for (slot, is_add) in ops {
                let id = format!("conn_{slot}");
                if is_add {
                    registry.add(open_connection(&id));
                    let _ = model.insert(id);
                } else {
                    let _ = registry.remove(&ConnectionId::from_string(id.clone()));
                    let _ = model.remove(&id);
                }
                prop_assert_eq!(registry.snapshot().len(), model.len());
                prop_assert_eq!(registry.len(), model.len());
            }
        }
    }
}
