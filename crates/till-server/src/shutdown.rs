//! Graceful shutdown.
//!
//! One `CancellationToken` fans out to the accept loop and to every observer
//! session task. Draining cancels the token and then waits, bounded, for the
//! server tasks to finish and the connection registry to empty, so observers
//! get a close handshake instead of a dropped TCP stream.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::websocket::registry::ConnectionRegistry;

/// How long a drain waits before giving up on stragglers.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Session tasks deregister themselves; the drain just watches the registry
/// at this granularity until it empties.
const DRAIN_POLL: Duration = Duration::from_millis(25);

/// Owns the cancellation token every long-lived task listens on.
pub struct ShutdownCoordinator {
    token: CancellationToken,
}

impl ShutdownCoordinator {
    /// Create a coordinator with an untriggered token.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// A clone of the token for a task to select on.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Trigger shutdown. Idempotent.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Whether shutdown has been triggered.
    pub fn is_shutting_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel everything, then wait for the given task handles to finish and
    /// for every observer session to deregister itself.
    ///
    /// Returns `true` if the server wound down inside the timeout; `false`
    /// means the process is exiting with tasks still live.
    pub async fn drain(
        &self,
        registry: &Arc<ConnectionRegistry>,
        handles: Vec<JoinHandle<()>>,
        timeout: Option<Duration>,
    ) -> bool {
        let timeout = timeout.unwrap_or(DRAIN_TIMEOUT);
        self.shutdown();
        info!(
            tasks = handles.len(),
            open_connections = registry.len(),
            timeout_secs = timeout.as_secs(),
            "draining server"
        );

        let registry = registry.clone();
        let settled = async move {
            let _ = futures::future::join_all(handles).await;
            while !registry.is_empty() {
                tokio::time::sleep(DRAIN_POLL).await;
            }
        };
        if tokio::time::timeout(timeout, settled).await.is_err() {
            warn!("drain timed out after {timeout:?}, exiting anyway");
            return false;
        }
        info!("server drained");
        true
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
