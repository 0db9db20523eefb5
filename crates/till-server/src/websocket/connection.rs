//! WebSocket observer connection state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::SendTimeoutError;

use till_core::ConnectionId;

/// Lifecycle state of a connection. Transitions are forward-only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConnectionState {
    /// Transport upgraded, not yet registered.
    Connecting,
    /// Registered and receiving broadcasts.
    Open,
    /// Close observed, handshake in progress.
    Closing,
    /// Terminal. The connection is discarded.
    Closed,
}

/// Why a delivery attempt to one connection failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendFailure {
    /// The connection's writer task is gone.
    Closed,
    /// The outbound channel stayed full past the send timeout.
    Timeout,
}

/// A connected real-time observer.
///
/// The socket itself is owned by this connection's reader and writer tasks;
/// everything else in the process reaches the client only through the
/// bounded outbound channel held here.
pub struct ClientConnection {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// Lifecycle state, advanced by the session task.
    state: Mutex<ConnectionState>,
    /// Send channel to the connection's writer task.
    tx: mpsc::Sender<Arc<str>>,
    /// When this connection was established.
    pub connected_at: Instant,
    /// Whether the client has responded since the last ping.
    pub is_alive: AtomicBool,
    /// When the last Pong (or any control activity) was received.
    last_pong: Mutex<Instant>,
    /// Count of deliveries dropped for this connection.
    pub dropped_messages: AtomicU64,
}

impl ClientConnection {
    /// Create a new connection in the `Connecting` state.
    pub fn new(id: ConnectionId, tx: mpsc::Sender<Arc<str>>) -> Self {
        let now = Instant::now();
        Self {
            id,
            state: Mutex::new(ConnectionState::Connecting),
            tx,
            connected_at: now,
            is_alive: AtomicBool::new(true),
            last_pong: Mutex::new(now),
            dropped_messages: AtomicU64::new(0),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        *self.state.lock()
    }

    /// Whether this connection is currently `Open`.
    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Advance the lifecycle state.
    ///
    /// Returns `true` if the state moved forward; transitions backward or to
    /// the current state are ignored.
    pub fn advance(&self, next: ConnectionState) -> bool {
        let mut state = self.state.lock();
        if next > *state {
            *state = next;
            true
        } else {
            false
        }
    }

    /// Deliver an encoded payload to this connection's writer task.
    ///
    /// Waits up to `timeout` for space in the outbound channel; a closed
    /// channel or a timeout counts as a failed delivery and increments the
    /// drop counter.
    pub async fn send(&self, payload: Arc<str>, timeout: Duration) -> Result<(), SendFailure> {
        match self.tx.send_timeout(payload, timeout).await {
            Ok(()) => Ok(()),
            Err(e) => {
                let _ = self.dropped_messages.fetch_add(1, Ordering::Relaxed);
                Err(match e {
                    SendTimeoutError::Timeout(_) => SendFailure::Timeout,
                    SendTimeoutError::Closed(_) => SendFailure::Closed,
                })
            }
        }
    }

    /// Total deliveries dropped for this connection.
    pub fn drop_count(&self) -> u64 {
        self.dropped_messages.load(Ordering::Relaxed)
    }

    /// Mark the connection as alive (pong received).
    pub fn mark_alive(&self) {
        self.is_alive.store(true, Ordering::Relaxed);
        *self.last_pong.lock() = Instant::now();
    }

    /// Duration since the last pong (or connection establishment).
    pub fn last_pong_elapsed(&self) -> Duration {
        self.last_pong.lock().elapsed()
    }

    /// Check and reset the alive flag for heartbeat accounting.
    ///
    /// Returns `true` if the connection was alive since the last check.
    pub fn check_alive(&self) -> bool {
        self.is_alive.swap(false, Ordering::Relaxed)
    }

    /// Connection age.
    pub fn age(&self) -> Duration {
        self.connected_at.elapsed()
    }
}
