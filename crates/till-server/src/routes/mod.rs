//! HTTP route handlers.
//!
//! Every mutating handler follows the same sequence: validate, commit
//! through the repository, then announce the committed change through
//! [`publish_event`]. The broadcast outcome is observed in the logs only —
//! by the time the hub runs, the mutation is durable and the response code
//! is already decided, so delivery failures never surface to the caller.

pub mod auth;
pub mod categories;
pub mod inventory;
pub mod locations;
pub mod products;

use tracing::{debug, warn};

use till_core::StoreEvent;
use till_store::{ConnectionPool, PooledConnection};

use crate::errors::ApiError;
use crate::server::AppState;

/// Run a repository closure on a pooled connection off the async runtime.
pub(crate) async fn run_blocking<T, F>(pool: &ConnectionPool, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&PooledConnection) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let conn = pool.get().map_err(till_store::StoreError::from)?;
        f(&conn)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))?
}

/// Announce a committed mutation to all connected observers.
///
/// Fire-and-observe: the result is logged and dropped. All delivery
/// attempts complete before this returns, but nothing here can change the
/// outcome of the mutation that triggered it.
pub(crate) async fn publish_event(state: &AppState, event: StoreEvent) {
    match state.hub.publish(&event).await {
        Ok(result) => debug!(
            kind = event.kind(),
            attempted = result.attempted,
            delivered = result.delivered,
            failed = result.failed.len(),
            "observers notified"
        ),
        Err(e) => warn!(kind = event.kind(), error = %e, "event not broadcast"),
    }
}

/// Names are required and bounded to 100 characters.
pub(crate) fn validate_name(name: &str) -> Result<(), ApiError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Validation("name is required".into()));
    }
    if trimmed.chars().count() > 100 {
        return Err(ApiError::Validation(
            "name cannot exceed 100 characters".into(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_units(units: i64) -> Result<(), ApiError> {
    if units < 0 {
        return Err(ApiError::Validation("units cannot be negative".into()));
    }
    Ok(())
}

pub(crate) fn validate_price(price: f64) -> Result<(), ApiError> {
    if !price.is_finite() || price < 0.0 {
        return Err(ApiError::Validation(
            "price must be a non-negative number".into(),
        ));
    }
    Ok(())
}
