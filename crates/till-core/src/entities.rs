//! Persisted domain records.
//!
//! These are the rows the HTTP layer serves and the payloads the broadcast
//! hub pushes to observers. Serialized field names are the wire contract the
//! frontend consumes, so they stay plain lowercase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CategoryId, InventoryId, LocationId, ProductId, UserId};

/// A product category.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Category ID.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A sellable product.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Units on hand across all locations.
    pub units: i64,
    /// Unit price.
    pub price: f64,
}

/// A physical stock location.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Location ID.
    pub id: LocationId,
    /// Display name.
    pub name: String,
}

/// Stock availability of an inventory record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InventoryStatus {
    /// Stock available.
    InStock,
    /// Below the reorder threshold.
    LowStock,
    /// No stock at this location.
    OutOfStock,
}

impl InventoryStatus {
    /// Stable string form used for storage and the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InStock => "in-stock",
            Self::LowStock => "low-stock",
            Self::OutOfStock => "out-of-stock",
        }
    }

    /// Parse the stable string form back into a status.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "in-stock" => Some(Self::InStock),
            "low-stock" => Some(Self::LowStock),
            "out-of-stock" => Some(Self::OutOfStock),
            _ => None,
        }
    }
}

/// Units of one product held at one location.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    /// Inventory record ID.
    pub id: InventoryId,
    /// Product this record counts.
    pub product_id: ProductId,
    /// Location holding the stock.
    pub location_id: LocationId,
    /// Units at this location.
    pub units: i64,
    /// Availability status.
    pub status: InventoryStatus,
}

/// A registered API user.
///
/// The password hash never leaves the process: it is skipped on
/// serialization and absent from every response and event payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// User ID.
    pub id: UserId,
    /// Login name, unique.
    pub username: String,
    /// Password hash (argon2 PHC string).
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}
