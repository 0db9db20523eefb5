//! Store events broadcast to real-time observers.
//!
//! Every durable mutation produces exactly one [`StoreEvent`]. The enum is
//! closed: encoding is exhaustive and a new entity kind cannot be added
//! without the compiler pointing at every match that must learn about it.
//!
//! Wire form is one JSON object per event:
//!
//! ```json
//! { "type": "new-product", "content": { "id": "...", "name": "...", ... } }
//! ```
//!
//! Create and update events carry the full entity snapshot; delete events
//! carry only the identifying fields of the row that no longer exists.

use serde::{Deserialize, Serialize};

use crate::entities::{Category, InventoryRecord, Location, Product};
use crate::ids::{CategoryId, InventoryId, LocationId, ProductId};

/// Identifying fields of a deleted category.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeletedCategory {
    /// ID of the removed category.
    pub id: CategoryId,
    /// Name it had at deletion time.
    pub name: String,
}

/// Identifying fields of a deleted product.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeletedProduct {
    /// ID of the removed product.
    pub id: ProductId,
    /// Name it had at deletion time.
    pub name: String,
}

/// Identifying fields of a deleted inventory record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeletedInventory {
    /// ID of the removed record.
    pub id: InventoryId,
}

/// Identifying fields of a deleted location.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeletedLocation {
    /// ID of the removed location.
    pub id: LocationId,
    /// Name it had at deletion time.
    pub name: String,
}

/// A completed mutation, typed by entity and operation.
///
/// Serializes adjacently tagged so the wire shape is exactly
/// `{"type": <kind>, "content": <payload>}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "kebab-case")]
pub enum StoreEvent {
    /// A category was created.
    NewCategory(Category),
    /// A category was updated.
    UpdateCategory(Category),
    /// A category was deleted.
    DeleteCategory(DeletedCategory),
    /// A product was created.
    NewProduct(Product),
    /// A product was updated.
    UpdateProduct(Product),
    /// A product was deleted.
    DeleteProduct(DeletedProduct),
    /// An inventory record was created.
    NewInventory(InventoryRecord),
    /// An inventory record was updated.
    UpdateInventory(InventoryRecord),
    /// An inventory record was deleted.
    DeleteInventory(DeletedInventory),
    /// A location was created.
    NewLocation(Location),
    /// A location was updated.
    UpdateLocation(Location),
    /// A location was deleted.
    DeleteLocation(DeletedLocation),
}

impl StoreEvent {
    /// The wire `type` string for this event.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NewCategory(_) => "new-category",
            Self::UpdateCategory(_) => "update-category",
            Self::DeleteCategory(_) => "delete-category",
            Self::NewProduct(_) => "new-product",
            Self::UpdateProduct(_) => "update-product",
            Self::DeleteProduct(_) => "delete-product",
            Self::NewInventory(_) => "new-inventory",
            Self::UpdateInventory(_) => "update-inventory",
            Self::DeleteInventory(_) => "delete-inventory",
            Self::NewLocation(_) => "new-location",
            Self::UpdateLocation(_) => "update-location",
            Self::DeleteLocation(_) => "delete-location",
        }
    }
}
