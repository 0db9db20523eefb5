//! # till-core
//!
//! Foundation types for the till point-of-sale backend.
//!
//! This crate provides the shared vocabulary that all other till crates
//! depend on:
//!
//! - **Branded IDs**: `ProductId`, `CategoryId`, … as newtypes for type safety
//! - **Entities**: the persisted domain records (categories, products,
//!   inventory, locations, users)
//! - **Events**: the [`StoreEvent`](events::StoreEvent) closed enum broadcast
//!   to real-time observers after a mutation commits

#![deny(unsafe_code)]

pub mod entities;
pub mod events;
pub mod ids;

pub use entities::{Category, InventoryRecord, InventoryStatus, Location, Product, User};
pub use events::StoreEvent;
pub use ids::{CategoryId, ConnectionId, InventoryId, LocationId, ProductId, UserId};
