//! # till-store
//!
//! SQLite persistence for the till backend.
//!
//! - Pooled connections (`r2d2` + `r2d2_sqlite`) with WAL mode, foreign keys
//!   and busy timeout set on every connection
//! - Embedded schema migrations applied in version order, each in its own
//!   transaction
//! - One stateless repository per entity; every method takes `&Connection`
//!   so callers control pooling and transactions

#![deny(unsafe_code)]

pub mod connection;
pub mod errors;
pub mod migrations;
pub mod repositories;

pub use connection::{ConnectionPool, PoolConfig, PooledConnection, new_file, new_in_memory};
pub use errors::{Result, StoreError};
pub use migrations::run_migrations;
pub use repositories::{
    CategoryRepo, InventoryRepo, LocationRepo, NewInventory, NewProduct, ProductRepo, UserRepo,
};
