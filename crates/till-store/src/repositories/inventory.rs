//! Inventory repository.
//!
//! An inventory row counts units of one product at one location. Foreign
//! keys are enforced, so creating a record against an unknown product or
//! location fails at the database rather than leaving dangling references.

use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params};

use till_core::events::DeletedInventory;
use till_core::{InventoryId, InventoryRecord, InventoryStatus, LocationId, ProductId};

use crate::errors::{Result, StoreError};

/// Fields for creating an inventory record.
pub struct NewInventory<'a> {
    /// Product being counted.
    pub product_id: &'a ProductId,
    /// Location holding the stock.
    pub location_id: &'a LocationId,
    /// Units at this location.
    pub units: i64,
    /// Availability status.
    pub status: InventoryStatus,
}

/// Inventory repository — stateless, every method takes `&Connection`.
pub struct InventoryRepo;

impl InventoryRepo {
    /// Insert a new inventory record.
    ///
    /// A foreign-key violation is reported as the missing referenced entity
    /// rather than a raw constraint error.
    pub fn create(conn: &Connection, new: &NewInventory<'_>) -> Result<InventoryRecord> {
        let record = InventoryRecord {
            id: InventoryId::new(),
            product_id: new.product_id.clone(),
            location_id: new.location_id.clone(),
            units: new.units,
            status: new.status,
        };
        let inserted = conn.execute(
            "INSERT INTO inventory (id, product_id, location_id, units, status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.id.as_str(),
                record.product_id.as_str(),
                record.location_id.as_str(),
                record.units,
                record.status.as_str()
            ],
        );
        match inserted {
            Ok(_) => Ok(record),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                // Distinguish which side of the FK is missing.
                if product_exists(conn, new.product_id)? {
                    Err(StoreError::LocationNotFound(new.location_id.to_string()))
                } else {
                    Err(StoreError::ProductNotFound(new.product_id.to_string()))
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Fetch one inventory record by ID.
    pub fn get(conn: &Connection, id: &InventoryId) -> Result<InventoryRecord> {
        conn.query_row(
            "SELECT id, product_id, location_id, units, status FROM inventory WHERE id = ?1",
            [id.as_str()],
            map_row,
        )
        .optional()?
        .ok_or_else(|| StoreError::InventoryNotFound(id.to_string()))
    }

    /// List all inventory records by insertion order.
    pub fn list(conn: &Connection) -> Result<Vec<InventoryRecord>> {
        let mut stmt = conn.prepare(
            "SELECT id, product_id, location_id, units, status FROM inventory ORDER BY id",
        )?;
        let rows = stmt.query_map([], map_row)?;
        Ok(rows.collect::<std::result::Result<_, _>>()?)
    }

    /// Set units and status on a record. Returns the updated row.
    pub fn update(
        conn: &Connection,
        id: &InventoryId,
        units: i64,
        status: InventoryStatus,
    ) -> Result<InventoryRecord> {
        let changed = conn.execute(
            "UPDATE inventory SET units = ?2, status = ?3 WHERE id = ?1",
            params![id.as_str(), units, status.as_str()],
        )?;
        if changed == 0 {
            return Err(StoreError::InventoryNotFound(id.to_string()));
        }
        Self::get(conn, id)
    }

    /// Delete an inventory record, returning its ID.
    pub fn delete(conn: &Connection, id: &InventoryId) -> Result<DeletedInventory> {
        let changed = conn.execute("DELETE FROM inventory WHERE id = ?1", [id.as_str()])?;
        if changed == 0 {
            return Err(StoreError::InventoryNotFound(id.to_string()));
        }
        Ok(DeletedInventory { id: id.clone() })
    }
}

fn product_exists(conn: &Connection, id: &ProductId) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT count(*) FROM products WHERE id = ?1",
        [id.as_str()],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<InventoryRecord> {
    let status: String = row.get(4)?;
    Ok(InventoryRecord {
        id: InventoryId::from_string(row.get(0)?),
        product_id: ProductId::from_string(row.get(1)?),
        location_id: LocationId::from_string(row.get(2)?),
        units: row.get(3)?,
        status: InventoryStatus::parse(&status).unwrap_or(InventoryStatus::OutOfStock),
    })
}
