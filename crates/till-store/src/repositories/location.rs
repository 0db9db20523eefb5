//! Location repository.

use rusqlite::{Connection, OptionalExtension, Row, params};

use till_core::events::DeletedLocation;
use till_core::{Location, LocationId};

use crate::errors::{Result, StoreError};

/// Location repository — stateless, every method takes `&Connection`.
pub struct LocationRepo;

impl LocationRepo {
    /// Insert a new location.
    pub fn create(conn: &Connection, name: &str) -> Result<Location> {
        let location = Location {
            id: LocationId::new(),
            name: name.to_owned(),
        };
        let _ = conn.execute(
            "INSERT INTO locations (id, name) VALUES (?1, ?2)",
            params![location.id.as_str(), location.name],
        )?;
        Ok(location)
    }

    /// Fetch one location by ID.
    pub fn get(conn: &Connection, id: &LocationId) -> Result<Location> {
        conn.query_row(
            "SELECT id, name FROM locations WHERE id = ?1",
            [id.as_str()],
            map_row,
        )
        .optional()?
        .ok_or_else(|| StoreError::LocationNotFound(id.to_string()))
    }

    /// List all locations by insertion order.
    pub fn list(conn: &Connection) -> Result<Vec<Location>> {
        let mut stmt = conn.prepare("SELECT id, name FROM locations ORDER BY id")?;
        let rows = stmt.query_map([], map_row)?;
        Ok(rows.collect::<std::result::Result<_, _>>()?)
    }

    /// Rename a location. Returns the updated row.
    pub fn update(conn: &Connection, id: &LocationId, name: &str) -> Result<Location> {
        let changed = conn.execute(
            "UPDATE locations SET name = ?2 WHERE id = ?1",
            params![id.as_str(), name],
        )?;
        if changed == 0 {
            return Err(StoreError::LocationNotFound(id.to_string()));
        }
        Self::get(conn, id)
    }

    /// Delete a location, returning its identifying fields.
    pub fn delete(conn: &Connection, id: &LocationId) -> Result<DeletedLocation> {
        let existing = Self::get(conn, id)?;
        let _ = conn.execute("DELETE FROM locations WHERE id = ?1", [id.as_str()])?;
        Ok(DeletedLocation {
            id: existing.id,
            name: existing.name,
        })
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Location> {
    Ok(Location {
        id: LocationId::from_string(row.get(0)?),
        name: row.get(1)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{ConnectionPool, PoolConfig, new_in_memory};
    use crate::migrations::run_migrations;

    fn pool() -> ConnectionPool {
        let pool = new_in_memory(&PoolConfig::default()).unwrap();
        let _ = run_migrations(&pool.get().unwrap()).unwrap();
        pool
    }

    #[test]
    fn crud_roundtrip() {
        let pool = pool();
        let c = pool.get().unwrap();
        let created = LocationRepo::create(&c, "Front counter").unwrap();
        assert_eq!(LocationRepo::get(&c, &created.id).unwrap(), created);

        let updated = LocationRepo::update(&c, &created.id, "Back room").unwrap();
        assert_eq!(updated.name, "Back room");

        let deleted = LocationRepo::delete(&c, &created.id).unwrap();
        assert_eq!(deleted.name, "Back room");
        assert!(LocationRepo::list(&c).unwrap().is_empty());
    }

    #[test]
    fn missing_location_is_not_found() {
        let pool = pool();
        let c = pool.get().unwrap();
        let id = LocationId::from_string("loc_x".into());
        assert!(matches!(
            LocationRepo::get(&c, &id),
            Err(StoreError::LocationNotFound(_))
        ));
        assert!(matches!(
            LocationRepo::update(&c, &id, "X"),
            Err(StoreError::LocationNotFound(_))
        ));
        assert!(matches!(
            LocationRepo::delete(&c, &id),
            Err(StoreError::LocationNotFound(_))
        ));
    }
}
