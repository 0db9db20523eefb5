//! Schema migration runner.
//!
//! Migration SQL is compiled in with [`include_str!`] and applied in version
//! order, one transaction per migration, so a failed migration leaves no
//! partial schema behind. Applied versions are recorded in `schema_version`
//! and skipped on later runs, making the runner safe to call at every boot.

use rusqlite::Connection;
use tracing::{debug, info};

use crate::errors::{Result, StoreError};

/// A single migration with a version number and SQL to execute.
struct Migration {
    version: u32,
    description: &'static str,
    sql: &'static str,
}

/// All migrations in version order.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "Complete schema: users, categories, products, locations, inventory",
    sql: include_str!("v001_schema.sql"),
}];

/// Run all pending migrations on the given connection.
///
/// Returns the number of migrations applied.
///
/// # Errors
///
/// Returns [`StoreError::Migration`] if any migration SQL fails.
pub fn run_migrations(conn: &Connection) -> Result<u32> {
    ensure_version_table(conn)?;
    let current = current_version(conn)?;
    let mut applied = 0;

    for migration in MIGRATIONS {
        if migration.version <= current {
            debug!(
                version = migration.version,
                description = migration.description,
                "migration already applied, skipping"
            );
            continue;
        }

        info!(
            version = migration.version,
            description = migration.description,
            "applying migration"
        );
        apply_migration(conn, migration)?;
        applied += 1;
    }

    Ok(applied)
}

fn ensure_version_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        )",
    )?;
    Ok(())
}

fn current_version(conn: &Connection) -> Result<u32> {
    let version: Option<u32> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get(0)
        })?;
    Ok(version.unwrap_or(0))
}

fn apply_migration(conn: &Connection, migration: &Migration) -> Result<()> {
    let run = || -> std::result::Result<(), rusqlite::Error> {
        conn.execute_batch("BEGIN")?;
        conn.execute_batch(migration.sql)?;
        let _ = conn.execute(
            "INSERT INTO schema_version (version, applied_at) VALUES (?1, ?2)",
            rusqlite::params![migration.version, chrono::Utc::now().to_rfc3339()],
        )?;
        conn.execute_batch("COMMIT")?;
        Ok(())
    };

    run().map_err(|e| {
        let _ = conn.execute_batch("ROLLBACK");
        StoreError::Migration {
            message: format!("v{:03} ({}): {e}", migration.version, migration.description),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{PoolConfig, new_in_memory};

    #[test]
    fn migrations_apply_once() {
        let pool = new_in_memory(&PoolConfig::default()).unwrap();
        let conn = pool.get().unwrap();
        assert_eq!(run_migrations(&conn).unwrap(), 1);
        assert_eq!(run_migrations(&conn).unwrap(), 0);
    }

    #[test]
    fn schema_has_all_tables() {
        let pool = new_in_memory(&PoolConfig::default()).unwrap();
        let conn = pool.get().unwrap();
        let _ = run_migrations(&conn).unwrap();
        for table in ["users", "categories", "products", "locations", "inventory"] {
            let count: i64 = conn
                .query_row(
                    "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "missing table {table}");
        }
    }

    #[test]
    fn version_recorded() {
        let pool = new_in_memory(&PoolConfig::default()).unwrap();
        let conn = pool.get().unwrap();
        let _ = run_migrations(&conn).unwrap();
        assert_eq!(current_version(&conn).unwrap(), 1);
    }

    #[test]
    fn inventory_cascades_on_product_delete() {
        let pool = new_in_memory(&PoolConfig::default()).unwrap();
        let conn = pool.get().unwrap();
        let _ = run_migrations(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO products (id, name) VALUES ('prod_1', 'Widget');
             INSERT INTO locations (id, name) VALUES ('loc_1', 'Front');
             INSERT INTO inventory (id, product_id, location_id) VALUES ('inv_1', 'prod_1', 'loc_1');
             DELETE FROM products WHERE id = 'prod_1';",
        )
        .unwrap();
        let count: i64 = conn
            .query_row("SELECT count(*) FROM inventory", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
