//! Category repository.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use till_core::events::DeletedCategory;
use till_core::{Category, CategoryId};

use crate::errors::{Result, StoreError};

/// Category repository — stateless, every method takes `&Connection`.
pub struct CategoryRepo;

impl CategoryRepo {
    /// Insert a new category.
    pub fn create(conn: &Connection, name: &str) -> Result<Category> {
        let category = Category {
            id: CategoryId::new(),
            name: name.to_owned(),
            created_at: Utc::now(),
        };
        let _ = conn.execute(
            "INSERT INTO categories (id, name, created_at) VALUES (?1, ?2, ?3)",
            params![
                category.id.as_str(),
                category.name,
                category.created_at.to_rfc3339()
            ],
        )?;
        Ok(category)
    }

    /// Fetch one category by ID.
    pub fn get(conn: &Connection, id: &CategoryId) -> Result<Category> {
        conn.query_row(
            "SELECT id, name, created_at FROM categories WHERE id = ?1",
            [id.as_str()],
            map_row,
        )
        .optional()?
        .ok_or_else(|| StoreError::CategoryNotFound(id.to_string()))
    }

    /// List all categories, oldest first.
    pub fn list(conn: &Connection) -> Result<Vec<Category>> {
        let mut stmt =
            conn.prepare("SELECT id, name, created_at FROM categories ORDER BY created_at, id")?;
        let rows = stmt.query_map([], map_row)?;
        Ok(rows.collect::<std::result::Result<_, _>>()?)
    }

    /// Rename a category. Returns the updated row.
    pub fn update(conn: &Connection, id: &CategoryId, name: &str) -> Result<Category> {
        let changed = conn.execute(
            "UPDATE categories SET name = ?2 WHERE id = ?1",
            params![id.as_str(), name],
        )?;
        if changed == 0 {
            return Err(StoreError::CategoryNotFound(id.to_string()));
        }
        Self::get(conn, id)
    }

    /// Delete a category, returning its identifying fields.
    pub fn delete(conn: &Connection, id: &CategoryId) -> Result<DeletedCategory> {
        let existing = Self::get(conn, id)?;
        let _ = conn.execute("DELETE FROM categories WHERE id = ?1", [id.as_str()])?;
        Ok(DeletedCategory {
            id: existing.id,
            name: existing.name,
        })
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    let created_at: String = row.get(2)?;
    Ok(Category {
        id: CategoryId::from_string(row.get(0)?),
        name: row.get(1)?,
        created_at: created_at
            .parse::<DateTime<Utc>>()
            .unwrap_or_else(|_| Utc::now()),
    })
}
