//! Product repository.

use rusqlite::{Connection, OptionalExtension, Row, params};

use till_core::events::DeletedProduct;
use till_core::{Product, ProductId};

use crate::errors::{Result, StoreError};

/// Fields for creating a product.
pub struct NewProduct<'a> {
    /// Display name.
    pub name: &'a str,
    /// Units on hand.
    pub units: i64,
    /// Unit price.
    pub price: f64,
}

/// Product repository — stateless, every method takes `&Connection`.
pub struct ProductRepo;

impl ProductRepo {
    /// Insert a new product.
    pub fn create(conn: &Connection, new: &NewProduct<'_>) -> Result<Product> {
        let product = Product {
            id: ProductId::new(),
            name: new.name.to_owned(),
            units: new.units,
            price: new.price,
        };
        let _ = conn.execute(
            "INSERT INTO products (id, name, units, price) VALUES (?1, ?2, ?3, ?4)",
            params![
                product.id.as_str(),
                product.name,
                product.units,
                product.price
            ],
        )?;
        Ok(product)
    }

    /// Fetch one product by ID.
    pub fn get(conn: &Connection, id: &ProductId) -> Result<Product> {
        conn.query_row(
            "SELECT id, name, units, price FROM products WHERE id = ?1",
            [id.as_str()],
            map_row,
        )
        .optional()?
        .ok_or_else(|| StoreError::ProductNotFound(id.to_string()))
    }

    /// List all products by insertion order.
    pub fn list(conn: &Connection) -> Result<Vec<Product>> {
        let mut stmt = conn.prepare("SELECT id, name, units, price FROM products ORDER BY id")?;
        let rows = stmt.query_map([], map_row)?;
        Ok(rows.collect::<std::result::Result<_, _>>()?)
    }

    /// Replace a product's mutable fields. Returns the updated row.
    pub fn update(conn: &Connection, id: &ProductId, new: &NewProduct<'_>) -> Result<Product> {
        let changed = conn.execute(
            "UPDATE products SET name = ?2, units = ?3, price = ?4 WHERE id = ?1",
            params![id.as_str(), new.name, new.units, new.price],
        )?;
        if changed == 0 {
            return Err(StoreError::ProductNotFound(id.to_string()));
        }
        Self::get(conn, id)
    }

    /// Delete a product, returning its identifying fields.
    ///
    /// Inventory rows referencing the product are removed by the schema's
    /// cascade rule.
    pub fn delete(conn: &Connection, id: &ProductId) -> Result<DeletedProduct> {
        let existing = Self::get(conn, id)?;
        let _ = conn.execute("DELETE FROM products WHERE id = ?1", [id.as_str()])?;
        Ok(DeletedProduct {
            id: existing.id,
            name: existing.name,
        })
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: ProductId::from_string(row.get(0)?),
        name: row.get(1)?,
        units: row.get(2)?,
        price: row.get(3)?,
    })
}
