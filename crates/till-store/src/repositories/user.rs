//! User repository.

use chrono::Utc;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params};

use till_core::{User, UserId};

use crate::errors::{Result, StoreError};

/// User repository — stateless, every method takes `&Connection`.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user with an already-hashed password.
    ///
    /// Returns [`StoreError::UsernameTaken`] if the username is registered.
    pub fn create(conn: &Connection, username: &str, password_hash: &str) -> Result<User> {
        let user = User {
            id: UserId::new(),
            username: username.to_owned(),
            password_hash: password_hash.to_owned(),
        };
        let inserted = conn.execute(
            "INSERT INTO users (id, username, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                user.id.as_str(),
                user.username,
                user.password_hash,
                Utc::now().to_rfc3339()
            ],
        );
        match inserted {
            Ok(_) => Ok(user),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::UsernameTaken(username.to_owned()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Look up a user by login name.
    pub fn find_by_username(conn: &Connection, username: &str) -> Result<Option<User>> {
        Ok(conn
            .query_row(
                "SELECT id, username, password_hash FROM users WHERE username = ?1",
                [username],
                map_row,
            )
            .optional()?)
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: UserId::from_string(row.get(0)?),
        username: row.get(1)?,
        password_hash: row.get(2)?,
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
    fn create_and_find() {
        let pool = pool();
        let c = pool.get().unwrap();
        let created = UserRepo::create(&c, "clerk", "$argon2id$hash").unwrap();
        let found = UserRepo::find_by_username(&c, "clerk").unwrap().unwrap();
        assert_eq!(found, created);
        assert_eq!(found.password_hash, "$argon2id$hash");
    }

    #[test]
    fn find_missing_returns_none() {
        let pool = pool();
        let c = pool.get().unwrap();
        assert!(UserRepo::find_by_username(&c, "ghost").unwrap().is_none());
    }

    #[test]
    fn duplicate_username_is_conflict() {
        let pool = pool();
        let c = pool.get().unwrap();
        let _ = UserRepo::create(&c, "clerk", "h1").unwrap();
        let err = UserRepo::create(&c, "clerk", "h2");
        assert!(matches!(err, Err(StoreError::UsernameTaken(name)) if name == "clerk"));
    }
}
