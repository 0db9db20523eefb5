//! Branded ID newtypes.
//!
//! Each entity gets its own string-backed ID type so a location ID can never
//! be handed to something expecting a product ID. The string form is a short
//! entity prefix plus a UUID v7, so IDs sort by creation time and a bare ID
//! in a log line is self-describing.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! branded_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh ID (prefix + UUID v7, time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(format!(concat!($prefix, "_{}"), Uuid::now_v7()))
            }

            /// Wrap an existing string value, e.g. one read from storage or
            /// a request path.
            #[must_use]
            pub fn from_string(s: String) -> Self {
                Self(s)
            }

            /// The inner string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

branded_id! {
    /// Unique identifier for a category.
    CategoryId, "cat"
}

branded_id! {
    /// Unique identifier for a product.
    ProductId, "prod"
}

branded_id! {
    /// Unique identifier for an inventory record.
    InventoryId, "inv"
}

branded_id! {
    /// Unique identifier for a stock location.
    LocationId, "loc"
}

branded_id! {
    /// Unique identifier for a registered user.
    UserId, "user"
}

branded_id! {
    /// Unique identifier for a live observer connection.
    ConnectionId, "conn"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique() {
        let a = ProductId::new();
        let b = ProductId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn new_ids_carry_prefix() {
        assert!(ProductId::new().as_str().starts_with("prod_"));
        assert!(CategoryId::new().as_str().starts_with("cat_"));
        assert!(InventoryId::new().as_str().starts_with("inv_"));
        assert!(LocationId::new().as_str().starts_with("loc_"));
        assert!(UserId::new().as_str().starts_with("user_"));
        assert!(ConnectionId::new().as_str().starts_with("conn_"));
    }

    #[test]
    fn from_string_preserves_value() {
        let id = LocationId::from_string("loc_fixed".into());
        assert_eq!(id.as_str(), "loc_fixed");
    }

    #[test]
    fn serde_is_transparent() {
        let id = CategoryId::from_string("cat_1".into());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"cat_1\"");
        let back: CategoryId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn display_matches_inner() {
        let id = ConnectionId::from_string("conn_9".into());
        assert_eq!(id.to_string(), "conn_9");
    }

    #[test]
    fn usable_as_map_key() {
        let mut map = std::collections::HashMap::new();
        let id = ConnectionId::new();
        let _ = map.insert(id.clone(), 1);
        assert_eq!(map.get(&id), Some(&1));
    }
}
