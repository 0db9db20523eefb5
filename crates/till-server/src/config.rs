//! Server configuration and settings loading.
//!
//! Loading flow:
//! 1. Start with compiled [`Settings::default()`]
//! 2. If a settings file exists, deep-merge its values over the defaults
//! 3. Apply environment variable overrides (highest priority)
//!
//! Deep merge rules: objects merge recursively (file overrides defaults
//! per-key), arrays and primitives are replaced entirely, nulls are skipped.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Development fallback signing secret. Deployments must override it.
pub const DEFAULT_JWT_SECRET: &str = "till-dev-secret-change-me";

/// Errors that can occur while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Settings file could not be read.
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file is not valid JSON or has wrong field types.
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Configuration for the HTTP/WebSocket server.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `0` for auto-assign).
    pub port: u16,
    /// Maximum concurrent observer connections.
    pub max_connections: usize,
    /// Heartbeat ping interval in seconds.
    pub heartbeat_interval_secs: u64,
    /// Heartbeat timeout in seconds (disconnect after silence this long).
    pub heartbeat_timeout_secs: u64,
    /// Upper bound on one per-connection delivery attempt, in milliseconds.
    pub send_timeout_ms: u64,
    /// Max inbound WebSocket message size in bytes.
    pub max_message_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            max_connections: 64,
            heartbeat_interval_secs: 30,
            heartbeat_timeout_secs: 90,
            send_timeout_ms: 5_000,
            max_message_size: 64 * 1024,
        }
    }
}

/// Process-level settings: server config plus storage and credentials.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// HTTP/WebSocket server configuration.
    pub server: ServerConfig,
    /// Path to the `SQLite` database file.
    pub db_path: String,
    /// HS256 signing secret for bearer tokens.
    pub jwt_secret: String,
    /// Tracing filter directive (e.g. `"info"` or `"till_server=debug"`).
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            db_path: "till.db".into(),
            jwt_secret: DEFAULT_JWT_SECRET.into(),
            log_filter: "info".into(),
        }
    }
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults (plus env overrides). If the
/// file contains invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<Settings, ConfigError> {
    let defaults = serde_json::to_value(Settings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: Settings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Invalid values are silently ignored (fall back to file/default).
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(v) = std::env::var("TILL_HOST") {
        if !v.is_empty() {
            settings.server.host = v;
        }
    }
    if let Some(v) = read_env_u16("TILL_PORT") {
        settings.server.port = v;
    }
    if let Ok(v) = std::env::var("TILL_DB_PATH") {
        if !v.is_empty() {
            settings.db_path = v;
        }
    }
    if let Ok(v) = std::env::var("TILL_JWT_SECRET") {
        if !v.is_empty() {
            settings.jwt_secret = v;
        }
    }
    if let Ok(v) = std::env::var("TILL_LOG") {
        if !v.is_empty() {
            settings.log_filter = v;
        }
    }
}

fn read_env_u16(name: &str) -> Option<u16> {
    std::env::var(name).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_are_sane() {
        let settings = Settings::default();
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 0);
        assert_eq!(settings.server.send_timeout_ms, 5_000);
        assert_eq!(settings.db_path, "till.db");
    }

    #[test]
    fn deep_merge_overrides_per_key() {
        let target = json!({"server": {"host": "127.0.0.1", "port": 0}, "db_path": "till.db"});
        let source = json!({"server": {"port": 9000}});
        let merged = deep_merge(target, source);
        assert_eq!(merged["server"]["host"], "127.0.0.1");
        assert_eq!(merged["server"]["port"], 9000);
        assert_eq!(merged["db_path"], "till.db");
    }

    #[test]
    fn deep_merge_skips_nulls() {
        let target = json!({"jwt_secret": "keep-me"});
        let source = json!({"jwt_secret": null});
        let merged = deep_merge(target, source);
        assert_eq!(merged["jwt_secret"], "keep-me");
    }

    #[test]
    fn deep_merge_replaces_primitives() {
        let merged = deep_merge(json!("old"), json!("new"));
        assert_eq!(merged, json!("new"));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let settings =
            load_settings_from_path(Path::new("/nonexistent/till-settings.json")).unwrap();
        assert_eq!(settings.server.host, Settings::default().server.host);
    }

    #[test]
    fn partial_file_merges_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"server": {"port": 8123}, "db_path": "shop.db"}"#).unwrap();
        let settings = load_settings_from_path(&path).unwrap();
        assert_eq!(settings.server.port, 8123);
        assert_eq!(settings.db_path, "shop.db");
        assert_eq!(settings.server.heartbeat_interval_secs, 30);
    }

    #[test]
    fn invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(load_settings_from_path(&path).is_err());
    }

    #[test]
    fn server_config_serde_roundtrip() {
        let config = ServerConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: ServerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.max_connections, config.max_connections);
        assert_eq!(back.max_message_size, config.max_message_size);
    }
}
