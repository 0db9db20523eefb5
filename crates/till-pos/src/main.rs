//! # till-pos
//!
//! Till server binary — loads settings, opens storage, and starts the
//! HTTP/WebSocket server.

#![deny(unsafe_code)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use till_auth::TokenIssuer;
use till_server::TillServer;
use till_server::config::{DEFAULT_JWT_SECRET, load_settings_from_path};
use till_store::PoolConfig;

/// Inventory/point-of-sale backend with real-time observer broadcast.
#[derive(Parser, Debug)]
#[command(name = "till-pos", about = "Inventory/point-of-sale backend")]
struct Cli {
    /// Path to the settings file (default `~/.till/settings.json`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides settings; 0 auto-assigns).
    #[arg(long)]
    port: Option<u16>,

    /// Path to the `SQLite` database (overrides settings).
    #[arg(long)]
    db_path: Option<PathBuf>,
}

fn default_settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".till").join("settings.json")
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let settings_path = args.config.unwrap_or_else(default_settings_path);
    let mut settings =
        load_settings_from_path(&settings_path).context("failed to load settings")?;
    if let Some(host) = args.host {
        settings.server.host = host;
    }
    if let Some(port) = args.port {
        settings.server.port = port;
    }
    if let Some(db_path) = args.db_path {
        settings.db_path = db_path.to_string_lossy().into_owned();
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if settings.jwt_secret == DEFAULT_JWT_SECRET {
        tracing::warn!(
            "using the built-in development JWT secret; set TILL_JWT_SECRET in production"
        );
    }

    ensure_parent_dir(Path::new(&settings.db_path))?;
    let pool = till_store::new_file(&settings.db_path, &PoolConfig::default())
        .context("failed to open database")?;
    {
        let conn = pool.get().context("failed to get DB connection")?;
        let applied = till_store::run_migrations(&conn).context("failed to run migrations")?;
        if applied > 0 {
            tracing::info!(applied, "database migrated");
        }
    }

    let metrics = till_server::metrics::install_recorder()
        .context("failed to install metrics recorder")?;
    let tokens = TokenIssuer::new(&settings.jwt_secret);
    let server = TillServer::new(settings.server.clone(), pool, tokens, metrics);

    let (addr, serve_handle) = server.listen().await.context("failed to bind")?;
    tracing::info!(%addr, db_path = %settings.db_path, "till-pos ready");

    wait_for_signal().await;
    tracing::info!("shutdown signal received");
    let registry = server.registry().clone();
    let _ = server
        .shutdown()
        .drain(&registry, vec![serve_handle], None)
        .await;
    Ok(())
}

/// Block until SIGINT (or SIGTERM on unix).
async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut term = signal(SignalKind::terminate()).ok();
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            () = async {
                match term.as_mut() {
                    Some(term) => { let _ = term.recv().await; }
                    None => std::future::pending::<()>().await,
                }
            } => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
