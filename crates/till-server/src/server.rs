//! `TillServer` — Axum HTTP + WebSocket server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use till_auth::TokenIssuer;
use till_store::ConnectionPool;

use crate::config::ServerConfig;
use crate::health::HealthResponse;
use crate::middleware;
use crate::routes;
use crate::shutdown::ShutdownCoordinator;
use crate::websocket::broadcast::BroadcastHub;
use crate::websocket::registry::ConnectionRegistry;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: ConnectionPool,
    /// Registry of open observer connections.
    pub registry: Arc<ConnectionRegistry>,
    /// Broadcast hub over the registry.
    pub hub: Arc<BroadcastHub>,
    /// Bearer token issuer/verifier.
    pub tokens: Arc<TokenIssuer>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Shutdown coordinator.
    pub shutdown: Arc<ShutdownCoordinator>,
    /// When the server started.
    pub start_time: Instant,
    /// Prometheus render handle for `/metrics`.
    pub metrics: PrometheusHandle,
}

/// The main till server.
pub struct TillServer {
    state: AppState,
}

impl TillServer {
    /// Create a new server. The registry and hub are constructed here, once,
    /// and shared by reference with every handler.
    pub fn new(
        config: ServerConfig,
        pool: ConnectionPool,
        tokens: TokenIssuer,
        metrics: PrometheusHandle,
    ) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let hub = Arc::new(BroadcastHub::new(
            registry.clone(),
            Duration::from_millis(config.send_timeout_ms),
        ));
        Self {
            state: AppState {
                pool,
                registry,
                hub,
                tokens: Arc::new(tokens),
                config: Arc::new(config),
                shutdown: Arc::new(ShutdownCoordinator::new()),
                start_time: Instant::now(),
                metrics,
            },
        }
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        let state = self.state.clone();

        let protected = Router::new()
            .nest("/categories", routes::categories::router())
            .nest("/products", routes::products::router())
            .nest("/inventory", routes::inventory::router())
            .nest("/locations", routes::locations::router())
            .layer(axum::middleware::from_fn_with_state(
                state.clone(),
                middleware::require_auth,
            ));

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .nest("/api/auth", routes::auth::router())
            .nest("/api", protected)
            .route("/ws", get(crate::websocket::ws_handler))
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .with_state(state)
    }

    /// Bind and serve. Port `0` auto-assigns; the bound address is returned
    /// together with the serve task handle.
    pub async fn listen(&self) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
        let addr = format!("{}:{}", self.state.config.host, self.state.config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        let local = listener.local_addr()?;

        let router = self.router();
        let token = self.state.shutdown.token();
        let handle = tokio::spawn(async move {
            let shutdown = async move { token.cancelled().await };
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(shutdown)
                .await
            {
                error!(error = %e, "server error");
            }
        });

        info!(addr = %local, "listening");
        Ok((local, handle))
    }

    /// The connection registry.
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.state.registry
    }

    /// The shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.state.shutdown
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::gather(state.start_time, state.registry.len()))
}

/// GET /metrics
async fn metrics_handler(State(state): State<AppState>) -> String {
    state.metrics.render()
}
