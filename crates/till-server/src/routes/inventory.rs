//! Inventory CRUD.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;

use till_core::{InventoryId, InventoryRecord, InventoryStatus, LocationId, ProductId, StoreEvent};
use till_store::{InventoryRepo, NewInventory};

use super::{publish_event, run_blocking, validate_units};
use crate::errors::ApiError;
use crate::server::AppState;

/// Routes under `/api/inventory`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_inventory).post(create_inventory))
        .route("/{id}", put(update_inventory).delete(delete_inventory))
}

fn default_status() -> InventoryStatus {
    InventoryStatus::InStock
}

#[derive(Debug, Deserialize)]
struct CreateInventoryBody {
    product_id: String,
    location_id: String,
    #[serde(default)]
    units: i64,
    #[serde(default = "default_status")]
    status: InventoryStatus,
}

#[derive(Debug, Deserialize)]
struct UpdateInventoryBody {
    units: i64,
    status: InventoryStatus,
}

/// GET /api/inventory
async fn list_inventory(
    State(state): State<AppState>,
) -> Result<Json<Vec<InventoryRecord>>, ApiError> {
    let records = run_blocking(&state.pool, |conn| Ok(InventoryRepo::list(conn)?)).await?;
    Ok(Json(records))
}

/// POST /api/inventory
async fn create_inventory(
    State(state): State<AppState>,
    Json(body): Json<CreateInventoryBody>,
) -> Result<impl IntoResponse, ApiError> {
    validate_units(body.units)?;
    let record = run_blocking(&state.pool, move |conn| {
        Ok(InventoryRepo::create(
            conn,
            &NewInventory {
                product_id: &ProductId::from_string(body.product_id),
                location_id: &LocationId::from_string(body.location_id),
                units: body.units,
                status: body.status,
            },
        )?)
    })
    .await?;
    publish_event(&state, StoreEvent::NewInventory(record.clone())).await;
    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT /api/inventory/{id}
async fn update_inventory(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateInventoryBody>,
) -> Result<Json<InventoryRecord>, ApiError> {
    validate_units(body.units)?;
    let id = InventoryId::from_string(id);
    let record = run_blocking(&state.pool, move |conn| {
        Ok(InventoryRepo::update(conn, &id, body.units, body.status)?)
    })
    .await?;
    publish_event(&state, StoreEvent::UpdateInventory(record.clone())).await;
    Ok(Json(record))
}

/// DELETE /api/inventory/{id}
async fn delete_inventory(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = InventoryId::from_string(id);
    let deleted = run_blocking(&state.pool, move |conn| {
        Ok(InventoryRepo::delete(conn, &id)?)
    })
    .await?;
    publish_event(&state, StoreEvent::DeleteInventory(deleted)).await;
    Ok(StatusCode::NO_CONTENT)
}
