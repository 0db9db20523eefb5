//! Location CRUD.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;

use till_core::{Location, LocationId, StoreEvent};
use till_store::LocationRepo;

use super::{publish_event, run_blocking, validate_name};
use crate::errors::ApiError;
use crate::server::AppState;

/// Routes under `/api/locations`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_locations).post(create_location))
        .route("/{id}", put(update_location).delete(delete_location))
}

#[derive(Debug, Deserialize)]
struct LocationBody {
    name: String,
}

/// GET /api/locations
async fn list_locations(State(state): State<AppState>) -> Result<Json<Vec<Location>>, ApiError> {
    let locations = run_blocking(&state.pool, |conn| Ok(LocationRepo::list(conn)?)).await?;
    Ok(Json(locations))
}

/// POST /api/locations
async fn create_location(
    State(state): State<AppState>,
    Json(body): Json<LocationBody>,
) -> Result<impl IntoResponse, ApiError> {
    validate_name(&body.name)?;
    let location = run_blocking(&state.pool, move |conn| {
        Ok(LocationRepo::create(conn, body.name.trim())?)
    })
    .await?;
    publish_event(&state, StoreEvent::NewLocation(location.clone())).await;
    Ok((StatusCode::CREATED, Json(location)))
}

/// PUT /api/locations/{id}
async fn update_location(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<LocationBody>,
) -> Result<Json<Location>, ApiError> {
    validate_name(&body.name)?;
    let id = LocationId::from_string(id);
    let location = run_blocking(&state.pool, move |conn| {
        Ok(LocationRepo::update(conn, &id, body.name.trim())?)
    })
    .await?;
    publish_event(&state, StoreEvent::UpdateLocation(location.clone())).await;
    Ok(Json(location))
}

/// DELETE /api/locations/{id}
async fn delete_location(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = LocationId::from_string(id);
    let deleted = run_blocking(&state.pool, move |conn| {
        Ok(LocationRepo::delete(conn, &id)?)
    })
    .await?;
    publish_event(&state, StoreEvent::DeleteLocation(deleted)).await;
    Ok(StatusCode::NO_CONTENT)
}
