//! Category CRUD.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;

use till_core::{Category, CategoryId, StoreEvent};
use till_store::CategoryRepo;

use super::{publish_event, run_blocking, validate_name};
use crate::errors::ApiError;
use crate::server::AppState;

/// Routes under `/api/categories`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/{id}", put(update_category).delete(delete_category))
}

#[derive(Debug, Deserialize)]
struct CategoryBody {
    name: String,
}

/// GET /api/categories
async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = run_blocking(&state.pool, |conn| Ok(CategoryRepo::list(conn)?)).await?;
    Ok(Json(categories))
}

/// POST /api/categories
async fn create_category(
    State(state): State<AppState>,
    Json(body): Json<CategoryBody>,
) -> Result<impl IntoResponse, ApiError> {
    validate_name(&body.name)?;
    let category = run_blocking(&state.pool, move |conn| {
        Ok(CategoryRepo::create(conn, body.name.trim())?)
    })
    .await?;
    publish_event(&state, StoreEvent::NewCategory(category.clone())).await;
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/categories/{id}
async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<CategoryBody>,
) -> Result<Json<Category>, ApiError> {
    validate_name(&body.name)?;
    let id = CategoryId::from_string(id);
    let category = run_blocking(&state.pool, move |conn| {
        Ok(CategoryRepo::update(conn, &id, body.name.trim())?)
    })
    .await?;
    publish_event(&state, StoreEvent::UpdateCategory(category.clone())).await;
    Ok(Json(category))
}

/// DELETE /api/categories/{id}
async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = CategoryId::from_string(id);
    let deleted = run_blocking(&state.pool, move |conn| {
        Ok(CategoryRepo::delete(conn, &id)?)
    })
    .await?;
    publish_event(&state, StoreEvent::DeleteCategory(deleted)).await;
    Ok(StatusCode::NO_CONTENT)
}
