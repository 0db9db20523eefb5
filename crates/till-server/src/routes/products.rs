//! Product CRUD.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;

use till_core::{Product, ProductId, StoreEvent};
use till_store::{NewProduct, ProductRepo};

use super::{publish_event, run_blocking, validate_name, validate_price, validate_units};
use crate::errors::ApiError;
use crate::server::AppState;

/// Routes under `/api/products`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/{id}", put(update_product).delete(delete_product))
}

#[derive(Debug, Deserialize)]
struct ProductBody {
    name: String,
    #[serde(default)]
    units: i64,
    #[serde(default)]
    price: f64,
}

impl ProductBody {
    fn validate(&self) -> Result<(), ApiError> {
        validate_name(&self.name)?;
        validate_units(self.units)?;
        validate_price(self.price)
    }
}

/// GET /api/products
async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    let products = run_blocking(&state.pool, |conn| Ok(ProductRepo::list(conn)?)).await?;
    Ok(Json(products))
}

/// POST /api/products
async fn create_product(
    State(state): State<AppState>,
    Json(body): Json<ProductBody>,
) -> Result<impl IntoResponse, ApiError> {
    body.validate()?;
    let product = run_blocking(&state.pool, move |conn| {
        Ok(ProductRepo::create(
            conn,
            &NewProduct {
                name: body.name.trim(),
                units: body.units,
                price: body.price,
            },
        )?)
    })
    .await?;
    publish_event(&state, StoreEvent::NewProduct(product.clone())).await;
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/products/{id}
async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ProductBody>,
) -> Result<Json<Product>, ApiError> {
    body.validate()?;
    let id = ProductId::from_string(id);
    let product = run_blocking(&state.pool, move |conn| {
        Ok(ProductRepo::update(
            conn,
            &id,
            &NewProduct {
                name: body.name.trim(),
                units: body.units,
                price: body.price,
            },
        )?)
    })
    .await?;
    publish_event(&state, StoreEvent::UpdateProduct(product.clone())).await;
    Ok(Json(product))
}

/// DELETE /api/products/{id}
async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = ProductId::from_string(id);
    let deleted = run_blocking(&state.pool, move |conn| Ok(ProductRepo::delete(conn, &id)?)).await?;
    publish_event(&state, StoreEvent::DeleteProduct(deleted)).await;
    Ok(StatusCode::NO_CONTENT)
}
