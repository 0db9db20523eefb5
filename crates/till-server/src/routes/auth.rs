//! Registration and login.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router, extract::State};
use serde::{Deserialize, Serialize};
use tracing::info;

use till_auth::{hash_password, verify_password};
use till_store::UserRepo;

use super::run_blocking;
use crate::errors::ApiError;
use crate::server::AppState;

/// Routes under `/api/auth`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

#[derive(Debug, Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    token: String,
    message: String,
}

/// POST /api/auth/register
async fn register(
    State(state): State<AppState>,
    Json(body): Json<Credentials>,
) -> Result<impl IntoResponse, ApiError> {
    let username = body.username.trim().to_owned();
    if username.is_empty() {
        return Err(ApiError::Validation("username is required".into()));
    }
    if body.password.is_empty() {
        return Err(ApiError::Validation("password is required".into()));
    }

    let password = body.password;
    let user = run_blocking(&state.pool, move |conn| {
        // Hashing is deliberately slow; keep it off the async runtime too.
        let hash = hash_password(&password);
        Ok(UserRepo::create(conn, &username, &hash)?)
    })
    .await?;

    info!(username = %user.username, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "user registered".into(),
        }),
    ))
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    Json(body): Json<Credentials>,
) -> Result<Json<LoginResponse>, ApiError> {
    let username = body.username.trim().to_owned();
    let password = body.password;

    let user = run_blocking(&state.pool, move |conn| {
        let user = UserRepo::find_by_username(conn, &username)?.ok_or(ApiError::Unauthorized)?;
        if !verify_password(&password, &user.password_hash) {
            return Err(ApiError::Unauthorized);
        }
        Ok(user)
    })
    .await?;

    let token = state.tokens.issue(&user.username)?;
    info!(username = %user.username, "user logged in");
    Ok(Json(LoginResponse {
        token,
        message: "login successful".into(),
    }))
}
