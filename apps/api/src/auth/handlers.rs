use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::auth::password::verify_password;
use crate::errors::AppError;
use crate::models::profile::UserRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub name: Option<String>,
}

async fn find_user(pool: &PgPool, username: &str) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await
}

/// POST /api/login
pub async fn handle_login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(request) = body?;
    let (Some(username), Some(password)) = (
        request.username.filter(|u| !u.is_empty()),
        request.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::Validation(
            "Username and password are required".to_string(),
        ));
    };

    let invalid = || AppError::Unauthorized("Invalid credentials".to_string());

    let Some(user) = find_user(&state.db, &username).await? else {
        warn!("Login attempt for unknown user '{username}'");
        return Err(invalid());
    };
    if !verify_password(&password, &user.password_hash).await? {
        warn!("Bad password for user '{username}'");
        return Err(invalid());
    }

    let token = state
        .jwt
        .issue(&user.id.to_string())
        .map_err(|e| AppError::Internal(e.into()))?;
    info!("User '{}' logged in", user.username);

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        name: user.name,
    }))
}
