use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use uuid::Uuid;

use agora_types::api::UserBody;
use agora_types::models::SafeUser;

use crate::AppState;
use crate::error::ApiError;

fn is_user_body_valid(body: &UserBody) -> bool {
    !body.username.is_empty() && !body.password.is_empty()
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("Error when hashing password: {}", e)))
}

/// POST /user/signup
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<UserBody>,
) -> Result<Json<SafeUser>, ApiError> {
    if !is_user_body_valid(&req) {
        return Err(ApiError::BadRequest("Invalid user body".into()));
    }

    // Check if username is taken
    if state
        .db
        .get_user_by_username(&req.username)
        .map_err(|e| ApiError::internal("saving a user", e))?
        .is_some()
    {
        return Err(ApiError::Conflict("Username already taken".into()));
    }

    let password_hash = hash_password(&req.password)?;

    let user = state
        .db
        .save_user(Uuid::new_v4(), &req.username, &password_hash, Utc::now())
        .map_err(|e| ApiError::internal("saving a user", e))?;

    Ok(Json(user))
}

/// POST /user/login
pub async fn user_login(
    State(state): State<AppState>,
    Json(req): Json<UserBody>,
) -> Result<Json<SafeUser>, ApiError> {
    if !is_user_body_valid(&req) {
        return Err(ApiError::BadRequest("Invalid user body".into()));
    }

    let Some(row) = state
        .db
        .get_credentials(&req.username)
        .map_err(|e| ApiError::internal("logging in", e))?
    else {
        return Err(ApiError::Unauthorized("Invalid username or password".into()));
    };

    // Verify password
    let parsed_hash = PasswordHash::new(&row.password)
        .map_err(|e| ApiError::Internal(format!("Error during login: {}", e)))?;

    if Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(ApiError::Unauthorized("Invalid username or password".into()));
    }

    // Re-read through the safe projection so the hash never leaves this fn
    state
        .db
        .get_user_by_username(&row.username)
        .map_err(|e| ApiError::internal("logging in", e))?
        .map(Json)
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or password".into()))
}

/// GET /user/getUser/{username}
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<SafeUser>, ApiError> {
    state
        .db
        .get_user_by_username(&username)
        .map_err(|e| ApiError::internal("fetching user", e))?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("User not found".into()))
}

/// PATCH /user/resetPassword
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<UserBody>,
) -> Result<Json<SafeUser>, ApiError> {
    if !is_user_body_valid(&req) {
        return Err(ApiError::BadRequest("Invalid user body".into()));
    }

    let password_hash = hash_password(&req.password)?;

    state
        .db
        .update_user_password(&req.username, &password_hash)
        .map_err(|e| ApiError::internal("updating user", e))?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("User not found".into()))
}

/// DELETE /user/deleteUser/{username}
pub async fn delete_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<SafeUser>, ApiError> {
    state
        .db
        .delete_user_by_username(&username)
        .map_err(|e| ApiError::internal("deleting user", e))?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("User not found".into()))
}
