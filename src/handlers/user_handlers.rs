use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;

use crate::error::{ApiError, ErrorResponse};
use crate::models::user::{PublicUser, RegisterUserRequest};
use crate::services::auth_service::AuthService;

/// Handler for user registration
///
/// Creates a new user account with a bcrypt-hashed password.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "User successfully registered", body = PublicUser),
        (status = 422, description = "Missing or invalid field, or username taken", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "users"
)]
pub async fn register_handler(
    State(auth_service): State<Arc<dyn AuthService>>,
    Json(request): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    let user = auth_service.register(request).await?;
    tracing::info!(username = %user.username, "registered user");
    Ok((StatusCode::CREATED, Json(user.to_public())))
}
