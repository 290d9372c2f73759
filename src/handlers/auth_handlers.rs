use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::{ApiError, ErrorResponse};
use crate::middleware::auth_middleware::AuthenticatedUser;
use crate::models::auth::{AuthToken, LoginRequest};
use crate::services::auth_service::AuthService;

/// Body of the example protected endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProtectedData {
    pub data: String,
}

/// Handler for user login
///
/// Verifies a username and password and returns a JWT.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthToken),
        (status = 401, description = "Incorrect username or password", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(auth_service): State<Arc<dyn AuthService>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthToken>, ApiError> {
    let token = auth_service.login(request).await?;
    Ok(Json(token))
}

/// Handler for token refresh
///
/// Issues a new JWT for the identity carried by the presented bearer token.
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    responses(
        (status = 200, description = "Token refreshed", body = AuthToken),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "auth"
)]
pub async fn refresh_handler(
    State(auth_service): State<Arc<dyn AuthService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<AuthToken>, ApiError> {
    let token = auth_service.refresh(&auth_user.into())?;
    Ok(Json(token))
}

/// Example endpoint that only needs a valid token
#[utoipa::path(
    get,
    path = "/api/protected",
    responses(
        (status = 200, description = "Access granted", body = ProtectedData),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "auth"
)]
pub async fn protected_handler() -> Json<ProtectedData> {
    Json(ProtectedData {
        data: "rosebud".to_string(),
    })
}
