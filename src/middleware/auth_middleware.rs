use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::auth::TokenUser;
use crate::services::auth_service::{AuthError, AuthService};

/// Extension type to store the authenticated identity in the request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<TokenUser> for AuthenticatedUser {
    fn from(user: TokenUser) -> Self {
        Self {
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

impl From<AuthenticatedUser> for TokenUser {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

/// Auth middleware that validates the bearer JWT and adds the identity to
/// request extensions. The store is never consulted.
pub async fn auth_middleware(
    State(auth_service): State<Arc<dyn AuthService>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, TokenRejection> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(TokenRejection::MissingToken)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(TokenRejection::InvalidTokenFormat)?;

    let user = auth_service.validate_token(token).map_err(|e| match e {
        AuthError::TokenExpired => TokenRejection::TokenExpired,
        _ => TokenRejection::InvalidToken,
    })?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser::from(user));

    Ok(next.run(request).await)
}

/// Reasons a bearer token is refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    MissingToken,
    InvalidTokenFormat,
    InvalidToken,
    TokenExpired,
}

impl TokenRejection {
    pub fn message(self) -> &'static str {
        match self {
            TokenRejection::MissingToken => "Missing authorization token",
            TokenRejection::InvalidTokenFormat => {
                "Invalid authorization header format. Expected: Bearer <token>"
            }
            TokenRejection::InvalidToken => "Invalid or malformed token",
            TokenRejection::TokenExpired => "Token has expired",
        }
    }
}

impl IntoResponse for TokenRejection {
    fn into_response(self) -> Response {
        tracing::debug!(reason = self.message(), "rejected bearer token");
        ApiError::Authentication(self.message().to_string()).into_response()
    }
}
