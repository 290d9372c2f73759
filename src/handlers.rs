pub mod auth_handlers;
pub mod expense_handlers;
pub mod user_handlers;

use axum::response::IntoResponse;

use crate::error::ApiError;

/// Catch-all for unmatched routes and unregistered methods
pub async fn not_found_handler() -> impl IntoResponse {
    ApiError::NotFound
}
