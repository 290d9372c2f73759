use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use crate::error::{ApiError, ErrorResponse, MessageResponse};
use crate::extract::JsonBody;
use crate::models::expense::{
    BodyId, CreateExpenseRequest, ExpenseChanges, ExpenseResponse, FieldError, NewExpense,
    UpdateExpenseRequest, first_missing_field,
};
use crate::services::expense_service::{ExpenseService, ensure_ids_match};

/// Handler for listing expenses
///
/// Returns every expense in store order.
#[utoipa::path(
    get,
    path = "/api/expenses",
    responses(
        (status = 200, description = "List of expenses", body = Vec<ExpenseResponse>),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = MessageResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "expenses"
)]
pub async fn list_expenses_handler(
    State(expense_service): State<Arc<dyn ExpenseService>>,
) -> Result<Json<Vec<ExpenseResponse>>, ApiError> {
    let expenses = expense_service.list_expenses().await?;
    Ok(Json(expenses.iter().map(|e| e.to_response()).collect()))
}

/// Handler for creating an expense
///
/// `description`, `note` and `amount` are required; the first one missing
/// is reported as the error location. Types are checked only once all three
/// are present.
#[utoipa::path(
    post,
    path = "/api/expenses",
    request_body = CreateExpenseRequest,
    responses(
        (status = 201, description = "Expense successfully created", body = ExpenseResponse),
        (status = 400, description = "Malformed JSON", body = String, content_type = "text/plain"),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorResponse),
        (status = 422, description = "Missing or invalid field", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = MessageResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "expenses"
)]
pub async fn create_expense_handler(
    State(expense_service): State<Arc<dyn ExpenseService>>,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, Json<ExpenseResponse>), ApiError> {
    let new_expense = NewExpense::from_json(&body).map_err(|e| match e {
        FieldError::Missing(field) => ApiError::missing_field(field),
        FieldError::Invalid { field, message } => ApiError::Validation {
            message,
            location: field.to_string(),
        },
    })?;

    let expense = expense_service.create_expense(new_expense).await?;

    Ok((StatusCode::CREATED, Json(expense.to_response())))
}

/// Handler for updating an expense
///
/// Replaces description, note and amount. Presence of the three fields is
/// checked first, then the body `id` against the path id, then field types;
/// every one of those failures is a plain-text 400.
#[utoipa::path(
    put,
    path = "/api/expenses/{id}",
    params(
        ("id" = String, Path, description = "Expense ID")
    ),
    request_body = UpdateExpenseRequest,
    responses(
        (status = 200, description = "Expense successfully updated", body = ExpenseResponse),
        (status = 400, description = "Malformed body, missing or invalid field, or id mismatch", body = String, content_type = "text/plain"),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorResponse),
        (status = 404, description = "Expense not found", body = MessageResponse),
        (status = 500, description = "Internal server error", body = MessageResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "expenses"
)]
pub async fn update_expense_handler(
    State(expense_service): State<Arc<dyn ExpenseService>>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Json<ExpenseResponse>, ApiError> {
    if let Some(field) = first_missing_field(&body) {
        return Err(ApiError::BadRequest(
            FieldError::Missing(field).to_string(),
        ));
    }

    let body_id = BodyId::from_json(&body);
    ensure_ids_match(&id, &body_id)?;

    let changes =
        ExpenseChanges::from_json(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let expense = expense_service
        .update_expense(&id, &body_id, changes)
        .await?;

    Ok(Json(expense.to_response()))
}

/// Handler for deleting an expense
///
/// Always answers 204, whether or not the expense existed.
#[utoipa::path(
    delete,
    path = "/api/expenses/{id}",
    params(
        ("id" = String, Path, description = "Expense ID")
    ),
    responses(
        (status = 204, description = "Expense removed or already absent"),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = MessageResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "expenses"
)]
pub async fn delete_expense_handler(
    State(expense_service): State<Arc<dyn ExpenseService>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    expense_service.delete_expense(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
