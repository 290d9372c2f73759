use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error::{ErrorResponse, MessageResponse};
use crate::handlers::auth_handlers::ProtectedData;
use crate::models::auth::{AuthToken, LoginRequest, TokenUser};
use crate::models::expense::{CreateExpenseRequest, CreatedAt, ExpenseResponse, UpdateExpenseRequest};
use crate::models::user::{PublicUser, RegisterUserRequest};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::user_handlers::register_handler,
        crate::handlers::auth_handlers::login_handler,
        crate::handlers::auth_handlers::refresh_handler,
        crate::handlers::auth_handlers::protected_handler,
        crate::handlers::expense_handlers::list_expenses_handler,
        crate::handlers::expense_handlers::create_expense_handler,
        crate::handlers::expense_handlers::update_expense_handler,
        crate::handlers::expense_handlers::delete_expense_handler,
    ),
    components(
        schemas(
            RegisterUserRequest,
            PublicUser,
            LoginRequest,
            AuthToken,
            TokenUser,
            ProtectedData,
            CreateExpenseRequest,
            UpdateExpenseRequest,
            ExpenseResponse,
            CreatedAt,
            ErrorResponse,
            MessageResponse
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "users", description = "User registration"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "expenses", description = "Expense management")
    ),
    info(
        title = "Expense Tracker API",
        version = "0.1.0",
        description = "REST API for tracking expenses",
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
