use axum::extract::FromRef;
use std::sync::Arc;

use crate::services::auth_service::AuthService;
use crate::services::expense_service::ExpenseService;

/// Shared, immutable application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub expense_service: Arc<dyn ExpenseService>,
}

impl AppState {
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        expense_service: Arc<dyn ExpenseService>,
    ) -> Self {
        Self {
            auth_service,
            expense_service,
        }
    }
}

impl FromRef<AppState> for Arc<dyn AuthService> {
    fn from_ref(state: &AppState) -> Self {
        state.auth_service.clone()
    }
}

impl FromRef<AppState> for Arc<dyn ExpenseService> {
    fn from_ref(state: &AppState) -> Self {
        state.expense_service.clone()
    }
}
