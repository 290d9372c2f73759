use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::expense::{BodyId, Expense, ExpenseChanges, NewExpense};
use crate::repositories::RepositoryError;
use crate::repositories::expense_repository::ExpenseRepository;

/// Expense service errors
#[derive(Debug, thiserror::Error)]
pub enum ExpenseError {
    #[error("Request path id ({path_id}) and request body id ({body_id}) must match")]
    IdMismatch { path_id: String, body_id: String },

    #[error("Expense not found")]
    EntryNotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<RepositoryError> for ExpenseError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ExpenseError::EntryNotFound,
            RepositoryError::DatabaseError(msg) => ExpenseError::DatabaseError(msg),
            RepositoryError::ConstraintViolation(msg) => ExpenseError::DatabaseError(msg),
        }
    }
}

impl From<ExpenseError> for ApiError {
    fn from(err: ExpenseError) -> Self {
        match err {
            ExpenseError::IdMismatch { .. } => ApiError::BadRequest(err.to_string()),
            ExpenseError::EntryNotFound => ApiError::NotFound,
            ExpenseError::DatabaseError(msg) => ApiError::Internal(msg),
        }
    }
}

/// Trait defining expense service operations
///
/// Expenses are shared: any authenticated caller may read or modify any
/// record.
#[async_trait]
pub trait ExpenseService: Send + Sync {
    /// All expenses in store order
    async fn list_expenses(&self) -> Result<Vec<Expense>, ExpenseError>;

    /// Persist a new expense
    async fn create_expense(&self, expense: NewExpense) -> Result<Expense, ExpenseError>;

    /// Replace description, note and amount of the expense at `path_id`.
    ///
    /// `body_id` must be a string equal to `path_id`.
    async fn update_expense(
        &self,
        path_id: &str,
        body_id: &BodyId,
        changes: ExpenseChanges,
    ) -> Result<Expense, ExpenseError>;

    /// Remove an expense; succeeds whether or not it existed
    async fn delete_expense(&self, id: &str) -> Result<(), ExpenseError>;
}

/// Fails with `IdMismatch` unless the body id is the path id as a string
pub fn ensure_ids_match(path_id: &str, body_id: &BodyId) -> Result<(), ExpenseError> {
    if body_id.matches(path_id) {
        return Ok(());
    }
    Err(ExpenseError::IdMismatch {
        path_id: path_id.to_string(),
        body_id: body_id.to_string(),
    })
}

/// Implementation of ExpenseService
pub struct ExpenseServiceImpl {
    expense_repository: Arc<dyn ExpenseRepository>,
}

impl ExpenseServiceImpl {
    pub fn new(expense_repository: Arc<dyn ExpenseRepository>) -> Self {
        Self { expense_repository }
    }
}

#[async_trait]
impl ExpenseService for ExpenseServiceImpl {
    async fn list_expenses(&self) -> Result<Vec<Expense>, ExpenseError> {
        Ok(self.expense_repository.find_all().await?)
    }

    async fn create_expense(&self, expense: NewExpense) -> Result<Expense, ExpenseError> {
        let created = self.expense_repository.create(expense).await?;
        tracing::debug!(id = %created.id, "created expense");
        Ok(created)
    }

    async fn update_expense(
        &self,
        path_id: &str,
        body_id: &BodyId,
        changes: ExpenseChanges,
    ) -> Result<Expense, ExpenseError> {
        ensure_ids_match(path_id, body_id)?;

        // An id that is not a UUID cannot name a stored record
        let id = Uuid::parse_str(path_id).map_err(|_| ExpenseError::EntryNotFound)?;

        self.expense_repository
            .update(id, changes)
            .await?
            .ok_or(ExpenseError::EntryNotFound)
    }

    async fn delete_expense(&self, id: &str) -> Result<(), ExpenseError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(());
        };

        let removed = self.expense_repository.delete(id).await?;
        if removed {
            tracing::debug!(%id, "deleted expense");
        }
        Ok(())
    }
}
