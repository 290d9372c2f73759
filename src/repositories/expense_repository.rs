use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::expense::{Expense, ExpenseChanges, NewExpense};
use crate::repositories::RepositoryError;

/// Trait defining expense repository operations
///
/// Each call is issued once against the store; implementations must not
/// retry.
#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    /// Persist a new expense; the store assigns the id
    async fn create(&self, expense: NewExpense) -> Result<Expense, RepositoryError>;

    /// All expenses in insertion order
    async fn find_all(&self) -> Result<Vec<Expense>, RepositoryError>;

    /// Find an expense by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Expense>, RepositoryError>;

    /// Replace description, note and amount in place; `None` when no record has this id
    async fn update(
        &self,
        id: Uuid,
        changes: ExpenseChanges,
    ) -> Result<Option<Expense>, RepositoryError>;

    /// Remove an expense; returns whether a record was removed
    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;
}

/// PostgreSQL implementation of ExpenseRepository
pub struct PostgresExpenseRepository {
    pool: PgPool,
}

impl PostgresExpenseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExpenseRepository for PostgresExpenseRepository {
    async fn create(&self, expense: NewExpense) -> Result<Expense, RepositoryError> {
        let created = sqlx::query_as::<_, Expense>(
            r#"
            INSERT INTO expenses (description, note, amount, created_at)
            VALUES ($1, $2, $3, COALESCE($4, NOW()))
            RETURNING id, description, note, amount, created_at
            "#,
        )
        .bind(&expense.description)
        .bind(&expense.note)
        .bind(expense.amount)
        .bind(expense.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_all(&self) -> Result<Vec<Expense>, RepositoryError> {
        let expenses = sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, description, note, amount, created_at
            FROM expenses
            ORDER BY seq
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(expenses)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Expense>, RepositoryError> {
        let expense = sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, description, note, amount, created_at
            FROM expenses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(expense)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: ExpenseChanges,
    ) -> Result<Option<Expense>, RepositoryError> {
        let updated = sqlx::query_as::<_, Expense>(
            r#"
            UPDATE expenses
            SET description = $2, note = $3, amount = $4
            WHERE id = $1
            RETURNING id, description, note, amount, created_at
            "#,
        )
        .bind(id)
        .bind(&changes.description)
        .bind(&changes.note)
        .bind(changes.amount)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
