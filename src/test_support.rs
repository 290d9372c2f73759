//! In-memory repositories shared by unit tests.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;
use uuid::Uuid;

use crate::models::expense::{Expense, ExpenseChanges, NewExpense};
use crate::models::user::{NewUser, User};
use crate::repositories::RepositoryError;
use crate::repositories::expense_repository::ExpenseRepository;
use crate::repositories::user_repository::UserRepository;

pub struct MockUserRepository {
    users: Mutex<Vec<User>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn create(&self, user: NewUser, password_hash: String) -> Result<User, RepositoryError> {
        let mut users = self.users.lock().unwrap();

        if users.iter().any(|u| u.username == user.username) {
            return Err(RepositoryError::ConstraintViolation(
                "Username already taken".to_string(),
            ));
        }

        let new_user = User {
            id: Uuid::new_v4(),
            username: user.username,
            password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: Utc::now(),
        };

        users.push(new_user.clone());
        Ok(new_user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.username == username).cloned())
    }
}

/// Keeps expenses in insertion order; `with_failure` makes every call fail
pub struct MockExpenseRepository {
    expenses: Mutex<Vec<Expense>>,
    should_fail: bool,
}

impl MockExpenseRepository {
    pub fn new() -> Self {
        Self {
            expenses: Mutex::new(Vec::new()),
            should_fail: false,
        }
    }

    pub fn with_failure() -> Self {
        Self {
            expenses: Mutex::new(Vec::new()),
            should_fail: true,
        }
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.should_fail {
            return Err(RepositoryError::DatabaseError(
                "Database connection failed".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ExpenseRepository for MockExpenseRepository {
    async fn create(&self, expense: NewExpense) -> Result<Expense, RepositoryError> {
        self.check()?;
        let created = Expense {
            id: Uuid::new_v4(),
            description: expense.description,
            note: expense.note,
            amount: expense.amount,
            created_at: expense.created_at.unwrap_or_else(Utc::now),
        };
        self.expenses.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn find_all(&self) -> Result<Vec<Expense>, RepositoryError> {
        self.check()?;
        Ok(self.expenses.lock().unwrap().clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Expense>, RepositoryError> {
        self.check()?;
        let expenses = self.expenses.lock().unwrap();
        Ok(expenses.iter().find(|e| e.id == id).cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        changes: ExpenseChanges,
    ) -> Result<Option<Expense>, RepositoryError> {
        self.check()?;
        let mut expenses = self.expenses.lock().unwrap();
        Ok(expenses.iter_mut().find(|e| e.id == id).map(|expense| {
            expense.description = changes.description;
            expense.note = changes.note;
            expense.amount = changes.amount;
            expense.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        self.check()?;
        let mut expenses = self.expenses.lock().unwrap();
        let before = expenses.len();
        expenses.retain(|e| e.id != id);
        Ok(expenses.len() != before)
    }
}
