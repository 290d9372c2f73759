//! Shared fixtures for router-level tests: in-memory repositories and
//! request helpers.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode},
};
use chrono::Utc;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;

use expense_tracker::models::expense::{Expense, ExpenseChanges, NewExpense};
use expense_tracker::models::user::{NewUser, User};
use expense_tracker::repositories::RepositoryError;
use expense_tracker::repositories::expense_repository::ExpenseRepository;
use expense_tracker::repositories::user_repository::UserRepository;
use expense_tracker::server::{cors_layer, create_router};
use expense_tracker::services::auth_service::{AuthService, AuthServiceImpl};
use expense_tracker::services::expense_service::{ExpenseService, ExpenseServiceImpl};
use expense_tracker::state::AppState;

pub const JWT_SECRET: &str = "test_secret";
pub const CLIENT_ORIGIN: &str = "http://localhost:3000";

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser, password_hash: String) -> Result<User, RepositoryError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.username == user.username) {
            return Err(RepositoryError::ConstraintViolation(
                "Username already taken".to_string(),
            ));
        }

        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: Utc::now(),
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.username == username).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryExpenseRepository {
    expenses: Mutex<Vec<Expense>>,
}

#[async_trait]
impl ExpenseRepository for InMemoryExpenseRepository {
    async fn create(&self, expense: NewExpense) -> Result<Expense, RepositoryError> {
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
        Ok(self.expenses.lock().unwrap().clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Expense>, RepositoryError> {
        let expenses = self.expenses.lock().unwrap();
        Ok(expenses.iter().find(|e| e.id == id).cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        changes: ExpenseChanges,
    ) -> Result<Option<Expense>, RepositoryError> {
        let mut expenses = self.expenses.lock().unwrap();
        Ok(expenses.iter_mut().find(|e| e.id == id).map(|expense| {
            expense.description = changes.description;
            expense.note = changes.note;
            expense.amount = changes.amount;
            expense.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut expenses = self.expenses.lock().unwrap();
        let before = expenses.len();
        expenses.retain(|e| e.id != id);
        Ok(expenses.len() != before)
    }
}

/// Store that fails every call, for the generic 500 path
pub struct BrokenExpenseRepository;

#[async_trait]
impl ExpenseRepository for BrokenExpenseRepository {
    async fn create(&self, _expense: NewExpense) -> Result<Expense, RepositoryError> {
        Err(RepositoryError::DatabaseError("connection reset by peer".to_string()))
    }

    async fn find_all(&self) -> Result<Vec<Expense>, RepositoryError> {
        Err(RepositoryError::DatabaseError("connection reset by peer".to_string()))
    }

    async fn find_by_id(&self, _id: Uuid) -> Result<Option<Expense>, RepositoryError> {
        Err(RepositoryError::DatabaseError("connection reset by peer".to_string()))
    }

    async fn update(
        &self,
        _id: Uuid,
        _changes: ExpenseChanges,
    ) -> Result<Option<Expense>, RepositoryError> {
        Err(RepositoryError::DatabaseError("connection reset by peer".to_string()))
    }

    async fn delete(&self, _id: Uuid) -> Result<bool, RepositoryError> {
        Err(RepositoryError::DatabaseError("connection reset by peer".to_string()))
    }
}

pub struct TestApp {
    pub router: Router,
    pub auth_service: Arc<dyn AuthService>,
    pub expenses: Arc<dyn ExpenseRepository>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_expense_repository(Arc::new(InMemoryExpenseRepository::default()))
    }

    pub fn with_expense_repository(expenses: Arc<dyn ExpenseRepository>) -> Self {
        let auth_service: Arc<dyn AuthService> = Arc::new(AuthServiceImpl::new(
            Arc::new(InMemoryUserRepository::default()),
            JWT_SECRET.to_string(),
        ));
        let expense_service: Arc<dyn ExpenseService> =
            Arc::new(ExpenseServiceImpl::new(expenses.clone()));

        let state = AppState::new(auth_service.clone(), expense_service);
        let router = create_router(state, cors_layer(CLIENT_ORIGIN).unwrap());

        Self {
            router,
            auth_service,
            expenses,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Register `username` through the API and log in for a bearer token
    pub async fn token_for(&self, username: &str) -> String {
        let response = self
            .send(json_request(
                "POST",
                "/api/users",
                None,
                &serde_json::json!({
                    "username": username,
                    "password": "passwordExample",
                    "firstName": "Example",
                    "lastName": "User"
                }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = self
            .send(json_request(
                "POST",
                "/api/auth/login",
                None,
                &serde_json::json!({ "username": username, "password": "passwordExample" }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = parse_json_body(response).await;
        body["authToken"].as_str().unwrap().to_string()
    }
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

/// Request with an arbitrary body and optional `Content-Type`
pub fn raw_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    content_type: Option<&str>,
    body: &str,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body")
        .to_vec()
}

pub async fn parse_json_body(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("Failed to parse JSON")
}
