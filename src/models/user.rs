use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::auth::TokenUser;
use crate::validation::{validate_password, validate_username};

/// User entity representing a registered user in the system
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Public representation returned by the users endpoint
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }

    pub fn to_token_user(&self) -> TokenUser {
        TokenUser {
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}

/// Public view of a user; never carries the password hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// Request payload for user registration
///
/// `username` and `password` are optional at the type level so that a
/// missing field can be reported with its name instead of a generic
/// deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "username": "jdoe",
    "password": "correct horse battery",
    "firstName": "John",
    "lastName": "Doe"
}))]
pub struct RegisterUserRequest {
    #[validate(custom(function = "validate_username"))]
    pub username: Option<String>,

    #[validate(custom(function = "validate_password"))]
    pub password: Option<String>,

    pub first_name: Option<String>,

    pub last_name: Option<String>,
}

impl RegisterUserRequest {
    /// First required field absent from the body, checked in the order
    /// username, password
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.username.is_none() {
            Some("username")
        } else if self.password.is_none() {
            Some("password")
        } else {
            None
        }
    }
}

/// Validated registration data ready to be persisted
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}
