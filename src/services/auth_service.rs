use async_trait::async_trait;
use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::ApiError;
use crate::models::auth::{AuthToken, LoginRequest, TokenUser};
use crate::models::user::{NewUser, RegisterUserRequest, User};
use crate::repositories::RepositoryError;
use crate::repositories::user_repository::UserRepository;
use crate::validation::first_field_error;

pub const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user: TokenUser,
    pub sub: String, // username
    pub iat: i64,
    pub exp: i64,
}

/// Authentication service errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("{field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },

    #[error("Username already taken")]
    DuplicateUsername,

    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingField(field) => ApiError::missing_field(field),
            AuthError::InvalidField { field, message } => ApiError::Validation {
                message,
                location: field.to_string(),
            },
            AuthError::DuplicateUsername => ApiError::Validation {
                message: "Username already taken".to_string(),
                location: "username".to_string(),
            },
            AuthError::InvalidCredentials => {
                ApiError::Authentication("Incorrect username or password".to_string())
            }
            AuthError::InvalidToken => {
                ApiError::Authentication("Invalid or malformed token".to_string())
            }
            AuthError::TokenExpired => ApiError::Authentication("Token has expired".to_string()),
            AuthError::DatabaseError(msg) => ApiError::Internal(msg),
        }
    }
}

/// Trait defining authentication service operations
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user
    async fn register(&self, request: RegisterUserRequest) -> Result<User, AuthError>;

    /// Verify credentials and issue a JWT
    async fn login(&self, request: LoginRequest) -> Result<AuthToken, AuthError>;

    /// Issue a fresh JWT for an already verified identity
    fn refresh(&self, user: &TokenUser) -> Result<AuthToken, AuthError>;

    /// Check a JWT's signature and expiry and return the embedded identity
    fn validate_token(&self, token: &str) -> Result<TokenUser, AuthError>;
}

/// Implementation of AuthService
pub struct AuthServiceImpl {
    user_repository: Arc<dyn UserRepository>,
    jwt_secret: String,
    token_ttl: Duration,
}

impl AuthServiceImpl {
    pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 7;

    pub fn new(user_repository: Arc<dyn UserRepository>, jwt_secret: String) -> Self {
        Self {
            user_repository,
            jwt_secret,
            token_ttl: Duration::days(Self::DEFAULT_TOKEN_TTL_DAYS),
        }
    }

    /// Override how long issued tokens stay valid
    pub fn with_token_ttl(mut self, token_ttl: Duration) -> Self {
        self.token_ttl = token_ttl;
        self
    }

    /// Hash a password using bcrypt
    fn hash_password(password: &str) -> Result<String, AuthError> {
        hash(password, DEFAULT_COST)
            .map_err(|e| AuthError::DatabaseError(format!("Password hashing failed: {}", e)))
    }

    /// Verify a password against a hash
    fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
        verify(password, hash)
            .map_err(|e| AuthError::DatabaseError(format!("Password verification failed: {}", e)))
    }

    /// Generate a JWT token for a user
    fn generate_jwt(&self, user: &TokenUser) -> Result<AuthToken, AuthError> {
        let issued_at = Utc::now();
        let expiration = issued_at + self.token_ttl;

        let claims = Claims {
            user: user.clone(),
            sub: user.username.clone(),
            iat: issued_at.timestamp(),
            exp: expiration.timestamp(),
        };

        let token = encode(
            &Header::new(JWT_ALGORITHM),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::DatabaseError(format!("Token generation failed: {}", e)))?;

        Ok(AuthToken {
            auth_token: token,
            expires_at: expiration,
        })
    }

    /// Decode and validate a JWT token
    fn decode_jwt(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::new(JWT_ALGORITHM),
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?;

        Ok(token_data.claims)
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    async fn register(&self, request: RegisterUserRequest) -> Result<User, AuthError> {
        if let Some(field) = request.missing_field() {
            return Err(AuthError::MissingField(field));
        }

        if let Err(errors) = request.validate() {
            if let Some((field, message)) = first_field_error(&errors, &["username", "password"]) {
                return Err(AuthError::InvalidField { field, message });
            }
        }

        let RegisterUserRequest {
            username,
            password,
            first_name,
            last_name,
        } = request;
        let (Some(username), Some(password)) = (username, password) else {
            return Err(AuthError::MissingField("username"));
        };

        let password_hash = Self::hash_password(&password)?;

        let new_user = NewUser {
            username,
            first_name: first_name.unwrap_or_default().trim().to_string(),
            last_name: last_name.unwrap_or_default().trim().to_string(),
        };

        self.user_repository
            .create(new_user, password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::ConstraintViolation(_) => AuthError::DuplicateUsername,
                RepositoryError::DatabaseError(msg) => AuthError::DatabaseError(msg),
                RepositoryError::NotFound => {
                    AuthError::DatabaseError("Unexpected error".to_string())
                }
            })
    }

    async fn login(&self, request: LoginRequest) -> Result<AuthToken, AuthError> {
        let user = self
            .user_repository
            .find_by_username(&request.username)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        let is_valid = Self::verify_password(&request.password, &user.password_hash)?;
        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(username = %user.username, "issued token");
        self.generate_jwt(&user.to_token_user())
    }

    fn refresh(&self, user: &TokenUser) -> Result<AuthToken, AuthError> {
        self.generate_jwt(user)
    }

    fn validate_token(&self, token: &str) -> Result<TokenUser, AuthError> {
        let claims = self.decode_jwt(token)?;
        if claims.sub != claims.user.username {
            return Err(AuthError::InvalidToken);
        }
        Ok(claims.user)
    }
}
