use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::user::{NewUser, User};
use crate::repositories::RepositoryError;

/// Trait defining user repository operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user; a taken username is a `ConstraintViolation`
    async fn create(&self, user: NewUser, password_hash: String) -> Result<User, RepositoryError>;

    /// Find a user by username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;
}

/// PostgreSQL implementation of UserRepository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: NewUser, password_hash: String) -> Result<User, RepositoryError> {
        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, first_name, last_name)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, password_hash, first_name, last_name, created_at
            "#,
        )
        .bind(&user.username)
        .bind(password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db_err)) => {
                // Unique constraint on username
                if db_err.is_unique_violation() {
                    Err(RepositoryError::ConstraintViolation(
                        "Username already taken".to_string(),
                    ))
                } else {
                    Err(RepositoryError::DatabaseError(db_err.to_string()))
                }
            }
            Err(e) => Err(RepositoryError::DatabaseError(e.to_string())),
        }
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, first_name, last_name, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
