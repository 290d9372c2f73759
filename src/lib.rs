//! Expense tracker REST API.
//!
//! Users register and log in for a JWT; expense CRUD sits behind bearer
//! verification. Persistence goes through repository traits with a
//! PostgreSQL implementation.

pub mod config;
pub mod docs;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod server;
pub mod services;
pub mod state;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use error::ApiError;
pub use server::{Server, create_router, run_server};
pub use state::AppState;
