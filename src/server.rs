//! Router assembly and the server lifecycle.
//!
//! [`run_server`] opens the store before it accepts connections and hands
//! back a [`Server`]; [`Server::close`] releases both in the reverse order.

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{Config, ConfigError};
use crate::docs::ApiDoc;
use crate::handlers::auth_handlers::{login_handler, protected_handler, refresh_handler};
use crate::handlers::expense_handlers::{
    create_expense_handler, delete_expense_handler, list_expenses_handler,
    update_expense_handler,
};
use crate::handlers::not_found_handler;
use crate::handlers::user_handlers::register_handler;
use crate::middleware::auth_middleware::auth_middleware;
use crate::repositories::expense_repository::PostgresExpenseRepository;
use crate::repositories::user_repository::PostgresUserRepository;
use crate::services::auth_service::{AuthService, AuthServiceImpl};
use crate::services::expense_service::{ExpenseService, ExpenseServiceImpl};
use crate::state::AppState;

const MAX_DB_CONNECTIONS: u32 = 5;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid CORS origin: {0}")]
    InvalidOrigin(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Listener error: {0}")]
    Io(#[from] io::Error),

    #[error("Server task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// CORS policy that admits a single origin
pub fn cors_layer(client_origin: &str) -> Result<CorsLayer, ServerError> {
    let origin = HeaderValue::from_str(client_origin)
        .map_err(|_| ServerError::InvalidOrigin(client_origin.to_string()))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]))
}

/// Build the application router.
///
/// Request logging wraps CORS, which wraps everything else. Bearer
/// verification only runs for routes that matched.
pub fn create_router(state: AppState, cors: CorsLayer) -> Router {
    let public_routes = Router::new()
        .route("/api/users", post(register_handler))
        .route("/api/auth/login", post(login_handler));

    let protected_routes = Router::new()
        .route("/api/auth/refresh", post(refresh_handler))
        .route("/api/protected", get(protected_handler))
        .route(
            "/api/expenses",
            get(list_expenses_handler).post(create_expense_handler),
        )
        .route(
            "/api/expenses/{id}",
            put(update_expense_handler).delete(delete_expense_handler),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", ApiDoc::openapi()))
        .fallback(not_found_handler)
        .method_not_allowed_fallback(not_found_handler)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Wire the Postgres repositories into the services
pub fn build_state(pool: PgPool, config: &Config) -> AppState {
    let user_repository = Arc::new(PostgresUserRepository::new(pool.clone()));
    let expense_repository = Arc::new(PostgresExpenseRepository::new(pool));

    let auth_service: Arc<dyn AuthService> = Arc::new(
        AuthServiceImpl::new(user_repository, config.jwt_secret.clone())
            .with_token_ttl(config.jwt_expiry),
    );
    let expense_service: Arc<dyn ExpenseService> =
        Arc::new(ExpenseServiceImpl::new(expense_repository));

    AppState::new(auth_service, expense_service)
}

/// A listener serving a router on a background task until closed
pub struct HttpServer {
    local_addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<io::Result<()>>,
}

impl HttpServer {
    pub fn start(listener: TcpListener, router: Router) -> io::Result<Self> {
        let local_addr = listener.local_addr()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    shutdown_rx.await.ok();
                })
                .await
        });

        tracing::info!(%local_addr, "listening");
        Ok(Self {
            local_addr,
            shutdown_tx,
            task,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections, drain in-flight requests and surface any
    /// error the listener hit.
    pub async fn close(self) -> Result<(), ServerError> {
        // The receiver is gone only if the serve task already exited; its
        // result is still collected below.
        self.shutdown_tx.send(()).ok();
        self.task.await??;
        tracing::info!(local_addr = %self.local_addr, "listener closed");
        Ok(())
    }
}

/// A running service: the store pool plus the HTTP listener
pub struct Server {
    pool: PgPool,
    http: HttpServer,
}

impl Server {
    pub fn local_addr(&self) -> SocketAddr {
        self.http.local_addr()
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close the store connection, then the listener
    pub async fn close(self) -> Result<(), ServerError> {
        tracing::info!("closing server");
        self.pool.close().await;
        self.http.close().await
    }
}

/// Connect to the store, run migrations, then bind and serve.
///
/// Any failure aborts startup; a store that was already opened is closed
/// before the error is returned.
pub async fn run_server(config: &Config, database_url: &str) -> Result<Server, ServerError> {
    let pool = PgPoolOptions::new()
        .max_connections(MAX_DB_CONNECTIONS)
        .connect(database_url)
        .await?;
    tracing::info!("connected to database");

    match start_http(pool.clone(), config).await {
        Ok(http) => Ok(Server { pool, http }),
        Err(e) => {
            pool.close().await;
            Err(e)
        }
    }
}

async fn start_http(pool: PgPool, config: &Config) -> Result<HttpServer, ServerError> {
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("migrations completed");

    let router = create_router(
        build_state(pool, config),
        cors_layer(&config.client_origin)?,
    );
    let listener = TcpListener::bind(config.listen_addr()).await?;

    Ok(HttpServer::start(listener, router)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::{Value, json};

    #[test]
    fn test_cors_layer_rejects_invalid_origin() {
        assert!(cors_layer("http://localhost:3000").is_ok());
        assert!(matches!(
            cors_layer("http://local\nhost"),
            Err(ServerError::InvalidOrigin(_))
        ));
    }

    #[tokio::test]
    async fn test_http_server_serves_until_closed() {
        let router = Router::new().fallback(not_found_handler);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let server = HttpServer::start(listener, router).unwrap();
        let url = format!("http://{}/api/nowhere", server.local_addr());

        let client = reqwest::Client::new();
        let response = client.get(&url).send().await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({ "message": "Not Found" }));
        drop(client);

        server.close().await.unwrap();
        assert!(reqwest::Client::new().get(&url).send().await.is_err());
    }
}
