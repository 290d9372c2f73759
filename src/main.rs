use tracing_subscriber::EnvFilter;

use expense_tracker::config::Config;
use expense_tracker::server::run_server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        addr = %config.listen_addr(),
        origin = %config.client_origin,
        "configuration loaded"
    );

    let server = run_server(&config, &config.database_url).await?;
    tracing::info!("Your app is listening on http://{}", server.local_addr());
    tracing::info!("API docs: http://{}/api/docs", server.local_addr());

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown requested");

    server.close().await?;
    Ok(())
}
