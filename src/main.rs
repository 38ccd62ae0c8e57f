use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use saas_api_rust::app::{self, AppState};
use saas_api_rust::auth::PasswordHasher;
use saas_api_rust::config::AppConfig;
use saas_api_rust::database::seed::seed_demo_data;
use saas_api_rust::database::{DatabaseManager, MemoryDirectory, PgDirectory};
use saas_api_rust::notify::LogNotifier;

#[derive(Parser)]
#[command(name = "saas-api-rust")]
#[command(about = "Multi-tenant authentication API server")]
#[command(version)]
struct Args {
    #[arg(long, help = "Serve from an in-memory directory seeded with demo data")]
    memory: bool,

    #[arg(long, help = "Seed demo tenants and accounts into the database on startup")]
    seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = AppConfig::from_env().context("invalid configuration")?;
    info!("Starting SaaS API in {:?} mode", config.environment);

    let port = config.api.port;
    let hasher = PasswordHasher::new(config.security.bcrypt_cost);
    let notifier = Arc::new(LogNotifier);

    let (state, worker) = if args.memory {
        info!("Using in-memory directory");
        let directory = MemoryDirectory::new();
        seed_demo_data(&directory, hasher).await?;
        AppState::build(config, directory, notifier)?
    } else {
        let pool = DatabaseManager::connect(&config.database)
            .await
            .context("connecting to database")?;
        DatabaseManager::ensure_schema(&pool).await?;

        let directory = PgDirectory::new(pool);
        if args.seed {
            seed_demo_data(&directory, hasher).await?;
        }
        AppState::build(config, directory, notifier)?
    };

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("SaaS API listening on http://{}", bind_addr);

    axum::serve(listener, app::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // Router (and with it the last queue sender) is gone; let the worker drain
    let _ = worker.await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
