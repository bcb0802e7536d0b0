//! TaskPay server entry point.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use taskpay::adapters::auth::HeaderAuthVerifier;
use taskpay::adapters::gateway::HttpPaymentGateway;
use taskpay::adapters::http::{app_router, AppState};
use taskpay::adapters::postgres::{
    PostgresPointLedger, PostgresTaskRepository, PostgresWithdrawalRepository,
};
use taskpay::config::AppConfig;
use taskpay::domain::withdrawal::SignatureVerifier;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("database migrations applied");
    }

    let signature_verifier = Arc::new(SignatureVerifier::new(&config.gateway.public_key));
    if !signature_verifier.has_key() {
        tracing::warn!(
            "gateway public key did not parse; every notification will be rejected until fixed"
        );
    }

    let state = AppState {
        tasks: Arc::new(PostgresTaskRepository::new(pool.clone())),
        withdrawals: Arc::new(PostgresWithdrawalRepository::new(pool.clone())),
        ledger: Arc::new(PostgresPointLedger::new(pool.clone())),
        gateway: Arc::new(HttpPaymentGateway::new(config.gateway.clone())),
        auth_verifier: Arc::new(HeaderAuthVerifier),
        signature_verifier,
        stale_after_minutes: config.gateway.stale_after_minutes,
    };

    let app = app_router(state).layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    tracing::info!(%addr, environment = ?config.server.environment, "taskpay listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
