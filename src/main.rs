use std::sync::Arc;

use anyhow::Context;

mod config;
mod database;
mod dtos;
mod errors;
mod extractors;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;
mod state;

use config::AppConfig;
use database::{connection::get_db_client, AbstractDatabase};
use services::{clock::SystemClock, email_service::SmtpMailer};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("loading configuration")?;
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    let (client, db) = get_db_client(&config)
        .await
        .context("connecting to MongoDB")?;
    db.ensure_indexes().await.context("creating indexes")?;

    let mailer = SmtpMailer::new(&config).context("configuring SMTP transport")?;
    tracing::info!("✅ SMTP transport configured for {}", config.smtp_host);

    let addr = config.bind_address();
    let app_state = AppState::new(config, Arc::new(db), Arc::new(mailer), Arc::new(SystemClock));
    let app = routes::build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    tracing::info!("🚀 Server starting on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    client.shutdown().await;
    tracing::info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
