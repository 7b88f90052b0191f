//! salu-server: appointment assistant HTTP server binary entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use salu_server::config::Config;
use salu_server::db::{self, ConversationStore, MemoryStore, PgConversationStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = Config::from_env();

    let store: Arc<dyn ConversationStore> = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url).await?;
            let store = PgConversationStore::new(pool);
            store.migrate().await?;
            tracing::info!("Sessions stored in Postgres");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, sessions kept in memory");
            Arc::new(MemoryStore::new())
        }
    };

    if config.api_key.is_some() {
        tracing::info!("API key authentication enabled");
    } else {
        tracing::warn!("API key authentication disabled (no API_KEY env var)");
    }
    match config.idle_timeout {
        Some(idle) => tracing::info!(seconds = idle.as_secs(), "Idle timeout enabled"),
        None => tracing::warn!("Idle timeout disabled"),
    }
    if config.outbound_webhook_url.is_none() {
        tracing::warn!("OUTBOUND_WEBHOOK_URL not set, idle notices are only logged");
    }
    tracing::info!(
        model = %config.inference_model,
        specialties = %config.specialties_url,
        "Upstreams configured"
    );
    tracing::info!("Rate limiting: {} requests/second", config.rate_limit_rps);

    let state = salu_server::build_state(&config, store)?;
    let app = salu_server::build_app(state, &config);

    let addr: SocketAddr = config.bind_address.parse()?;
    tracing::info!("Starting appointment assistant on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
