use std::sync::Arc;

use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use watchlist_api::{
    api::{create_router, AppState},
    config::Config,
    db::{create_pool, Cache, InMemoryUserDirectory, PgUserDirectory, UserDirectory},
    services::{StreamingProvider, TmdbProvider},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("watchlist_api=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let cache = Cache::connect(&config).await;

    let users: Arc<dyn UserDirectory> = match config.database_url.as_deref() {
        Some(url) if !url.trim().is_empty() => {
            let pool = create_pool(url).await?;
            tracing::info!("Connected to user database");
            Arc::new(PgUserDirectory::new(pool))
        }
        _ => {
            tracing::warn!("DATABASE_URL not set, using empty in-memory user directory");
            Arc::new(InMemoryUserDirectory::new())
        }
    };

    let provider: Option<Arc<dyn StreamingProvider>> = match TmdbProvider::from_config(&config) {
        Ok(tmdb) => Some(Arc::new(tmdb)),
        Err(e) => {
            tracing::warn!(error = %e, "TMDb client not configured, lookups will return 503");
            None
        }
    };

    let state = AppState::new(
        cache.clone(),
        provider,
        users,
        config.server_region().map(str::to_string),
    );
    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        addr = %addr,
        cache = cache.backend(),
        "Server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
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
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
