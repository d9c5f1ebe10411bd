mod config;
mod registry;
mod routes;
mod services;
mod state;

use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("server failed: {0}")]
    Serve(#[source] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    // Load .env before the filter so RUST_LOG can come from it.
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match dotenv {
        Ok(path) => tracing::info!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "ignoring unreadable .env"),
    }

    let config = config::ServerConfig::from_env()?;
    let addr = config.socket_addr();
    tracing::info!(origins = ?config.allowed_origins, peer_buffer = config.peer_buffer, "config loaded");

    let app = routes::app(state::AppState::new(config));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })?;

    tracing::info!(%addr, "whiteboard relay listening");
    axum::serve(listener, app).await.map_err(StartupError::Serve)
}
