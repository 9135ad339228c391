use std::sync::Arc;

use cinematch_api::{
    config::Config,
    db::{create_pool, PgTitleStore},
    routes::{create_router, AppState},
    services::embedding::HttpEmbedder,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cinematch_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(config.pg_connect_options(), config.db_max_connections).await?;
    tracing::info!(
        host = %config.db_host,
        database = %config.db_name,
        table = %config.table,
        "Connected to title database"
    );

    let embedder = HttpEmbedder::new(&config.embedding_url, &config.model_path);
    tracing::info!(
        url = %config.embedding_url,
        model = %config.model_path,
        "Embedding client configured"
    );

    let state = AppState::new(
        Arc::new(PgTitleStore::new(pool)),
        Arc::new(embedder),
        config.table.as_str(),
    );
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %config.bind_addr(), "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
