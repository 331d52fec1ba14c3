use http_history_app::{
    config::Config, history::SharedStore, router, AppState, HttpProxyService, RequestExecutor,
    SqliteHistoryStore,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "http_history_app=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!(
        port = config.port,
        database = %config.database_path,
        timeout_ms = config.request_timeout_ms,
        "Starting request history backend"
    );

    let store: SharedStore = if config.database_path == ":memory:" {
        Arc::new(SqliteHistoryStore::open_in_memory()?)
    } else {
        Arc::new(SqliteHistoryStore::open(&config.database_path)?)
    };
    tracing::info!("History store ready");

    let proxy = HttpProxyService::new(config.request_timeout())?;
    let executor = RequestExecutor::new(Arc::new(proxy), store.clone());

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(AppState::new(executor, store))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
