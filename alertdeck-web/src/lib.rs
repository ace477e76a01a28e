// Alertdeck Web Backend Library
// HTTP adapter exposing the alert query, statistics, and detail engines.

pub mod config;
pub mod database;
pub mod error_handling;
pub mod handlers;
pub mod routes;

// Re-export commonly used types
pub use config::WebConfig;
pub use database::Database;
pub use error_handling::{ApiError, ApiResult, ErrorResponse};

use std::sync::Arc;

use alertdeck_core::{
    AlertDetailLookup, AlertQueryEngine, AlertStatsEngine, AlertStore, QueryConfig, SqliteStore,
};

// Main application state
#[derive(Clone)]
pub struct AppState {
    pub query: AlertQueryEngine,
    pub stats: AlertStatsEngine,
    pub detail: AlertDetailLookup,
    pub config: WebConfig,
}

impl AppState {
    /// Wire the engines to an arbitrary storage collaborator. Used directly
    /// by tests with the in-memory store.
    pub fn from_store(store: Arc<dyn AlertStore>, config: WebConfig) -> Self {
        Self {
            query: AlertQueryEngine::new(Arc::clone(&store), QueryConfig::default()),
            stats: AlertStatsEngine::new(Arc::clone(&store)),
            detail: AlertDetailLookup::new(store),
            config,
        }
    }

    /// Production wiring: sqlite-backed store from the configured database.
    pub async fn new(config: WebConfig) -> anyhow::Result<Self> {
        let db = Database::new(&config.database_url).await?;
        let store = SqliteStore::new(db.pool().clone());
        store.ensure_schema().await?;
        Ok(Self::from_store(Arc::new(store), config))
    }
}

/// Build the application router. Split out from `start_server` so tests can
/// drive it without binding a socket.
pub fn create_app(state: AppState) -> axum::Router {
    use axum::routing::get;
    use tower::ServiceBuilder;
    use tower_http::{cors::CorsLayer, trace::TraceLayer};

    axum::Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", routes::api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Start the web server with the given port.
pub async fn start_server(port: u16) -> anyhow::Result<()> {
    use std::net::SocketAddr;
    use tokio::net::TcpListener;

    // Load .env file if it exists
    dotenv::dotenv().ok();

    // Initialize tracing (only if not already initialized)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let mut config = WebConfig::load()?;
    config.port = port;

    tracing::info!("Starting alertdeck web server on port {}", port);

    let state = AppState::new(config).await?;
    let app = create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
