use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use configuration::{AppSettings, Config, ServerSettings};
use credentials::CredentialManager;
use database::{CatalogStore, DbRepository};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
// Note: Tracing is initialized by the binary; this crate only emits events.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod health;

use handlers::{animes, episodes, users};
use health::LivenessReporter;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CatalogStore>,
    pub credentials: CredentialManager,
    pub liveness: LivenessReporter,
    pub app: AppSettings,
}

/// Only the configured frontend may call the API, with credentials.
fn cors_layer(server: &ServerSettings) -> anyhow::Result<CorsLayer> {
    let origin = HeaderValue::from_str(&server.frontend_url)?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}

/// Builds the full router with its middleware stack.
pub fn build_router(state: Arc<AppState>, server: &ServerSettings) -> anyhow::Result<Router> {
    let cors = cors_layer(server)?;

    // --- DEFINE THE APPLICATION ROUTES ---
    let app = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/users", get(users::list_users).post(users::create_user))
        .route(
            "/api/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/api/animes", get(animes::list_animes).post(animes::create_anime))
        .route(
            "/api/animes/:id",
            get(animes::get_anime)
                .put(animes::update_anime)
                .delete(animes::delete_anime),
        )
        .route(
            "/api/episodes/anime/:anime_id",
            get(episodes::episodes_for_anime),
        )
        .fallback(handlers::route_not_found)
        .with_state(state)
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(server.body_limit_bytes));

    Ok(app)
}

/// The main function to configure and run the web server.
///
/// `started_at` is the process start time reported by the health endpoint.
/// An unreachable database is logged and tolerated; the server still starts.
pub async fn run_server(config: Config, started_at: DateTime<Utc>) -> anyhow::Result<()> {
    let db_pool = database::connect(&config.database)?;
    let store: Arc<dyn CatalogStore> = Arc::new(DbRepository::new(
        db_pool.clone(),
        config.database.query_timeout(),
    ));
    let liveness = LivenessReporter::new(started_at, store.clone());

    if health::check_database_at_boot(&liveness).await && config.database.run_migrations {
        database::run_migrations(&db_pool).await?;
        tracing::info!("Database migrations applied.");
    }

    let credentials = CredentialManager::new(config.security.password_cost)?;
    let app_state = Arc::new(AppState {
        store,
        credentials,
        liveness,
        app: config.app.clone(),
    });
    let app = build_router(app_state, &config.server)?;

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        environment = %config.app.environment,
        frontend = %config.server.frontend_url,
        "Web server started. Health check: http://{}/api/health",
        addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Web server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for the shutdown signal.");
        std::future::pending::<()>().await;
    }
}
