/// Server setup and initialization
///
/// Wires together storage, the Projects service client and the HTTP routes.
/// Provides the main application factory function for creating the Axum app.

use crate::{
    api::{create_collaborator_routes, create_project_routes, AppState},
    config::Config,
    projects_service::ProjectsClient,
    roster::{open_pool, RosterStorage},
};
use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the main Axum application with all routes and middleware
///
/// Opens the roster database and builds the Projects service client from
/// configuration before assembling the router.
pub async fn create_app(config: &Config) -> Result<Router> {
    tracing::info!("🏗️ Initializing roster storage");
    let pool = open_pool(&config.database.path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open roster database: {}", e))?;

    let projects = ProjectsClient::from_config(&config.projects)
        .map_err(|e| anyhow::anyhow!("Failed to build projects service client: {}", e))?;
    match &config.projects.base_url {
        Some(url) => tracing::info!("🌐 Projects service notifications enabled: {}", url),
        None => tracing::info!("Projects service notifications disabled"),
    }

    let state = AppState {
        storage: RosterStorage::new(pool),
        projects,
    };

    tracing::info!("✅ Application initialized successfully");

    Ok(create_router(state))
}

/// Build the router over an existing state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check endpoint
        .route("/healthz", get(health_check))
        // Collaborator CRUD
        .merge(create_collaborator_routes())
        // Enrollment and project listings
        .merge(create_project_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Start the HTTP server with the given configuration
pub async fn start_server(config: Config) -> Result<()> {
    // Initialize tracing subscriber for logging (RUST_LOG overrides the default level)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    tracing::info!("Starting roster server...");

    let app = create_app(&config).await?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Liveness probe; always 200
async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
