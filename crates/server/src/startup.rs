use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use axum::Router;
use common::utils::logging::init_logging_from_env;
use configs::{AppConfig, StoreKind};
use dotenvy::dotenv;
use migration::MigratorTrait;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes::{self, ServerState};
use service::{
    diagram::{
        repo::{memory::InMemoryDiagramRepository, seaorm::SeaOrmDiagramRepository},
        DiagramRepository, DiagramService, StaticCatalog,
    },
    runtime,
};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn catalog_dirs(cfg: &AppConfig) -> Vec<PathBuf> {
    cfg.catalog.json_dirs.iter().map(PathBuf::from).collect()
}

/// Select the storage backend from `store.kind`.
pub async fn build_repository(cfg: &AppConfig) -> Result<Arc<dyn DiagramRepository>, StartupError> {
    match cfg.store.kind {
        StoreKind::InMemory => {
            info!(store = "in_memory", "diagram store selected");
            Ok(Arc::new(InMemoryDiagramRepository::new()))
        }
        StoreKind::Table => {
            let db = models::db::connect_with_config(&cfg.database)
                .await
                .map_err(|e| StartupError::Storage(e.to_string()))?;
            if cfg.database.run_migrations {
                migration::Migrator::up(&db, None)
                    .await
                    .map_err(|e| StartupError::Storage(format!("migrations failed: {e}")))?;
                info!("diagram table migrations applied");
            }
            info!(store = "table", "diagram store selected");
            Ok(Arc::new(SeaOrmDiagramRepository::new(db)))
        }
    }
}

/// Wire the storage backend and catalog into handler state.
pub async fn build_state(cfg: &AppConfig) -> Result<ServerState, StartupError> {
    let repo = build_repository(cfg).await?;
    let catalog = Arc::new(StaticCatalog::new(catalog_dirs(cfg)));
    Ok(ServerState { service: Arc::new(DiagramService::new(repo, catalog)) })
}

/// Router for a fully loaded configuration.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    let state = build_state(cfg).await?;
    Ok(routes::build_router(state, build_cors(), &cfg.catalog.static_root))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C; shutdown only on process exit");
        std::future::pending::<()>().await;
    }
    info!(event = "shutdown_signal", "received Ctrl+C, draining connections");
}

/// Serve `app` on an already bound listener until Ctrl+C.
pub async fn serve(listener: TcpListener, app: Router) -> anyhow::Result<()> {
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Public entry: load configuration, build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_from_env();

    let cfg = AppConfig::load_and_validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    runtime::ensure_env(PathBuf::from(&cfg.catalog.static_root), &catalog_dirs(&cfg)).await?;

    let app = build_app(&cfg).await?;

    let listener = TcpListener::bind((cfg.server.host.as_str(), cfg.server.port)).await?;
    let addr = listener.local_addr()?;
    info!(%addr, store = ?cfg.store.kind, "starting archviz server");
    serve(listener, app).await?;
    info!("server stopped");
    Ok(())
}
