use crate::config::{HeroConfig, StoreBackend};
use crate::handlers;
use crate::services::{HeroStore, InMemoryStore, MongoDb};
use axum::{middleware::from_fn, routing::get, Router};
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn HeroStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn HeroStore>) -> Self {
        Self { store }
    }
}

pub fn build_router(state: AppState) -> Router {
    let hero_routes = Router::new()
        .route(
            "/heroes",
            get(handlers::list_heroes).post(handlers::create_hero),
        )
        .route(
            "/heroes/",
            get(handlers::list_heroes).post(handlers::create_hero),
        )
        .route(
            "/heroes/:hero_id",
            get(handlers::get_hero)
                .patch(handlers::update_hero)
                .delete(handlers::delete_hero),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .merge(hero_routes)
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Open the configured store. The returned handle is shared by every request
/// and must be closed with [`HeroStore::close`] on shutdown.
pub async fn connect_store(config: &HeroConfig) -> Result<Arc<dyn HeroStore>, AppError> {
    match config.store.backend {
        StoreBackend::Mongodb => {
            let db = MongoDb::connect(
                &config.mongodb.uri,
                &config.mongodb.database,
                &config.mongodb.collection,
            )
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to MongoDB: {}", e);
                e
            })?;
            Ok(Arc::new(db))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory hero store; data is lost on restart");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
    state: AppState,
}

impl Application {
    pub async fn build(config: HeroConfig) -> Result<Self, AppError> {
        let store = connect_store(&config).await?;
        let state = AppState::new(store);
        let router = build_router(state.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        Ok(Self {
            port,
            listener,
            router,
            state,
        })
    }

    pub fn store(&self) -> Arc<dyn HeroStore> {
        self.state.store.clone()
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until SIGINT/SIGTERM, then close the store.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.run_until(shutdown_signal()).await
    }

    /// Serve until `signal` resolves, then close the store.
    pub async fn run_until<F>(self, signal: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let result = axum::serve(self.listener, self.router)
            .with_graceful_shutdown(signal)
            .await;

        self.state.store.close().await;
        tracing::info!("Server stopped");

        result
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
