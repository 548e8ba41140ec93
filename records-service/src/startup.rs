use crate::config::{RecordsConfig, StoreBackend};
use crate::handlers;
use crate::services::{InMemoryRecordStore, MongoRecordStore, RecordStore};
use axum::{
    body::Body,
    error_handling::HandleErrorLayer,
    http::Request,
    middleware::from_fn,
    routing::{get, post},
    BoxError, Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    cors::{allow_headers_layer, cors_layer},
    metrics::metrics_middleware,
    tracing::{make_request_span, request_id_middleware},
};
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::{timeout::TimeoutLayer, ServiceBuilder};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: RecordsConfig,
    pub store: Arc<dyn RecordStore>,
}

/// Builds the configured store once; handlers share it for the process lifetime.
pub async fn build_store(config: &RecordsConfig) -> Result<Arc<dyn RecordStore>, AppError> {
    let store: Arc<dyn RecordStore> = match config.store.backend {
        StoreBackend::Mongodb => Arc::new(MongoRecordStore::connect(&config.mongodb).await?),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory record store; records are lost on restart");
            Arc::new(InMemoryRecordStore::new())
        }
    };
    Ok(store)
}

pub fn build_router(state: AppState) -> Result<Router, AppError> {
    let cors = cors_layer(&state.config.cors.allowed_origin)?;
    let request_timeout = state.config.http.request_timeout();

    let app = Router::new()
        .route("/", get(handlers::root))
        .route("/get-data", get(handlers::get_data))
        .route("/post-data", post(handlers::post_data))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            make_request_span(request)
        }))
        .layer(from_fn(request_id_middleware))
        // Outermost so every response, including timeouts, carries the CORS headers
        .layer(allow_headers_layer())
        .layer(cors)
        .with_state(state);

    Ok(app)
}

async fn not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("Route not found"))
}

/// A handler still pending at the deadline is blocked on the store.
async fn handle_middleware_error(err: BoxError) -> AppError {
    if err.is::<tower::timeout::error::Elapsed>() {
        AppError::GatewayTimeout
    } else {
        AppError::InternalError(anyhow::anyhow!("Unhandled middleware error: {}", err))
    }
}

type Server = Box<dyn Future<Output = std::io::Result<()>> + Send + Unpin>;

pub struct Application {
    port: u16,
    server: Server,
    state: AppState,
}

impl Application {
    pub async fn build(config: RecordsConfig) -> Result<Self, AppError> {
        Self::build_with_shutdown(config, std::future::pending()).await
    }

    /// Builds the application around an already constructed store.
    pub async fn with_store(
        config: RecordsConfig,
        store: Arc<dyn RecordStore>,
    ) -> Result<Self, AppError> {
        Self::serve(config, store, std::future::pending()).await
    }

    /// Like [`Application::build`], stopping gracefully once `shutdown` resolves.
    pub async fn build_with_shutdown<F>(config: RecordsConfig, shutdown: F) -> Result<Self, AppError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let store = build_store(&config).await.map_err(|e| {
            tracing::error!("Failed to initialize record store: {}", e);
            e
        })?;
        Self::serve(config, store, shutdown).await
    }

    async fn serve<F>(
        config: RecordsConfig,
        store: Arc<dyn RecordStore>,
        shutdown: F,
    ) -> Result<Self, AppError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let state = AppState {
            config: config.clone(),
            store,
        };
        let app = build_router(state.clone())?;

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            state,
        })
    }

    pub fn store(&self) -> Arc<dyn RecordStore> {
        self.state.store.clone()
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
