//! Axum server setup, shared application state, and graceful shutdown.
//!
//! Contains [`AppState`] (the `Arc`-shared state holding the registry,
//! HTTP client, telemetry sink, stats, and uptime), [`build_router`]
//! for constructing the Axum router with one route per registered
//! service, [`build_http_client`] for the connection-pooled hyper
//! client, and [`shutdown_signal`] for SIGTERM / Ctrl+C handling.
//!
//! Routes are fixed at construction time from the registry, so an
//! unknown service name is a startup configuration error rather than a
//! per-request condition.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, Uri};
use axum::routing::{any, get};
use axum::Router;
use http_body_util::Full;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::health::health_handler;
use crate::proxy;
use crate::registry::ServiceRegistry;
use crate::telemetry::TelemetrySink;

#[derive(Debug)]
pub struct Stats {
    pub forwarded: AtomicU64,
    pub failed: AtomicU64,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Stats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            forwarded: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }
}

// Backends are reached over plain HTTP at fixed host:port addresses;
// TLS termination is out of scope.
pub type HttpClient = Client<HttpConnector, Full<Bytes>>;

pub struct AppState {
    pub registry: ServiceRegistry,
    pub http_client: HttpClient,
    pub telemetry: Arc<dyn TelemetrySink>,
    pub forward_timeout: Duration,
    pub start_time: Instant,
    pub stats: Stats,
}

#[must_use]
pub fn build_http_client() -> HttpClient {
    Client::builder(TokioExecutor::new())
        .pool_idle_timeout(Duration::from_secs(30))
        .build(HttpConnector::new())
}

pub fn build_router(state: Arc<AppState>, max_body: usize) -> Router {
    let mut router = Router::new()
        .route("/health", get(health_handler))
        .route("/api/grouped", any(proxy::route_grouped));

    // One fixed route per registered service; validation guarantees the
    // names are unique and never collide with /api/grouped.
    for service in state.registry.all() {
        let name = service.name.clone();
        router = router.route(
            &format!("/api/{}", service.name),
            any(
                move |state: State<Arc<AppState>>,
                      method: Method,
                      uri: Uri,
                      headers: HeaderMap,
                      body: Bytes| {
                    proxy::route_single(state, name.clone(), method, uri, headers, body)
                },
            ),
        );
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(max_body)),
        )
        .with_state(state)
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}
