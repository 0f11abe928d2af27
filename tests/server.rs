//! Integration tests for the HTTP server, health endpoint, and graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use junction::config::model::ServiceDescriptor;
use junction::health::HealthResponse;
use junction::registry::ServiceRegistry;
use junction::server::{self, AppState, Stats};
use junction::telemetry::NullSink;

fn test_services() -> Vec<ServiceDescriptor> {
    vec![
        ServiceDescriptor {
            name: "service1".into(),
            host: "127.0.0.1".into(),
            port: 9091,
            forward_path: "/api/test".into(),
        },
        ServiceDescriptor {
            name: "service2".into(),
            host: "127.0.0.1".into(),
            port: 9092,
            forward_path: "/api/test".into(),
        },
    ]
}

async fn start_test_server() -> (SocketAddr, tokio::sync::oneshot::Sender<()>) {
    let state = Arc::new(AppState {
        registry: ServiceRegistry::new(test_services()),
        http_client: server::build_http_client(),
        telemetry: Arc::new(NullSink),
        forward_timeout: Duration::from_millis(2000),
        start_time: Instant::now(),
        stats: Stats::new(),
    });

    let router = server::build_router(state, 1_048_576);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    (addr, shutdown_tx)
}

#[tokio::test]
async fn health_endpoint_returns_healthy() {
    let (addr, shutdown) = start_test_server().await;

    let url = format!("http://{addr}/health");
    let resp = reqwest::get(&url).await.unwrap();
    assert_eq!(resp.status(), 200);

    let health: HealthResponse = resp.json().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.registry.services, 2);
    assert_eq!(health.registry.names, vec!["service1", "service2"]);
    assert_eq!(health.registry.telemetry_sink, "null");
    assert_eq!(health.stats.requests_forwarded, 0);
    assert_eq!(health.stats.requests_failed, 0);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn unregistered_service_path_returns_404() {
    let (addr, shutdown) = start_test_server().await;

    let url = format!("http://{addr}/api/service9");
    let resp = reqwest::get(&url).await.unwrap();
    assert_eq!(resp.status(), 404);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn health_version_matches_crate() {
    let (addr, shutdown) = start_test_server().await;

    let url = format!("http://{addr}/health");
    let health: HealthResponse = reqwest::get(&url).await.unwrap().json().await.unwrap();
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));

    let _ = shutdown.send(());
}

#[tokio::test]
async fn graceful_shutdown_works() {
    let (addr, shutdown) = start_test_server().await;

    // Verify server is running
    let url = format!("http://{addr}/health");
    assert!(reqwest::get(&url).await.is_ok());

    // Send shutdown
    let _ = shutdown.send(());

    // Give it a moment to shut down
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    // Server should no longer accept connections
    let result = reqwest::get(&url).await;
    assert!(result.is_err());
}
