//! `junction run` — start the gateway server.
//!
//! Loads and validates the service registry config, wires up the
//! telemetry sink, and starts the Axum HTTP server with graceful
//! shutdown. The registry is resolved once here; nothing reloads it at
//! runtime.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cli::RunArgs;
use crate::config;
use crate::error::GatewayError;
use crate::logging;
use crate::registry::ServiceRegistry;
use crate::server::{self, AppState, Stats};
use crate::telemetry::{mongo::MongoSink, NullSink, TelemetrySink};

pub async fn execute(args: RunArgs) -> Result<(), GatewayError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    let path = config::resolve_path(args.config.as_deref()).await?;
    let cfg = config::load_file(&path).await?;

    let timeout_ms = forward_timeout_ms(args.timeout, cfg.defaults.timeout);

    let telemetry: Arc<dyn TelemetrySink> = match cfg.telemetry {
        Some(ref t) => {
            tracing::info!(database = %t.database, "using mongodb telemetry sink");
            Arc::new(MongoSink::connect(&t.mongodb_url, &t.database).await?)
        }
        None => {
            tracing::warn!("no telemetry store configured, counters and metadata are dropped");
            Arc::new(NullSink)
        }
    };

    let registry = ServiceRegistry::new(cfg.services);
    let service_count = registry.len();

    let state = Arc::new(AppState {
        registry,
        http_client: server::build_http_client(),
        telemetry,
        forward_timeout: Duration::from_millis(timeout_ms),
        start_time: Instant::now(),
        stats: Stats::new(),
    });

    let router = server::build_router(state, args.max_body);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        services = service_count,
        config = %path.display(),
        "junction started"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(server::shutdown_signal())
        .await?;

    tracing::info!("junction stopped");
    Ok(())
}

/// The config file sets the per-call deadline; an explicit `--timeout`
/// flag (or `REQUEST_TIMEOUT_MS`) takes precedence when given.
const fn forward_timeout_ms(cli_override: Option<u64>, config_timeout: u64) -> u64 {
    match cli_override {
        Some(ms) => ms,
        None => config_timeout,
    }
}
