//! Core request routing and fan-out handlers.
//!
//! [`route_single`] backs the per-service `/api/<name>` endpoints: it
//! snapshots the inbound request, records metadata, delegates to the
//! forwarder ([`forward`]), and shapes the outer response from the
//! outcome. [`route_grouped`] backs `/api/grouped` and delegates to the
//! fan-out engine ([`fanout`]). Header pass-through rules live in
//! [`headers`].
//!
//! Telemetry failures are absorbed here: a sink error is logged and the
//! in-flight client response proceeds untouched.

pub mod fanout;
pub mod forward;
pub mod headers;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use crate::server::AppState;
use crate::telemetry::{CounterDelta, RequestMetadata, TelemetrySink};

use forward::{ForwardOutcome, ForwardRequest};

fn correlation_id(headers: &HeaderMap) -> String {
    headers
        .get("x-correlation-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), String::from)
}

async fn record_metadata(sink: &dyn TelemetrySink, metadata: RequestMetadata) {
    if let Err(e) = sink.record_metadata(metadata).await {
        tracing::warn!(sink = sink.name(), error = %e, "metadata write failed");
    }
}

async fn increment_counters(sink: &dyn TelemetrySink, delta: CounterDelta) {
    if let Err(e) = sink.increment_counters(delta).await {
        tracing::warn!(sink = sink.name(), error = %e, "counter write failed");
    }
}

/// Handler behind every `/api/<name>` route. `service_name` is bound at
/// router-build time from the registry, so resolution cannot fail for a
/// request that reached this handler.
pub async fn route_single(
    State(state): State<Arc<AppState>>,
    service_name: String,
    method: Method,
    uri: Uri,
    req_headers: HeaderMap,
    body: Bytes,
) -> Response {
    let correlation_id = correlation_id(&req_headers);

    let Some(service) = state.registry.resolve(&service_name) else {
        tracing::error!(service = %service_name, "route registered for unknown service");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    tracing::info!(
        correlation_id = %correlation_id,
        method = %method,
        service = %service_name,
        backend = %service.authority(),
        "request received"
    );

    let endpoint = uri.path().to_string();
    let request = ForwardRequest::snapshot(method, &uri, req_headers, body, &correlation_id);

    // Metadata is recorded before the forward, and exactly once, even
    // if the backend call fails.
    record_metadata(
        state.telemetry.as_ref(),
        RequestMetadata::new(&request.method, vec![service_name.clone()], &endpoint),
    )
    .await;

    let outcome = forward::forward(
        &state.http_client,
        service,
        &request,
        state.forward_timeout,
    )
    .await;

    match outcome {
        ForwardOutcome::Success {
            status,
            mut headers,
            body,
        } => {
            state.stats.forwarded.fetch_add(1, Ordering::Relaxed);
            increment_counters(state.telemetry.as_ref(), CounterDelta::success()).await;

            // Backend status and body pass through verbatim, 4xx/5xx included.
            headers::strip_response_hop_by_hop(&mut headers);
            // `insert`, not append: a backend echoing x-correlation-id
            // must not leave the client with two copies.
            if let Ok(val) = HeaderValue::from_str(&correlation_id) {
                headers.insert("x-correlation-id", val);
            }
            let mut builder = Response::builder().status(status);
            for (key, value) in &headers {
                builder = builder.header(key, value);
            }
            builder
                .body(axum::body::Body::from(body))
                .unwrap_or_else(|e| {
                    tracing::error!(
                        correlation_id = %correlation_id,
                        error = %e,
                        "failed to build response"
                    );
                    StatusCode::BAD_GATEWAY.into_response()
                })
        }
        ForwardOutcome::Unreachable { service } => {
            state.stats.failed.fetch_add(1, Ordering::Relaxed);
            increment_counters(state.telemetry.as_ref(), CounterDelta::failure()).await;
            (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("{service} is down"),
            )
                .into_response()
        }
        ForwardOutcome::Failed { service, cause } => {
            state.stats.failed.fetch_add(1, Ordering::Relaxed);
            increment_counters(state.telemetry.as_ref(), CounterDelta::failure()).await;
            tracing::error!(
                correlation_id = %correlation_id,
                service = %service,
                error = %cause,
                "backend request failed"
            );
            (StatusCode::BAD_GATEWAY, format!("{service} request failed")).into_response()
        }
    }
}

/// Handler for `/api/grouped`: broadcast to every registered service
/// and merge the bodies that arrived.
pub async fn route_grouped(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    req_headers: HeaderMap,
    body: Bytes,
) -> Response {
    let correlation_id = correlation_id(&req_headers);

    tracing::info!(
        correlation_id = %correlation_id,
        method = %method,
        services = state.registry.len(),
        "broadcast request received"
    );

    let endpoint = uri.path().to_string();
    let request = ForwardRequest::snapshot(method, &uri, req_headers, body, &correlation_id);

    record_metadata(
        state.telemetry.as_ref(),
        RequestMetadata::new(&request.method, state.registry.names(), &endpoint),
    )
    .await;

    let result = fanout::fan_out(
        &state.http_client,
        &state.registry,
        &request,
        state.forward_timeout,
    )
    .await;

    increment_counters(state.telemetry.as_ref(), result.counter_delta()).await;

    if result.all_failed() {
        state.stats.failed.fetch_add(1, Ordering::Relaxed);
        return (StatusCode::SERVICE_UNAVAILABLE, "All services are down").into_response();
    }

    state.stats.forwarded.fetch_add(1, Ordering::Relaxed);

    // A partial success is reported as a plain 200 with whatever bodies
    // arrived; callers cannot tell "all" from "some" by status alone.
    let mut response = (StatusCode::OK, result.merged_body()).into_response();
    if let Ok(val) = HeaderValue::from_str(&correlation_id) {
        response.headers_mut().insert("x-correlation-id", val);
    }
    response
}
