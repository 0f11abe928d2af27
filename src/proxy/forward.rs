//! One synchronous forward to a named backend.
//!
//! [`forward`] replays a [`ForwardRequest`] snapshot against a single
//! [`ServiceDescriptor`](crate::config::model::ServiceDescriptor) and
//! classifies the result as a [`ForwardOutcome`]. The forwarder is a
//! pure I/O adapter: it never touches telemetry or in-process stats,
//! and it never interprets backend status codes — a well-formed HTTP
//! response of any status, 5xx included, is a `Success`.

use std::time::{Duration, Instant};

use axum::http::{HeaderMap, Method, StatusCode, Uri};
use bytes::Bytes;
use http_body_util::BodyExt;
use http_body_util::Full;

use crate::config::model::ServiceDescriptor;
use crate::server::HttpClient;

use super::headers::build_forwarded_headers;

/// Normalized snapshot of an inbound request, sufficient to replay it
/// against any backend. Immutable once constructed; cloning is cheap
/// (`Bytes` is refcounted), which is what the fan-out path relies on.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub method: Method,
    pub headers: HeaderMap,
    pub query: Option<String>,
    pub body: Bytes,
}

impl ForwardRequest {
    /// Snapshot the inbound request. The correlation id is folded into
    /// the header map so it rides along to every backend.
    #[must_use]
    pub fn snapshot(
        method: Method,
        uri: &Uri,
        mut headers: HeaderMap,
        body: Bytes,
        correlation_id: &str,
    ) -> Self {
        if let Ok(val) = correlation_id.parse() {
            headers.insert("x-correlation-id", val);
        }
        Self {
            method,
            headers,
            query: uri.query().map(String::from),
            body,
        }
    }
}

/// Result of one forward attempt, attributable to exactly one service.
#[derive(Debug, Clone)]
pub enum ForwardOutcome {
    /// The backend produced a well-formed HTTP response (any status).
    Success {
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
    },
    /// Transport-level connection failure: refused, unreachable, DNS.
    Unreachable { service: String },
    /// Any other transport failure: timeout, malformed response, body
    /// read error.
    Failed { service: String, cause: String },
}

/// Backend URL for a descriptor: fixed scheme, authority, and forward
/// path, with the inbound query string replayed verbatim.
#[must_use]
pub fn backend_url(service: &ServiceDescriptor, query: Option<&str>) -> String {
    match query {
        Some(q) if !q.is_empty() => format!(
            "http://{}{}?{q}",
            service.authority(),
            service.forward_path
        ),
        _ => format!("http://{}{}", service.authority(), service.forward_path),
    }
}

#[allow(clippy::cast_possible_truncation)]
pub async fn forward(
    client: &HttpClient,
    service: &ServiceDescriptor,
    request: &ForwardRequest,
    timeout: Duration,
) -> ForwardOutcome {
    let url = backend_url(service, request.query.as_deref());
    let forwarded_headers = build_forwarded_headers(&request.headers, service);

    let mut builder = hyper::Request::builder()
        .method(request.method.clone())
        .uri(url.clone());

    for (key, value) in &forwarded_headers {
        builder = builder.header(key, value);
    }

    let req = match builder.body(Full::new(request.body.clone())) {
        Ok(r) => r,
        Err(e) => {
            return ForwardOutcome::Failed {
                service: service.name.clone(),
                cause: e.to_string(),
            }
        }
    };

    let start = Instant::now();

    // The deadline covers the whole exchange: connect, response head,
    // and body read. A backend that stalls mid-body is a timeout too.
    let exchange = async {
        match client.request(req).await {
            Ok(response) => {
                let status = response.status();
                let headers = response.headers().clone();
                match response.into_body().collect().await {
                    Ok(collected) => ForwardOutcome::Success {
                        status,
                        headers,
                        body: collected.to_bytes(),
                    },
                    Err(e) => ForwardOutcome::Failed {
                        service: service.name.clone(),
                        cause: format!("body read error: {e}"),
                    },
                }
            }
            Err(e) if e.is_connect() => {
                tracing::warn!(service = %service.name, url = %url, "backend unreachable");
                ForwardOutcome::Unreachable {
                    service: service.name.clone(),
                }
            }
            Err(e) => ForwardOutcome::Failed {
                service: service.name.clone(),
                cause: e.to_string(),
            },
        }
    };

    match tokio::time::timeout(timeout, exchange).await {
        Ok(outcome) => {
            if let ForwardOutcome::Success { status, .. } = &outcome {
                tracing::debug!(
                    service = %service.name,
                    status = status.as_u16(),
                    latency_ms = start.elapsed().as_millis() as u64,
                    "backend responded"
                );
            }
            outcome
        }
        Err(_) => ForwardOutcome::Failed {
            service: service.name.clone(),
            cause: format!("request timed out after {}ms", timeout.as_millis()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> ServiceDescriptor {
        ServiceDescriptor {
            name: "service1".into(),
            host: "127.0.0.1".into(),
            port: 9091,
            forward_path: "/api/test".into(),
        }
    }

    #[test]
    fn url_without_query() {
        assert_eq!(
            backend_url(&service(), None),
            "http://127.0.0.1:9091/api/test"
        );
    }

    #[test]
    fn url_replays_query_verbatim() {
        assert_eq!(
            backend_url(&service(), Some("a=1&b=two")),
            "http://127.0.0.1:9091/api/test?a=1&b=two"
        );
    }

    #[test]
    fn url_ignores_empty_query() {
        assert_eq!(
            backend_url(&service(), Some("")),
            "http://127.0.0.1:9091/api/test"
        );
    }

    #[test]
    fn snapshot_injects_correlation_id() {
        let uri: Uri = "/api/service1?x=1".parse().unwrap();
        let req = ForwardRequest::snapshot(
            Method::POST,
            &uri,
            HeaderMap::new(),
            Bytes::from_static(b"payload"),
            "cid-42",
        );
        assert_eq!(req.headers.get("x-correlation-id").unwrap(), "cid-42");
        assert_eq!(req.query.as_deref(), Some("x=1"));
        assert_eq!(req.method, Method::POST);
        assert_eq!(&req.body[..], b"payload");
    }
}
