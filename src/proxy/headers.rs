//! Pass-through header handling for the proxy hop.
//!
//! The gateway replays client headers against the backend verbatim,
//! with two deliberate exceptions: hop-by-hop headers describe the
//! inbound connection and are stripped, and `Host` is rewritten to the
//! backend authority so virtual-hosted backends resolve correctly.
//! [`strip_response_hop_by_hop`] does the mirror-image cleanup on the
//! backend's response before it is returned to the caller.

use std::sync::LazyLock;

use axum::http::{HeaderMap, HeaderName, HeaderValue};

use crate::config::model::ServiceDescriptor;

static HOP_BY_HOP: LazyLock<Vec<HeaderName>> = LazyLock::new(|| {
    [
        "connection",
        "keep-alive",
        "transfer-encoding",
        "te",
        "trailer",
        "upgrade",
        "proxy-authorization",
        "proxy-authenticate",
    ]
    .iter()
    .filter_map(|name| name.parse::<HeaderName>().ok())
    .collect()
});

/// Strip hop-by-hop headers and `content-length` from a backend response.
///
/// The body has already been fully collected by the forwarder, so
/// `transfer-encoding` and `content-length` from the backend are no longer
/// accurate. Axum will set the correct `content-length` based on the actual
/// body bytes.
pub fn strip_response_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP.iter() {
        headers.remove(name);
    }
    headers.remove(hyper::header::CONTENT_LENGTH);
}

/// Build the header map replayed against a backend: the original client
/// headers minus hop-by-hop entries, with `Host` rewritten.
pub fn build_forwarded_headers(original: &HeaderMap, service: &ServiceDescriptor) -> HeaderMap {
    let mut headers = original.clone();

    for header_name in HOP_BY_HOP.iter() {
        headers.remove(header_name);
    }

    if let Ok(val) = HeaderValue::from_str(&service.authority()) {
        headers.insert("host", val);
    }

    headers
}
