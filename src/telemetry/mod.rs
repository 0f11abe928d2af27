//! Counter and request-metadata persistence.
//!
//! The proxy core depends only on the [`TelemetrySink`] trait:
//! [`increment_counters`](TelemetrySink::increment_counters) applies a
//! commutative [`CounterDelta`] to a persistent counter record, and
//! [`record_metadata`](TelemetrySink::record_metadata) stores one
//! [`RequestMetadata`] document per inbound request. Both are
//! fire-and-forget from the core's perspective: the caller logs a sink
//! failure and continues, and a sink failure is never visible in the
//! client response.
//!
//! [`mongo::MongoSink`] is the production implementation; [`NullSink`]
//! is used when no telemetry store is configured.

pub mod mongo;

use std::time::SystemTime;

use async_trait::async_trait;

use crate::error::GatewayError;

/// Increment applied to the persistent counter record. Never negative,
/// never read back by the core.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterDelta {
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
}

impl CounterDelta {
    #[must_use]
    pub const fn success() -> Self {
        Self {
            total: 1,
            successful: 1,
            failed: 0,
        }
    }

    #[must_use]
    pub const fn failure() -> Self {
        Self {
            total: 1,
            successful: 0,
            failed: 1,
        }
    }
}

/// One write-once record per inbound request, emitted before any
/// counter increment for that request.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    pub method: String,
    pub destination_services: Vec<String>,
    pub endpoint: String,
    pub timestamp: SystemTime,
}

impl RequestMetadata {
    #[must_use]
    pub fn new(method: &http::Method, destination_services: Vec<String>, endpoint: &str) -> Self {
        Self {
            method: method.to_string(),
            destination_services,
            endpoint: endpoint.to_string(),
            timestamp: SystemTime::now(),
        }
    }
}

// async_trait is required here because TelemetrySink is used as
// Arc<dyn TelemetrySink> and native async fn in traits (Rust 1.75+)
// does not support dyn dispatch.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    fn name(&self) -> &'static str;
    async fn increment_counters(&self, delta: CounterDelta) -> Result<(), GatewayError>;
    async fn record_metadata(&self, metadata: RequestMetadata) -> Result<(), GatewayError>;
}

/// Sink used when no telemetry store is configured. Records nothing.
pub struct NullSink;

#[async_trait]
impl TelemetrySink for NullSink {
    fn name(&self) -> &'static str {
        "null"
    }

    async fn increment_counters(&self, delta: CounterDelta) -> Result<(), GatewayError> {
        tracing::debug!(
            total = delta.total,
            successful = delta.successful,
            failed = delta.failed,
            "telemetry disabled, dropping counter delta"
        );
        Ok(())
    }

    async fn record_metadata(&self, metadata: RequestMetadata) -> Result<(), GatewayError> {
        tracing::debug!(
            endpoint = %metadata.endpoint,
            "telemetry disabled, dropping request metadata"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_constructors() {
        assert_eq!(
            CounterDelta::success(),
            CounterDelta {
                total: 1,
                successful: 1,
                failed: 0
            }
        );
        assert_eq!(
            CounterDelta::failure(),
            CounterDelta {
                total: 1,
                successful: 0,
                failed: 1
            }
        );
    }

    #[test]
    fn metadata_captures_request_shape() {
        let meta = RequestMetadata::new(
            &http::Method::GET,
            vec!["service1".into(), "service2".into()],
            "/api/grouped",
        );
        assert_eq!(meta.method, "GET");
        assert_eq!(meta.destination_services.len(), 2);
        assert_eq!(meta.endpoint, "/api/grouped");
    }
}
