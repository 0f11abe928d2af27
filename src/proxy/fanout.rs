//! Concurrent fan-out of a single request to every registered service.
//!
//! [`fan_out`] spawns one forward task per registry entry so a slow or
//! unreachable backend never delays collection of the others — each
//! task carries its own deadline. The join loop walks the handles in
//! registry order, which is what guarantees the merged body follows
//! registry order rather than completion order.

use std::time::Duration;

use bytes::{Bytes, BytesMut};

use crate::registry::ServiceRegistry;
use crate::server::HttpClient;
use crate::telemetry::CounterDelta;

use super::forward::{forward, ForwardOutcome, ForwardRequest};

/// Accumulated per-backend outcomes for one broadcast request.
///
/// Invariant: `total == succeeded.len() + failed`.
#[derive(Debug, Default)]
pub struct AggregateResult {
    /// `(service name, body)` pairs in registry order.
    pub succeeded: Vec<(String, Bytes)>,
    pub failed: usize,
    pub total: usize,
}

impl AggregateResult {
    #[must_use]
    pub fn all_failed(&self) -> bool {
        self.failed == self.total
    }

    /// Succeeded bodies concatenated in registry order, no separator.
    /// Bodies are opaque payloads and are not re-encoded.
    #[must_use]
    pub fn merged_body(&self) -> Bytes {
        let mut merged = BytesMut::with_capacity(self.succeeded.iter().map(|(_, b)| b.len()).sum());
        for (_, body) in &self.succeeded {
            merged.extend_from_slice(body);
        }
        merged.freeze()
    }

    /// The single counter increment emitted for the whole broadcast.
    #[must_use]
    pub fn counter_delta(&self) -> CounterDelta {
        CounterDelta {
            total: self.total as u64,
            successful: self.succeeded.len() as u64,
            failed: self.failed as u64,
        }
    }
}

pub async fn fan_out(
    client: &HttpClient,
    registry: &ServiceRegistry,
    request: &ForwardRequest,
    timeout: Duration,
) -> AggregateResult {
    let mut handles = Vec::with_capacity(registry.len());

    for service in registry.all() {
        let client = client.clone();
        let service = service.clone();
        let request = request.clone();
        handles.push(tokio::spawn(async move {
            forward(&client, &service, &request, timeout).await
        }));
    }

    let mut result = AggregateResult {
        succeeded: Vec::with_capacity(registry.len()),
        failed: 0,
        total: registry.len(),
    };

    // Joining in registry order pins the merge order; the tasks
    // themselves still run concurrently.
    for (handle, service) in handles.into_iter().zip(registry.all()) {
        match handle.await {
            Ok(ForwardOutcome::Success { body, .. }) => {
                result.succeeded.push((service.name.clone(), body));
            }
            Ok(ForwardOutcome::Unreachable { service }) => {
                tracing::warn!(service = %service, "{service} is down");
                result.failed += 1;
            }
            Ok(ForwardOutcome::Failed { service, cause }) => {
                tracing::warn!(service = %service, error = %cause, "backend request failed");
                result.failed += 1;
            }
            Err(join_err) => {
                tracing::error!(service = %service.name, error = %join_err, "forward task panicked");
                result.failed += 1;
            }
        }
    }

    debug_assert_eq!(result.total, result.succeeded.len() + result.failed);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with(succeeded: &[(&str, &[u8])], failed: usize) -> AggregateResult {
        AggregateResult {
            succeeded: succeeded
                .iter()
                .map(|(name, body)| ((*name).to_string(), Bytes::copy_from_slice(body)))
                .collect(),
            failed,
            total: succeeded.len() + failed,
        }
    }

    #[test]
    fn merged_body_concatenates_in_order() {
        let result = result_with(
            &[("service1", b"A"), ("service2", b"B"), ("service3", b"C")],
            0,
        );
        assert_eq!(&result.merged_body()[..], b"ABC");
    }

    #[test]
    fn merged_body_skips_failures() {
        let result = result_with(&[("service1", b"a"), ("service3", b"c")], 1);
        assert_eq!(&result.merged_body()[..], b"ac");
        assert!(!result.all_failed());
    }

    #[test]
    fn all_failed_when_no_success() {
        let result = result_with(&[], 3);
        assert!(result.all_failed());
        assert_eq!(&result.merged_body()[..], b"");
    }

    #[test]
    fn counter_delta_partitions_total() {
        let result = result_with(&[("service1", b"a"), ("service3", b"c")], 1);
        let delta = result.counter_delta();
        assert_eq!(delta.total, 3);
        assert_eq!(delta.successful, 2);
        assert_eq!(delta.failed, 1);
        assert_eq!(delta.total, delta.successful + delta.failed);
    }
}
