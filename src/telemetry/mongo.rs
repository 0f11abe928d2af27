//! MongoDB-backed [`TelemetrySink`] implementation.
//!
//! Counters live as a single document in the `counters` collection and
//! are updated with atomic `$inc` operations, so concurrent requests
//! never lose increments. The update runs as an upsert: the counter
//! document is created on first write instead of requiring a pre-seeded
//! record. Request metadata is appended to the `metadata` collection,
//! one document per inbound request:
//!
//! ```json
//! { "method": "GET", "destination_service": ["service1"],
//!   "endpoint": "/api/service1", "date": {...} }
//! ```

use async_trait::async_trait;
use mongodb::bson::{doc, DateTime, Document};
use mongodb::{Client, Collection};

use super::{CounterDelta, RequestMetadata, TelemetrySink};
use crate::error::GatewayError;

const COUNTERS_COLLECTION: &str = "counters";
const METADATA_COLLECTION: &str = "metadata";

pub struct MongoSink {
    counters: Collection<Document>,
    metadata: Collection<Document>,
}

impl MongoSink {
    /// Create a sink for the given connection string and database.
    ///
    /// The driver connects lazily, so this only fails on a malformed
    /// connection string. An unreachable store surfaces as per-write
    /// errors, which the proxy core logs and absorbs — telemetry
    /// downtime must not take the gateway down with it.
    pub async fn connect(url: &str, database: &str) -> Result<Self, GatewayError> {
        let client = Client::with_uri_str(url)
            .await
            .map_err(|e| GatewayError::Telemetry {
                source: Box::new(e),
            })?;

        let db = client.database(database);
        Ok(Self {
            counters: db.collection::<Document>(COUNTERS_COLLECTION),
            metadata: db.collection::<Document>(METADATA_COLLECTION),
        })
    }
}

fn to_bson_count(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

#[async_trait]
impl TelemetrySink for MongoSink {
    fn name(&self) -> &'static str {
        "mongodb"
    }

    async fn increment_counters(&self, delta: CounterDelta) -> Result<(), GatewayError> {
        let update = doc! {
            "$inc": {
                "total": to_bson_count(delta.total),
                "successful": to_bson_count(delta.successful),
                "failed": to_bson_count(delta.failed),
            }
        };

        self.counters
            .update_one(doc! { "total": { "$exists": true } }, update)
            .upsert(true)
            .await
            .map_err(|e| GatewayError::Telemetry {
                source: Box::new(e),
            })?;

        Ok(())
    }

    async fn record_metadata(&self, metadata: RequestMetadata) -> Result<(), GatewayError> {
        let document = doc! {
            "method": metadata.method,
            "destination_service": metadata.destination_services,
            "endpoint": metadata.endpoint,
            "date": DateTime::from_system_time(metadata.timestamp),
        };

        self.metadata
            .insert_one(document)
            .await
            .map_err(|e| GatewayError::Telemetry {
                source: Box::new(e),
            })?;

        Ok(())
    }
}
