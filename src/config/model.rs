//! Serde data structures for the Junction configuration file.
//!
//! Contains [`Config`] (the root), [`ServiceDescriptor`], [`Defaults`],
//! and [`TelemetryConfig`]. All types derive `Serialize` and
//! `Deserialize` with `deny_unknown_fields` for strict parsing.

use serde::{Deserialize, Serialize};

const fn default_timeout() -> u64 {
    5000
}

fn default_forward_path() -> String {
    "/api/test".to_string()
}

fn default_database() -> String {
    "api".to_string()
}

fn is_default_timeout(v: &u64) -> bool {
    *v == default_timeout()
}

fn is_default_forward_path(v: &str) -> bool {
    v == "/api/test"
}

fn is_default_database(v: &str) -> bool {
    v == "api"
}

fn is_default_defaults(v: &Defaults) -> bool {
    v.timeout == default_timeout()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default, skip_serializing_if = "is_default_defaults")]
    pub defaults: Defaults,

    pub services: Vec<ServiceDescriptor>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telemetry: Option<TelemetryConfig>,
}

/// One backend service: a logical name bound to a fixed network address
/// and forwarding path. Loaded once at startup, immutable thereafter.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceDescriptor {
    pub name: String,

    pub host: String,

    pub port: u16,

    #[serde(
        default = "default_forward_path",
        skip_serializing_if = "is_default_forward_path"
    )]
    pub forward_path: String,
}

impl ServiceDescriptor {
    /// The authority the backend is reached at, e.g. `127.0.0.1:9091`.
    #[must_use]
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    /// Per-backend-call deadline in milliseconds.
    #[serde(
        default = "default_timeout",
        skip_serializing_if = "is_default_timeout"
    )]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    /// MongoDB connection string, e.g. `mongodb://127.0.0.1:27017`.
    pub mongodb_url: String,

    #[serde(
        default = "default_database",
        skip_serializing_if = "is_default_database"
    )]
    pub database: String,
}
