//! Junction is an API gateway for a fixed set of backend services.
//!
//! It receives incoming HTTP requests on `/api/<service>` endpoints,
//! forwards each to the named backend, and exposes `/api/grouped` which
//! fans the request out to every registered backend and merges the
//! responses. Per-request telemetry (counters and request metadata) is
//! written to a persistence layer through the
//! [`TelemetrySink`](telemetry::TelemetrySink) trait.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, validate, health).
//! - [`config`] -- Configuration loading and validation.
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`health`] -- `GET /health` endpoint handler returning runtime diagnostics.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`proxy`] -- Core forwarding: single-service routing, outcome
//!   classification, and concurrent fan-out aggregation.
//! - [`registry`] -- Static service registry resolved once at startup.
//! - [`server`] -- Axum server setup, shared application state, HTTP client,
//!   and graceful shutdown.
//! - [`telemetry`] -- Counter and metadata sinks (MongoDB-backed or null).
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `yaml` | YAML config file support _(enabled by default)_ |
//! | `json` | JSON config file support |

// Binary crate — public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod proxy;
pub mod registry;
pub mod server;
pub mod telemetry;
