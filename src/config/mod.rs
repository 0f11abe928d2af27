//! Configuration loading and validation.
//!
//! The service registry and telemetry settings are loaded exactly once
//! at startup from a config file and are read-only for the process
//! lifetime. [`load_file`] resolves the format from the file extension,
//! parses, and validates; [`parse_config_str`] is the format-specific
//! deserialization shared with the `validate` subcommand.

pub mod model;
pub mod validation;

use std::path::{Path, PathBuf};

use crate::error::GatewayError;
use model::Config;

/// Parse a config string based on file extension.
pub fn parse_config_str(
    ext: &str,
    content: &str,
    path_display: &str,
) -> Result<Config, GatewayError> {
    match ext {
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => serde_yml::from_str(content).map_err(|e| GatewayError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "json")]
        "json" => serde_json::from_str(content).map_err(|e| GatewayError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        other => Err(GatewayError::UnsupportedFormat(other.to_string())),
    }
}

/// Read, parse, and validate a config file.
pub async fn load_file(path: &Path) -> Result<Config, GatewayError> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            GatewayError::ConfigFileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            GatewayError::Io(e)
        }
    })?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let config = parse_config_str(ext, &content, &path.display().to_string())?;

    if let Err(errors) = validation::validate(&config) {
        return Err(GatewayError::ConfigValidation { errors });
    }

    Ok(config)
}

/// Resolve the config path: an explicit `-c` argument, or auto-detect
/// `junction.{yaml,yml,json}` in the current directory.
pub async fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf, GatewayError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let candidates = ["junction.yaml", "junction.yml", "junction.json"];

    for name in &candidates {
        let path = PathBuf::from(name);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::info!(path = %path.display(), "auto-detected config file");
            return Ok(path);
        }
    }

    Err(GatewayError::NoConfigSource {
        hint: "Provide --config <file> or create junction.yaml in the working directory."
            .into(),
    })
}
