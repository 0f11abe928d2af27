//! `junction validate` — check a configuration file for errors.
//!
//! Parses and validates the config, then renders one report in the
//! requested format. Exit status reflects validity regardless of
//! format.

use std::path::Path;

use crate::cli::{ValidateArgs, ValidateFormat};
use crate::config::model::Config;
use crate::config::parse_config_str;
use crate::config::validation;
use crate::error::{GatewayError, ValidationError};

pub fn execute(args: &ValidateArgs) -> Result<(), GatewayError> {
    let path = &args.config;

    if !path.exists() {
        return Err(GatewayError::ConfigFileNotFound { path: path.clone() });
    }

    let content = std::fs::read_to_string(path)?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let config = parse_config_str(ext, &content, &path.display().to_string())?;

    let outcome = validation::validate(&config);

    match args.format {
        ValidateFormat::Text => render_text(path, &config, &outcome),
        ValidateFormat::Json => println!("{}", json_report(&config, &outcome)),
    }

    match outcome {
        Ok(()) => Ok(()),
        Err(errors) => Err(GatewayError::ConfigValidation { errors }),
    }
}

fn render_text(path: &Path, config: &Config, outcome: &Result<(), Vec<ValidationError>>) {
    match outcome {
        Ok(()) => println!(
            "\u{2713} {}",
            validation::format_validation_report(&path.display().to_string(), config)
        ),
        Err(errors) => {
            eprintln!("\u{2717} {} has {} errors\n", path.display(), errors.len());
            for error in errors {
                eprintln!("{error}");
            }
        }
    }
}

fn json_report(config: &Config, outcome: &Result<(), Vec<ValidationError>>) -> serde_json::Value {
    match outcome {
        Ok(()) => serde_json::json!({
            "valid": true,
            "services": config.services.len(),
            "telemetry": config.telemetry.is_some(),
        }),
        Err(errors) => serde_json::json!({
            "valid": false,
            "errors": errors
                .iter()
                .map(|e| {
                    serde_json::json!({
                        "service": e.service,
                        "field": e.field,
                        "message": e.message,
                        "suggestion": e.suggestion,
                    })
                })
                .collect::<Vec<_>>(),
        }),
    }
}
