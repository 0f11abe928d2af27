//! Configuration validation with detailed error reporting.
//!
//! The [`validate`] function checks a parsed [`Config`] for structural
//! errors such as an empty service list, duplicate or reserved names,
//! bad hosts and ports, and malformed telemetry URLs. Returns a list of
//! [`ValidationError`] values with per-field suggestions.
//!
//! Every routed service name is checked here, at startup — an unknown
//! name can never reach the per-request path because routes are
//! registered from the validated registry.

use url::Url;

use super::model::Config;
use crate::error::ValidationError;

/// Route names that collide with the gateway's own endpoints.
pub const RESERVED_NAMES: &[&str] = &["grouped", "health"];

/// Validate a single service name. Returns `Ok(())` or a human-readable error.
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("name cannot be empty".into());
    }
    if RESERVED_NAMES.contains(&name) {
        return Err(format!("'{name}' is reserved for a gateway endpoint"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(format!(
            "'{name}' contains characters that cannot appear in a path segment"
        ));
    }
    Ok(())
}

/// Validate a forwarding path. Returns `Ok(())` or a human-readable error.
pub fn validate_forward_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("forward_path cannot be empty".into());
    }
    if !path.starts_with('/') {
        return Err(format!(
            "forward_path must start with '/' (did you mean '/{path}'?)"
        ));
    }
    Ok(())
}

/// Validate a MongoDB connection string. Returns `Ok(())` or a human-readable error.
pub fn validate_mongodb_url(url: &str) -> Result<(), String> {
    match Url::parse(url) {
        Ok(parsed) => {
            let scheme = parsed.scheme();
            if scheme != "mongodb" && scheme != "mongodb+srv" {
                Err(format!(
                    "unsupported scheme '{scheme}' (expected mongodb or mongodb+srv)"
                ))
            } else {
                Ok(())
            }
        }
        Err(_) => Err(format!("'{url}' is not a valid connection string")),
    }
}

pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.services.is_empty() {
        errors.push(ValidationError {
            service: "(root)".into(),
            field: "services".into(),
            message: "at least one service must be defined".into(),
            suggestion: None,
        });
        return Err(errors);
    }

    if config.defaults.timeout == 0 {
        errors.push(ValidationError {
            service: "(root)".into(),
            field: "defaults.timeout".into(),
            message: "timeout must be greater than zero".into(),
            suggestion: Some("the default is 5000 milliseconds".into()),
        });
    }

    let mut seen_names = std::collections::HashSet::new();

    for (i, service) in config.services.iter().enumerate() {
        let service_id = if service.name.is_empty() {
            format!("services[{i}]")
        } else {
            service.name.clone()
        };

        if let Err(message) = validate_name(&service.name) {
            errors.push(ValidationError {
                service: service_id.clone(),
                field: "name".into(),
                message,
                suggestion: None,
            });
        }

        if !seen_names.insert(service.name.clone()) {
            errors.push(ValidationError {
                service: service_id.clone(),
                field: "name".into(),
                message: format!("duplicate service name '{}'", service.name),
                suggestion: Some("service names must be unique across the registry".into()),
            });
        }

        if service.host.is_empty() {
            errors.push(ValidationError {
                service: service_id.clone(),
                field: "host".into(),
                message: "host cannot be empty".into(),
                suggestion: None,
            });
        }

        if service.port == 0 {
            errors.push(ValidationError {
                service: service_id.clone(),
                field: "port".into(),
                message: "port cannot be zero".into(),
                suggestion: None,
            });
        }

        if let Err(message) = validate_forward_path(&service.forward_path) {
            errors.push(ValidationError {
                service: service_id,
                field: "forward_path".into(),
                message,
                suggestion: None,
            });
        }
    }

    if let Some(ref telemetry) = config.telemetry {
        if let Err(message) = validate_mongodb_url(&telemetry.mongodb_url) {
            errors.push(ValidationError {
                service: "(root)".into(),
                field: "telemetry.mongodb_url".into(),
                message,
                suggestion: None,
            });
        }
        if telemetry.database.is_empty() {
            errors.push(ValidationError {
                service: "(root)".into(),
                field: "telemetry.database".into(),
                message: "database cannot be empty".into(),
                suggestion: None,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Human-readable one-line summary for `junction validate` output.
#[must_use]
pub fn format_validation_report(path: &str, config: &Config) -> String {
    let telemetry = if config.telemetry.is_some() {
        "mongodb telemetry"
    } else {
        "no telemetry"
    };
    format!(
        "{path} is valid: {} services, {telemetry}",
        config.services.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::{Defaults, ServiceDescriptor, TelemetryConfig};

    fn service(name: &str, port: u16) -> ServiceDescriptor {
        ServiceDescriptor {
            name: name.into(),
            host: "127.0.0.1".into(),
            port,
            forward_path: "/api/test".into(),
        }
    }

    fn config(services: Vec<ServiceDescriptor>) -> Config {
        Config {
            defaults: Defaults::default(),
            services,
            telemetry: None,
        }
    }

    #[test]
    fn valid_config_passes() {
        let cfg = config(vec![service("service1", 9091), service("service2", 9092)]);
        assert!(validate(&cfg).is_ok());
    }

    #[test]
    fn empty_services_rejected() {
        let cfg = config(vec![]);
        let errors = validate(&cfg).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "services");
    }

    #[test]
    fn duplicate_names_rejected() {
        let cfg = config(vec![service("service1", 9091), service("service1", 9092)]);
        let errors = validate(&cfg).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "name"));
    }

    #[test]
    fn reserved_name_rejected() {
        let cfg = config(vec![service("grouped", 9091)]);
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn zero_port_rejected() {
        let cfg = config(vec![service("service1", 0)]);
        let errors = validate(&cfg).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "port"));
    }

    #[test]
    fn forward_path_must_start_with_slash() {
        let mut svc = service("service1", 9091);
        svc.forward_path = "api/test".into();
        let errors = validate(&config(vec![svc])).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "forward_path"));
    }

    #[test]
    fn bad_telemetry_scheme_rejected() {
        let mut cfg = config(vec![service("service1", 9091)]);
        cfg.telemetry = Some(TelemetryConfig {
            mongodb_url: "http://127.0.0.1:27017".into(),
            database: "api".into(),
        });
        let errors = validate(&cfg).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "telemetry.mongodb_url"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let mut cfg = config(vec![service("service1", 9091)]);
        cfg.defaults.timeout = 0;
        assert!(validate(&cfg).is_err());
    }
}
