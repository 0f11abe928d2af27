//! Integration tests for config loading across file formats.

use junction::config::model::Config;
use junction::config::parse_config_str;
use junction::config::validation::validate;

fn load_example(name: &str) -> String {
    let path = format!("example/{name}");
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {path}: {e}"))
}

#[test]
fn yaml_example_loads_and_validates() {
    let content = load_example("junction.yaml");
    let config = parse_config_str("yaml", &content, "junction.yaml").unwrap();
    validate(&config).unwrap();
    assert_eq!(config.services.len(), 3);
    assert!(config.telemetry.is_some());
}

#[cfg(feature = "json")]
#[test]
fn json_example_loads_and_validates() {
    let content = load_example("junction.json");
    let config = parse_config_str("json", &content, "junction.json").unwrap();
    validate(&config).unwrap();
    assert_eq!(config.services.len(), 3);
}

#[cfg(feature = "json")]
#[test]
fn formats_produce_equivalent_configs() {
    let yaml_config =
        parse_config_str("yaml", &load_example("junction.yaml"), "yaml").unwrap();
    let json_config =
        parse_config_str("json", &load_example("junction.json"), "json").unwrap();

    assert_eq!(yaml_config.services.len(), json_config.services.len());
    for (y, j) in yaml_config.services.iter().zip(json_config.services.iter()) {
        assert_eq!(y.name, j.name);
        assert_eq!(y.authority(), j.authority());
    }
}

#[test]
fn unsupported_format_returns_error() {
    let result = parse_config_str("xml", "{}", "test.xml");
    assert!(result.is_err());
}

#[cfg(feature = "json")]
#[test]
fn invalid_config_fails_validation() {
    let empty = r#"{"services": []}"#;
    let config: Config = serde_json::from_str(empty).unwrap();
    assert!(validate(&config).is_err());
}

#[cfg(feature = "json")]
#[test]
fn forward_path_defaults_to_api_test() {
    let json = r#"{
        "services": [
            {"name": "service1", "host": "127.0.0.1", "port": 9091}
        ]
    }"#;
    let config: Config = serde_json::from_str(json).unwrap();
    assert_eq!(config.services[0].forward_path, "/api/test");
    assert_eq!(config.defaults.timeout, 5000);
}

#[cfg(feature = "json")]
#[test]
fn unknown_fields_are_rejected() {
    let json = r#"{
        "services": [
            {"name": "service1", "host": "127.0.0.1", "port": 9091, "weight": 3}
        ]
    }"#;
    assert!(serde_json::from_str::<Config>(json).is_err());
}
