use std::collections::HashMap;

use csv_insight::config::{
    DEFAULT_HOST, DEFAULT_MAX_UPLOAD_MB, DEFAULT_PORT, HOST_VAR, MAX_UPLOAD_VAR, PORT_VAR,
    ServerConfig,
};

fn resolve(args: &[&str], env: &[(&str, &str)]) -> ServerConfig {
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    let env: HashMap<String, String> = env
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    ServerConfig::resolve(&args, |key| env.get(key).cloned())
}

#[test]
fn defaults_apply_without_args_or_env() {
    let config = resolve(&[], &[]);
    assert_eq!(config.host, DEFAULT_HOST);
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_MB * 1024 * 1024);
    assert_eq!(config.bind_address(), "127.0.0.1:3000");
}

#[test]
fn environment_overrides_defaults() {
    let config = resolve(
        &[],
        &[(HOST_VAR, "0.0.0.0"), (PORT_VAR, "8080"), (MAX_UPLOAD_VAR, "5")],
    );
    assert_eq!(config.bind_address(), "0.0.0.0:8080");
    assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
}

#[test]
fn positional_args_override_environment() {
    let config = resolve(&["localhost", "9000"], &[(HOST_VAR, "0.0.0.0"), (PORT_VAR, "8080")]);
    assert_eq!(config.bind_address(), "localhost:9000");
}

#[test]
fn invalid_values_fall_back_to_defaults() {
    let config = resolve(&[], &[(PORT_VAR, "not-a-port"), (MAX_UPLOAD_VAR, "0")]);
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_MB * 1024 * 1024);
}
