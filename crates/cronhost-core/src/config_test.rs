use std::collections::HashMap;
use std::env::VarError;
use std::time::Duration;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "CRONHOST_ENV"));
}

#[test]
fn build_app_config_uses_defaults_for_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).expect("defaults should be valid");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.jobs_path, PathBuf::from("./config/jobs.yaml"));
    assert!(cfg.wait_for_jobs_on_shutdown);
    assert_eq!(cfg.shutdown_timeout_secs, 30);
    assert_eq!(cfg.shutdown_timeout(), Some(Duration::from_secs(30)));
}

#[test]
fn build_app_config_applies_overrides() {
    let mut map = HashMap::new();
    map.insert("CRONHOST_ENV", "production");
    map.insert("CRONHOST_BIND_ADDR", "127.0.0.1:8080");
    map.insert("CRONHOST_LOG_LEVEL", "debug");
    map.insert("CRONHOST_JOBS_PATH", "/etc/cronhost/jobs.yaml");
    map.insert("CRONHOST_WAIT_FOR_JOBS", "false");
    map.insert("CRONHOST_SHUTDOWN_TIMEOUT_SECS", "0");

    let cfg = build_app_config(lookup_from_map(&map)).expect("overrides should be valid");
    assert_eq!(cfg.env, Environment::Production);
    assert_eq!(cfg.bind_addr.to_string(), "127.0.0.1:8080");
    assert_eq!(cfg.log_level, "debug");
    assert_eq!(cfg.jobs_path, PathBuf::from("/etc/cronhost/jobs.yaml"));
    assert!(!cfg.wait_for_jobs_on_shutdown);
    assert_eq!(cfg.shutdown_timeout(), None);
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = HashMap::new();
    map.insert("CRONHOST_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CRONHOST_BIND_ADDR"),
        "expected InvalidEnvVar(CRONHOST_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_with_invalid_wait_flag() {
    let mut map = HashMap::new();
    map.insert("CRONHOST_WAIT_FOR_JOBS", "sometimes");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CRONHOST_WAIT_FOR_JOBS"),
        "expected InvalidEnvVar(CRONHOST_WAIT_FOR_JOBS), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_with_invalid_shutdown_timeout() {
    let mut map = HashMap::new();
    map.insert("CRONHOST_SHUTDOWN_TIMEOUT_SECS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CRONHOST_SHUTDOWN_TIMEOUT_SECS"),
        "expected InvalidEnvVar(CRONHOST_SHUTDOWN_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn load_app_config_succeeds_without_dotenv_file() {
    let cfg = load_app_config().expect("no .env and no overrides still loads");
    assert!(!cfg.log_level.is_empty());
}
