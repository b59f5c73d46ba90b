use super::*;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key| map.get(key).cloned()
}

// =============================================================================
// from_lookup
// =============================================================================

#[test]
fn empty_environment_uses_defaults() {
    let config = ServiceConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(config, ServiceConfig::default());
    assert_eq!(config.ingest.max_attempts, 120);
    assert_eq!(config.ingest.slow_max_attempts, 300);
    assert_eq!(config.ingest.poll_interval(), Duration::from_secs(1));
}

#[test]
fn overrides_are_applied() {
    let config = ServiceConfig::from_lookup(lookup_from(&[
        ("CONTENT_API_BASE_URL", "https://content.example.com/api/"),
        ("INGEST_POLL_INTERVAL_MS", "250"),
        ("INGEST_MAX_ATTEMPTS", "5"),
        ("INGEST_AUTO_ANALYZE", "false"),
        ("BOARD_FLUSH_INTERVAL_MS", "50"),
        ("PROJECT_ID", "proj-1"),
    ]))
    .unwrap();
    assert_eq!(config.api_base_url, "https://content.example.com/api");
    assert_eq!(config.ingest.poll_interval_ms, 250);
    assert_eq!(config.ingest.max_attempts, 5);
    assert!(!config.ingest.auto_analyze);
    assert_eq!(config.flush_interval(), Duration::from_millis(50));
    assert_eq!(config.require_project_id().unwrap(), "proj-1");
}

#[test]
fn malformed_number_falls_back_to_default() {
    let config = ServiceConfig::from_lookup(lookup_from(&[("INGEST_MAX_ATTEMPTS", "lots")])).unwrap();
    assert_eq!(config.ingest.max_attempts, DEFAULT_MAX_ATTEMPTS);
}

#[test]
fn bad_base_url_is_rejected() {
    let err = ServiceConfig::from_lookup(lookup_from(&[("CONTENT_API_BASE_URL", "not a url")])).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { key: "CONTENT_API_BASE_URL", .. }));

    let err = ServiceConfig::from_lookup(lookup_from(&[("CONTENT_API_BASE_URL", "ftp://files.example.com")])).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }));
}

#[test]
fn blank_project_id_counts_as_missing() {
    let config = ServiceConfig::from_lookup(lookup_from(&[("PROJECT_ID", "  ")])).unwrap();
    assert_eq!(config.require_project_id(), Err(ConfigError::Missing("PROJECT_ID")));
}

#[test]
fn from_env_reads_process_environment() {
    unsafe { std::env::set_var("INGEST_SLOW_MAX_ATTEMPTS", "42") };
    let config = ServiceConfig::from_env().unwrap();
    assert_eq!(config.ingest.slow_max_attempts, 42);
    unsafe { std::env::remove_var("INGEST_SLOW_MAX_ATTEMPTS") };
}

// =============================================================================
// IngestConfig
// =============================================================================

#[test]
fn youtube_gets_the_slow_budget() {
    let ingest = IngestConfig::default();
    assert_eq!(ingest.max_attempts_for(Platform::Youtube), 300);
    assert_eq!(ingest.max_attempts_for(Platform::Instagram), 120);
    assert_eq!(ingest.max_attempts_for(Platform::Tiktok), 120);
}
