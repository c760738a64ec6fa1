//! Tests for source module.

use super::*;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tempfile::NamedTempFile;

// ==================== Duration parsing tests ====================

#[test]
fn test_parse_duration_seconds() {
    let d = duration::parse_duration("30s").unwrap();
    assert_eq!(d, Duration::from_secs(30));
}

#[test]
fn test_parse_duration_minutes() {
    let d = duration::parse_duration("5m").unwrap();
    assert_eq!(d, Duration::from_secs(300));
}

#[test]
fn test_parse_duration_milliseconds() {
    let d = duration::parse_duration("100ms").unwrap();
    assert_eq!(d, Duration::from_millis(100));
}

#[test]
fn test_parse_duration_bare_number() {
    let d = duration::parse_duration("2").unwrap();
    assert_eq!(d, Duration::from_secs(2));
}

#[test]
fn test_parse_duration_empty() {
    let d = duration::parse_duration("").unwrap();
    assert_eq!(d, Duration::ZERO);
}

#[test]
fn test_parse_duration_invalid_unit() {
    let result = duration::parse_duration("10x");
    assert!(result.unwrap_err().contains("unknown duration unit"));
}

#[test]
fn test_parse_duration_negative() {
    assert!(duration::parse_duration("-5s").is_err());
}

#[test]
fn test_parse_duration_fractional() {
    let d = duration::parse_duration("1.5s").unwrap();
    assert_eq!(d, Duration::from_millis(1500));
}

// ==================== Env source tests ====================

#[test]
fn test_env_key_mapping() {
    let env = EnvSource::new("CONVOSCOPE_");
    assert_eq!(env.key_for("CONVOSCOPE_SERVER_PORT").unwrap(), "server_port");
    assert_eq!(
        env.key_for("CONVOSCOPE_CREDENTIALS__MAPS_KEY").unwrap(),
        "credentials.maps_key"
    );
    assert_eq!(
        env.key_for("CONVOSCOPE_PROFILES__DEV2__PATH_PREFIX").unwrap(),
        "profiles.dev2.path_prefix"
    );
    assert!(env.key_for("CONVOSCOPE_").is_none());
    assert!(env.key_for("OTHER_SERVER_PORT").is_none());
}

#[test]
fn test_env_prefix_must_not_be_empty() {
    assert!(EnvSource::parse_prefix("").is_err());
    assert!(EnvSource::parse_prefix("   ").is_err());
    assert!(EnvSource::parse_prefix("APP =").is_err());
    assert_eq!(EnvSource::parse_prefix(" APP_ ").unwrap(), "APP_");
}

#[test]
fn test_env_var_for_inverts_key_for() {
    let env = EnvSource::default();
    for key in ["server_port", "credentials.maps_key", "profiles.mit.active"] {
        assert_eq!(env.key_for(&env.var_for(key)).unwrap(), key);
    }
}

#[test]
fn test_env_from_vars_filters_prefix() {
    let env = EnvSource::from_vars(
        "APP_",
        [
            ("APP_USE_AZURE_PROVIDER", "true"),
            ("APP_CREDENTIALS__SEARCH_KEY", "s"),
            ("HOME", "/root"),
        ],
    );
    let pairs = env.fetch().unwrap();

    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs["use_azure_provider"], "true");
    assert_eq!(pairs["credentials.search_key"], "s");
}

#[test]
fn test_env_reads_process_environment() {
    temp_env::with_vars(
        [
            ("CVTEST_SERVER_PORT", Some("8082")),
            ("CVTEST_ENVIRONMENT", Some("dev2")),
        ],
        || {
            let pairs = EnvSource::new("CVTEST_").fetch().unwrap();
            assert_eq!(pairs["server_port"], "8082");
            assert_eq!(pairs["environment"], "dev2");
        },
    );
}

// ==================== File source tests ====================

fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(suffix).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_yaml_flattens_nested_keys() {
    let file = temp_file(
        ".yaml",
        r#"
use_azure_provider: false
server_port: 8080
credentials:
  maps_key: abc
profiles:
  dev:
    server_port: 8081
    active: true
telemetry_spreadsheet_id: ~
"#,
    );
    let pairs = FileSource::new(file.path()).fetch().unwrap();

    assert_eq!(pairs["use_azure_provider"], "false");
    assert_eq!(pairs["server_port"], "8080");
    assert_eq!(pairs["credentials.maps_key"], "abc");
    assert_eq!(pairs["profiles.dev.server_port"], "8081");
    assert_eq!(pairs["profiles.dev.active"], "true");
    assert!(!pairs.contains_key("telemetry_spreadsheet_id"));
}

#[test]
fn test_json_file() {
    let file = temp_file(
        ".json",
        r#"{"server_port": 8083, "profiles": {"mit": {"path_prefix": "mit/"}}}"#,
    );
    let pairs = FileSource::new(file.path()).fetch().unwrap();

    assert_eq!(pairs["server_port"], "8083");
    assert_eq!(pairs["profiles.mit.path_prefix"], "mit/");
}

#[test]
fn test_yaml_sequence_rejected() {
    let file = temp_file(".yaml", "credentials:\n  - a\n  - b\n");
    match FileSource::new(file.path()).fetch() {
        Err(SourceError::Format { key, .. }) => assert_eq!(key, "credentials"),
        other => panic!("expected format error, got {other:?}"),
    }
}

#[test]
fn test_yaml_root_must_be_mapping() {
    let file = temp_file(".yaml", "- just\n- a list\n");
    assert!(matches!(
        FileSource::new(file.path()).fetch(),
        Err(SourceError::Format { .. })
    ));
}

#[test]
fn test_empty_yaml_file() {
    let file = temp_file(".yml", "");
    assert!(FileSource::new(file.path()).fetch().unwrap().is_empty());
}

#[test]
fn test_malformed_yaml_not_transient() {
    let file = temp_file(".yaml", "server_port: [unclosed\n");
    let err = FileSource::new(file.path()).fetch().unwrap_err();
    assert!(matches!(err, SourceError::Yaml(_)));
    assert!(!err.is_transient());
}

#[test]
fn test_missing_file_not_transient() {
    let err = FileSource::new("/nonexistent/config.yaml").fetch().unwrap_err();
    assert!(matches!(err, SourceError::Io(_)));
    assert!(!err.is_transient());
}

#[test]
fn test_file_source_name() {
    let source = FileSource::new("configs/server.yaml");
    assert_eq!(source.name(), "file:configs/server.yaml");
}

// ==================== Layered source tests ====================

#[test]
fn test_layered_later_wins() {
    let base = MemorySource::from_pairs([("server_port", "8080"), ("path_prefix", "")])
        .with_name("defaults");
    let over = MemorySource::from_pairs([("server_port", "9090")]).with_name("overrides");
    let layered = LayeredSource::new().layer(base).layer(over);

    let pairs = layered.fetch().unwrap();
    assert_eq!(pairs["server_port"], "9090");
    assert_eq!(pairs["path_prefix"], "");
    assert_eq!(layered.name(), "defaults+overrides");
    assert_eq!(layered.len(), 2);
}

#[test]
fn test_layered_propagates_errors() {
    let layered = LayeredSource::new()
        .layer(MemorySource::default())
        .layer(FileSource::new("/nonexistent/config.yaml"));
    assert!(layered.fetch().is_err());
}

// ==================== Retry tests ====================

/// Fails with a transient error a fixed number of times, then succeeds.
struct FlakySource {
    failures: u32,
    calls: AtomicU32,
}

impl FlakySource {
    fn new(failures: u32) -> Self {
        Self {
            failures,
            calls: AtomicU32::new(0),
        }
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ConfigSource for FlakySource {
    fn name(&self) -> &str {
        "flaky"
    }

    fn fetch(&self) -> Result<Pairs, SourceError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.failures {
            return Err(SourceError::Unavailable("secret store timed out".into()));
        }
        Ok(Pairs::from([("server_port".to_string(), "8080".to_string())]))
    }
}

fn fast_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        initial_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
        multiplier: 2.0,
    }
}

#[test]
fn test_retry_recovers_from_transient_failures() {
    let source = FlakySource::new(2);
    let pairs = fetch_with_retry(&source, &fast_policy(3)).unwrap();
    assert_eq!(pairs["server_port"], "8080");
    assert_eq!(source.calls(), 3);
}

#[test]
fn test_retry_gives_up_after_max_attempts() {
    let source = FlakySource::new(5);
    let (err, attempts) = fetch_with_retry(&source, &fast_policy(2)).unwrap_err();
    assert!(err.is_transient());
    assert_eq!(attempts, 2);
    assert_eq!(source.calls(), 2);
}

#[test]
fn test_retry_zero_attempts_means_one() {
    let source = FlakySource::new(1);
    let (_, attempts) = fetch_with_retry(&source, &fast_policy(0)).unwrap_err();
    assert_eq!(attempts, 1);
}

#[test]
fn test_retry_skips_permanent_errors() {
    let source = FileSource::new("/nonexistent/config.yaml");
    let (_, attempts) = fetch_with_retry(&source, &fast_policy(5)).unwrap_err();
    assert_eq!(attempts, 1);
}

#[test]
fn test_retry_delay_backoff_capped() {
    let policy = RetryPolicy {
        max_attempts: 10,
        initial_delay: Duration::from_millis(100),
        max_delay: Duration::from_millis(500),
        multiplier: 2.0,
    };
    assert_eq!(policy.delay_after(1), Duration::from_millis(100));
    assert_eq!(policy.delay_after(2), Duration::from_millis(200));
    assert_eq!(policy.delay_after(3), Duration::from_millis(400));
    assert_eq!(policy.delay_after(4), Duration::from_millis(500));
    assert_eq!(policy.delay_after(40), Duration::from_millis(500));
}

#[test]
fn test_default_retry_policy() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.max_attempts, 3);
    assert_eq!(RetryPolicy::no_retry().max_attempts, 1);
}

#[test]
fn test_transient_io_kinds() {
    let transient = SourceError::Io(io::Error::from(io::ErrorKind::TimedOut));
    let permanent = SourceError::Io(io::Error::from(io::ErrorKind::PermissionDenied));
    assert!(transient.is_transient());
    assert!(!permanent.is_transient());
}
