//! Loading configuration from TOML files and `VONAGE_*` variables

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use serial_test::serial;
use tempfile::TempDir;
use vonage::{Error, FallbackPolicy, VonageConfig};

const PKCS8: &str = include_str!("../../auth-core/tests/fixtures/rsa_pkcs8.pem");

fn clear_env() {
    let keys: Vec<String> = std::env::vars()
        .map(|(key, _)| key)
        .filter(|key| key.starts_with("VONAGE_"))
        .collect();
    for key in keys {
        unsafe { std::env::remove_var(key) };
    }
}

fn set_env(key: &str, value: &str) {
    unsafe { std::env::set_var(key, value) };
}

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("vonage.toml");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
#[serial]
fn test_load_from_file() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        &format!(
            r#"
application_id = "app-file"
private_key = '''
{}'''
phone_number = "+815012345678"

[video]
session_ttl_secs = 600
fallback = "fail_fast"

[http]
timeout_secs = 5
"#,
            PKCS8
        ),
    );

    let config = VonageConfig::load(Some(path.as_path())).unwrap();
    assert_eq!(config.application_id.as_deref(), Some("app-file"));
    assert_eq!(config.phone_number.as_deref(), Some("+815012345678"));
    assert_eq!(config.video.session_ttl_secs, 600);
    assert_eq!(config.video.fallback, FallbackPolicy::FailFast);
    assert_eq!(config.http.timeout_secs, 5);
    assert_eq!(config.http.rest_base_url, "https://api.nexmo.com");

    let credentials = config.credentials().unwrap();
    assert!(credentials.has_application());
    assert_eq!(credentials.phone_number(), Some("+815012345678"));
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
application_id = "app-file"
phone_number = "815000000000"

[video]
session_ttl_secs = 600
"#,
    );

    set_env("VONAGE_PHONE_NUMBER", "+819099999999");
    set_env("VONAGE_VIDEO__SESSION_TTL_SECS", "120");
    set_env("VONAGE_VIDEO__FALLBACK", "fail_fast");
    set_env("VONAGE_HTTP__REST_BASE_URL", "http://127.0.0.1:9000");

    let config = VonageConfig::load(Some(path.as_path()));
    clear_env();
    let config = config.unwrap();

    assert_eq!(config.application_id.as_deref(), Some("app-file"));
    assert_eq!(config.phone_number.as_deref(), Some("+819099999999"));
    assert_eq!(config.video.session_ttl_secs, 120);
    assert_eq!(config.video.fallback, FallbackPolicy::FailFast);
    assert_eq!(config.http.rest_base_url, "http://127.0.0.1:9000");
}

#[test]
#[serial]
fn test_private_key_path_from_environment() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let key_path = dir.path().join("private.key");
    fs::write(&key_path, PKCS8).unwrap();

    set_env("VONAGE_APPLICATION_ID", "app-env");
    set_env("VONAGE_PRIVATE_KEY_PATH", key_path.to_str().unwrap());

    let config = VonageConfig::from_env();
    clear_env();
    let config = config.unwrap();

    assert_eq!(config.private_key_path.as_deref(), Some(key_path.as_path()));
    let credentials = config.credentials().unwrap();
    assert!(credentials.has_application());
    assert_eq!(credentials.application_id(), Some("app-env"));
}

#[test]
#[serial]
fn test_nothing_configured_uses_defaults() {
    clear_env();
    let config = VonageConfig::from_env().unwrap();
    assert_eq!(config.application_id, None);
    assert_eq!(config.video.session_ttl_secs, 86_400);
    assert_eq!(config.http.timeout_secs, 30);
}

#[test]
#[serial]
fn test_missing_file_is_config_error() {
    clear_env();
    let err = VonageConfig::load(Some(Path::new("/nonexistent/vonage.toml"))).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
#[serial]
fn test_malformed_value_is_config_error() {
    clear_env();
    set_env("VONAGE_HTTP__TIMEOUT_SECS", "soon");
    let result = VonageConfig::from_env();
    clear_env();
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_zero_ttl_is_config_error() {
    clear_env();
    set_env("VONAGE_VIDEO__SESSION_TTL_SECS", "0");
    let result = VonageConfig::from_env();
    clear_env();
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_unreadable_key_file_is_auth_error() {
    clear_env();
    let config = VonageConfig {
        application_id: Some("app".to_string()),
        private_key_path: Some("/nonexistent/private.key".into()),
        ..Default::default()
    };
    assert!(matches!(config.credentials(), Err(Error::Auth(_))));
}
