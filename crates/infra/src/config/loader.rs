//! Configuration loader
//!
//! Loads [`CrmClientConfig`] from an optional file plus environment overrides.
//!
//! ## Loading Strategy
//! 1. Probe the standard locations for a config file (JSON or TOML)
//! 2. Start from that file, or from the built-in defaults when none exists
//! 3. Apply environment variable overrides on top
//!
//! ## Environment Variables
//! - `FIELDSYNC_HTTP_TIMEOUT_SECS`: Per-request timeout in seconds
//! - `FIELDSYNC_HTTP_MAX_ATTEMPTS`: Total attempts per request (1 = no retry)
//! - `FIELDSYNC_HCP_API_BASE_URL`: Housecall Pro API base URL
//! - `FIELDSYNC_ST_API_BASE_URL`: ServiceTitan API base URL
//! - `FIELDSYNC_ST_AUTH_URL`: ServiceTitan token endpoint
//! - `FIELDSYNC_ST_TOKEN_MARGIN_SECS`: Seconds subtracted from token lifetime
//! - `FIELDSYNC_LOG_LEVEL`: Default log filter when `RUST_LOG` is unset
//! - `FIELDSYNC_LOG_JSON`: Emit JSON logs (true/false)
//!
//! Unset variables keep the current value; malformed ones are errors.
//!
//! ## File Locations
//! The loader probes `fieldsync.json` then `fieldsync.toml` in the current
//! directory, its parent and its grandparent. Generic names such as
//! `config.toml` belong to the host application and are never read.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use fieldsync_domain::{CrmClientConfig, FieldSyncError, Result};
use once_cell::sync::Lazy;

const FILE_STEM: &str = "fieldsync";
const FILE_EXTENSIONS: [&str; 2] = ["json", "toml"];

static SHARED: Lazy<CrmClientConfig> = Lazy::new(|| {
    load().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "failed to load CRM configuration, using defaults");
        CrmClientConfig::default()
    })
});

/// Process-wide configuration, loaded on first use.
///
/// A malformed file or variable is logged once and replaced by the defaults.
pub fn shared() -> &'static CrmClientConfig {
    &SHARED
}

/// Load configuration: file (if one is found) overlaid with environment
/// variables.
///
/// # Errors
/// Returns `FieldSyncError::Config` if the probed file is malformed or an
/// environment variable has an invalid value.
pub fn load() -> Result<CrmClientConfig> {
    let base = match probe_config_paths() {
        Some(path) => load_from_file(Some(path))?,
        None => {
            tracing::debug!("No config file found, using defaults");
            CrmClientConfig::default()
        }
    };

    apply_env(base)
}

/// Load configuration from environment variables over the defaults.
///
/// # Errors
/// Returns `FieldSyncError::Config` if a variable has an invalid value.
pub fn load_from_env() -> Result<CrmClientConfig> {
    apply_env(CrmClientConfig::default())
}

/// Apply `FIELDSYNC_*` overrides to `config`.
///
/// # Errors
/// Returns `FieldSyncError::Config` if a variable has an invalid value.
pub fn apply_env(mut config: CrmClientConfig) -> Result<CrmClientConfig> {
    if let Some(timeout) = env_parse::<u64>("FIELDSYNC_HTTP_TIMEOUT_SECS")? {
        config.http.timeout_secs = timeout;
    }
    if let Some(attempts) = env_parse::<usize>("FIELDSYNC_HTTP_MAX_ATTEMPTS")? {
        if attempts == 0 {
            return Err(FieldSyncError::Config(
                "FIELDSYNC_HTTP_MAX_ATTEMPTS must be at least 1".to_string(),
            ));
        }
        config.http.max_attempts = attempts;
    }
    if let Some(url) = env_url("FIELDSYNC_HCP_API_BASE_URL")? {
        config.housecall_pro.api_base_url = url;
    }
    if let Some(url) = env_url("FIELDSYNC_ST_API_BASE_URL")? {
        config.service_titan.api_base_url = url;
    }
    if let Some(url) = env_url("FIELDSYNC_ST_AUTH_URL")? {
        config.service_titan.auth_url = url;
    }
    if let Some(margin) = env_parse::<u64>("FIELDSYNC_ST_TOKEN_MARGIN_SECS")? {
        config.service_titan.token_expiry_margin_secs = margin;
    }
    if let Some(level) = env_var("FIELDSYNC_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = env_bool("FIELDSYNC_LOG_JSON")? {
        config.logging.json = json;
    }

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
/// Sections and fields missing from the file keep their defaults.
///
/// # Errors
/// Returns `FieldSyncError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<CrmClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(FieldSyncError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            FieldSyncError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| FieldSyncError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<CrmClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| FieldSyncError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| FieldSyncError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(FieldSyncError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe the standard locations for a configuration file.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    probe_from(&cwd)
}

fn probe_from(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .take(3)
        .flat_map(|dir| {
            FILE_EXTENSIONS.iter().map(move |ext| dir.join(format!("{FILE_STEM}.{ext}")))
        })
        .find(|path| path.is_file())
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_var(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| FieldSyncError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}

fn env_url(key: &str) -> Result<Option<String>> {
    env_var(key)
        .map(|raw| {
            url::Url::parse(&raw)
                .map(|_| raw.trim_end_matches('/').to_string())
                .map_err(|e| FieldSyncError::Config(format!("Invalid URL for {key}: {e}")))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str) -> Result<Option<bool>> {
    env_var(key)
        .map(|raw| match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(FieldSyncError::Config(format!("Invalid boolean for {key}: {other}"))),
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::{NamedTempFile, TempDir};

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: [&str; 8] = [
        "FIELDSYNC_HTTP_TIMEOUT_SECS",
        "FIELDSYNC_HTTP_MAX_ATTEMPTS",
        "FIELDSYNC_HCP_API_BASE_URL",
        "FIELDSYNC_ST_API_BASE_URL",
        "FIELDSYNC_ST_AUTH_URL",
        "FIELDSYNC_ST_TOKEN_MARGIN_SECS",
        "FIELDSYNC_LOG_LEVEL",
        "FIELDSYNC_LOG_JSON",
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        for raw in ["1", "true", "YES", "on"] {
            std::env::set_var("TEST_FIELDSYNC_BOOL", raw);
            assert_eq!(env_bool("TEST_FIELDSYNC_BOOL").unwrap(), Some(true), "{raw}");
        }
        for raw in ["0", "false", "no", "OFF"] {
            std::env::set_var("TEST_FIELDSYNC_BOOL", raw);
            assert_eq!(env_bool("TEST_FIELDSYNC_BOOL").unwrap(), Some(false), "{raw}");
        }

        std::env::set_var("TEST_FIELDSYNC_BOOL", "maybe");
        assert!(env_bool("TEST_FIELDSYNC_BOOL").is_err());

        std::env::remove_var("TEST_FIELDSYNC_BOOL");
        assert_eq!(env_bool("TEST_FIELDSYNC_BOOL").unwrap(), None);
    }

    #[test]
    fn test_load_from_env_without_vars_uses_defaults() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let config = load_from_env().expect("defaults load");
        assert_eq!(config, CrmClientConfig::default());
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("FIELDSYNC_HTTP_TIMEOUT_SECS", "5");
        std::env::set_var("FIELDSYNC_HTTP_MAX_ATTEMPTS", "2");
        std::env::set_var("FIELDSYNC_HCP_API_BASE_URL", "http://127.0.0.1:9000/v1/");
        std::env::set_var("FIELDSYNC_ST_API_BASE_URL", "http://127.0.0.1:9001");
        std::env::set_var("FIELDSYNC_ST_AUTH_URL", "http://127.0.0.1:9002/connect/token");
        std::env::set_var("FIELDSYNC_ST_TOKEN_MARGIN_SECS", "120");
        std::env::set_var("FIELDSYNC_LOG_LEVEL", "debug");
        std::env::set_var("FIELDSYNC_LOG_JSON", "true");

        let result = load_from_env();
        clear_env();

        let config = result.expect("config from env");
        assert_eq!(config.http.timeout_secs, 5);
        assert_eq!(config.http.max_attempts, 2);
        assert_eq!(config.housecall_pro.api_base_url, "http://127.0.0.1:9000/v1");
        assert_eq!(config.service_titan.api_base_url, "http://127.0.0.1:9001");
        assert_eq!(config.service_titan.auth_url, "http://127.0.0.1:9002/connect/token");
        assert_eq!(config.service_titan.token_expiry_margin_secs, 120);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("FIELDSYNC_HTTP_TIMEOUT_SECS", "not-a-number");
        let result = load_from_env();
        clear_env();

        assert!(matches!(result, Err(FieldSyncError::Config(_))), "Should be a Config error");
    }

    #[test]
    fn test_load_from_env_rejects_zero_attempts_and_bad_urls() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("FIELDSYNC_HTTP_MAX_ATTEMPTS", "0");
        assert!(matches!(load_from_env(), Err(FieldSyncError::Config(_))));
        clear_env();

        std::env::set_var("FIELDSYNC_ST_AUTH_URL", "not a url");
        assert!(matches!(load_from_env(), Err(FieldSyncError::Config(_))));
        clear_env();
    }

    #[test]
    fn test_apply_env_overrides_file_values() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let mut base = CrmClientConfig::default();
        base.http.timeout_secs = 90;
        base.logging.level = "warn".into();

        std::env::set_var("FIELDSYNC_LOG_LEVEL", "trace");
        let result = apply_env(base);
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.http.timeout_secs, 90);
        assert_eq!(config.logging.level, "trace");
    }

    #[test]
    fn test_load_from_file_json() {
        let json_content = r#"{
            "http": { "timeout_secs": 12 },
            "housecall_pro": { "api_base_url": "http://localhost:8080/hcp" }
        }"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(json_content.as_bytes()).unwrap();
        let path = temp_file.path().with_extension("json");
        std::fs::copy(temp_file.path(), &path).unwrap();

        let result = load_from_file(Some(path.clone()));
        std::fs::remove_file(&path).ok();

        let config = result.expect("Should load config from JSON file");
        assert_eq!(config.http.timeout_secs, 12);
        assert_eq!(config.http.max_attempts, 1);
        assert_eq!(config.housecall_pro.api_base_url, "http://localhost:8080/hcp");
        assert_eq!(config.service_titan, Default::default());
    }

    #[test]
    fn test_load_from_file_toml() {
        let toml_content = r#"
[service_titan]
auth_url = "http://localhost:8080/token"
token_expiry_margin_secs = 30

[logging]
json = true
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        let path = temp_file.path().with_extension("toml");
        std::fs::copy(temp_file.path(), &path).unwrap();

        let result = load_from_file(Some(path.clone()));
        std::fs::remove_file(&path).ok();

        let config = result.expect("Should load config from TOML file");
        assert_eq!(config.service_titan.auth_url, "http://localhost:8080/token");
        assert_eq!(config.service_titan.token_expiry_margin_secs, 30);
        assert!(config.logging.json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/fieldsync.json")));
        assert!(matches!(result, Err(FieldSyncError::Config(_))), "Should be a Config error");
    }

    #[test]
    fn test_load_from_file_invalid_json() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(br#"{ "http": "#).unwrap();
        let path = temp_file.path().with_extension("json");
        std::fs::copy(temp_file.path(), &path).unwrap();

        let result = load_from_file(Some(path.clone()));
        std::fs::remove_file(&path).ok();

        assert!(result.is_err(), "Should fail with invalid JSON");
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("some content", &PathBuf::from("fieldsync.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }

    #[test]
    fn test_probe_only_reads_fieldsync_files_and_walks_up() {
        let root = TempDir::new().unwrap();
        let nested = root.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(probe_from(&nested), None);

        std::fs::write(nested.join("config.toml"), "[http]\nmax_attempts = \"x\"\n").unwrap();
        std::fs::write(nested.join("config.json"), "{").unwrap();
        assert_eq!(probe_from(&nested), None);

        std::fs::write(root.path().join("a").join("fieldsync.toml"), "").unwrap();
        assert_eq!(probe_from(&nested), Some(root.path().join("a").join("fieldsync.toml")));

        std::fs::write(root.path().join("a").join("fieldsync.json"), "{}").unwrap();
        assert_eq!(probe_from(&nested), Some(root.path().join("a").join("fieldsync.json")));

        std::fs::write(nested.join("fieldsync.toml"), "").unwrap();
        assert_eq!(probe_from(&nested), Some(nested.join("fieldsync.toml")));
    }
}
