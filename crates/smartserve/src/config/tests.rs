use super::*;
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();
    AppConfig::from_lookup(|name| vars.get(name).cloned())
}

fn development(extra: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
    let mut pairs = vec![("SECRET_KEY", "dev-secret"), ("PRODUCTION", "False")];
    pairs.extend_from_slice(extra);
    load(&pairs)
}

fn production(extra: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
    let mut pairs = vec![("SECRET_KEY", "prod-secret"), ("PRODUCTION", "True")];
    pairs.extend_from_slice(extra);
    load(&pairs)
}

#[test]
fn production_is_the_default_mode() {
    let config = load(&[("SECRET_KEY", "s3cret")]).expect("config loads");
    assert_eq!(config.environment, DeploymentMode::Production);
    assert!(!config.debug);
    assert_eq!(config.allowed_hosts, vec!["smartserve".to_string()]);
    assert_eq!(
        config.allowed_origins,
        vec!["https://smartserve.com".to_string()]
    );
    assert_eq!(config.telemetry.log_level, LogLevel::Warning);
    assert_eq!(config.pagination_size, 50);
    assert!((config.password_similarity - 0.627).abs() < f64::EPSILON);
    assert!((config.auth.min_refresh_interval_secs - 300.0).abs() < f64::EPSILON);
    assert!(config.test_data_path.is_none());
}

#[test]
fn secret_key_is_required() {
    assert!(matches!(load(&[]), Err(ConfigError::MissingSecretKey)));
    assert!(matches!(
        load(&[("SECRET_KEY", "   ")]),
        Err(ConfigError::MissingSecretKey)
    ));
}

#[test]
fn production_ignores_debug_flag() {
    let config = production(&[("DEBUG", "True")]).expect("config loads");
    assert!(!config.debug);
}

#[test]
fn development_ignores_allowed_origins() {
    let config = development(&[("ALLOWED_ORIGINS", "https://example.com")])
        .expect("config loads");
    assert!(config.allowed_origins.is_empty());
    assert!(config.debug);
    assert_eq!(config.allowed_hosts, vec!["localhost".to_string()]);
    assert_eq!(config.telemetry.log_level, LogLevel::Info);
}

#[test]
fn development_reads_debug_flag() {
    let config = development(&[("DEBUG", "no")]).expect("config loads");
    assert!(!config.debug);
}

#[test]
fn production_reads_origin_and_host_lists() {
    let config = production(&[
        ("ALLOWED_HOSTS", "api.smartserve.com, 10.0.0.7"),
        ("ALLOWED_ORIGINS", "https://a.example,http://b.example"),
    ])
    .expect("config loads");
    assert_eq!(config.allowed_hosts, vec!["api.smartserve.com", "10.0.0.7"]);
    assert_eq!(
        config.allowed_origins,
        vec!["https://a.example", "http://b.example"]
    );
}

#[test]
fn origins_without_scheme_are_rejected() {
    assert!(matches!(
        production(&[("ALLOWED_ORIGINS", "smartserve.com")]),
        Err(ConfigError::InvalidOrigin { .. })
    ));
}

#[test]
fn password_similarity_must_lie_within_bounds() {
    for ok in ["0.1", "0.5", "1.0"] {
        let config = production(&[("PASSWORD_SIMILARITY_TO_USER_ATTRIBUTES", ok)])
            .unwrap_or_else(|err| panic!("{ok} rejected: {err}"));
        assert!((0.1..=1.0).contains(&config.password_similarity));
    }
    for bad in ["0.09", "1.01", "-1", "NaN"] {
        assert!(
            matches!(
                production(&[("PASSWORD_SIMILARITY_TO_USER_ATTRIBUTES", bad)]),
                Err(ConfigError::PasswordSimilarityOutOfRange { .. })
            ),
            "{bad} accepted"
        );
    }
    assert!(matches!(
        production(&[("PASSWORD_SIMILARITY_TO_USER_ATTRIBUTES", "high")]),
        Err(ConfigError::Invalid { .. })
    ));
}

#[test]
fn refresh_interval_has_lower_bound() {
    let config = production(&[("AUTH_TOKEN_MINIMUM_REFRESH_INTERVAL", "1.0")])
        .expect("boundary accepted");
    assert!((config.auth.min_refresh_interval_secs - 1.0).abs() < f64::EPSILON);

    let err = production(&[("AUTH_TOKEN_MINIMUM_REFRESH_INTERVAL", "0.99")])
        .expect_err("below bound rejected");
    assert!(err
        .to_string()
        .starts_with("AUTH_TOKEN_MINIMUM_REFRESH_INTERVAL"));
}

#[test]
fn token_ttl_is_capped_at_ten_years() {
    let config = production(&[("AUTH_TOKEN_TTL", "315360000")]).expect("ten years accepted");
    assert!((config.auth.token_ttl_secs - MAX_TOKEN_DURATION_SECS).abs() < f64::EPSILON);

    for value in ["1e16", "315360000.5", "0", "-3", "NaN", "inf"] {
        let err = production(&[("AUTH_TOKEN_TTL", value)]).expect_err("out of range");
        assert!(
            matches!(err, ConfigError::Invalid { name: "AUTH_TOKEN_TTL", .. }),
            "{value} gave {err}"
        );
    }
    assert!(matches!(
        production(&[("AUTH_TOKEN_MINIMUM_REFRESH_INTERVAL", "1e300")]),
        Err(ConfigError::Invalid {
            name: "AUTH_TOKEN_MINIMUM_REFRESH_INTERVAL",
            ..
        })
    ));
}

#[test]
fn common_password_list_can_be_replaced() {
    assert_eq!(
        production(&[]).expect("defaults load").auth.common_passwords,
        CommonPasswords::bundled()
    );

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("common-passwords.txt");
    std::fs::write(&path, "zebracrossing\n").expect("write list");
    let config = production(&[("COMMON_PASSWORDS_FILE", path.to_str().expect("utf-8 path"))])
        .expect("list loads");
    assert_eq!(config.auth.common_passwords.len(), 1);
    assert!(config.auth.common_passwords.contains("ZebraCrossing"));

    let missing = dir.path().join("absent.txt");
    assert!(matches!(
        production(&[("COMMON_PASSWORDS_FILE", missing.to_str().expect("utf-8 path"))]),
        Err(ConfigError::CommonPasswords { .. })
    ));
}

#[test]
fn pagination_size_must_be_positive_integer() {
    assert_eq!(
        production(&[("API_RESPONSE_PAGINATION_SIZE", "1")])
            .expect("one accepted")
            .pagination_size,
        1
    );
    assert!(matches!(
        production(&[("API_RESPONSE_PAGINATION_SIZE", "0")]),
        Err(ConfigError::PaginationSizeNotPositive { value: 0 })
    ));
    assert!(matches!(
        production(&[("API_RESPONSE_PAGINATION_SIZE", "-4")]),
        Err(ConfigError::PaginationSizeNotPositive { value: -4 })
    ));
    assert!(matches!(
        production(&[("API_RESPONSE_PAGINATION_SIZE", "2.5")]),
        Err(ConfigError::Invalid { .. })
    ));
}

#[test]
fn log_level_accepts_known_names_in_any_case() {
    let config = production(&[("LOG_LEVEL", "critical")]).expect("config loads");
    assert_eq!(config.telemetry.log_level, LogLevel::Critical);
    assert_eq!(config.telemetry.log_level.filter_directive(), "error");

    let config = development(&[("LOG_LEVEL", "Debug")]).expect("config loads");
    assert_eq!(config.telemetry.log_level, LogLevel::Debug);
}

#[test]
fn unknown_log_level_lists_choices() {
    let err = production(&[("LOG_LEVEL", "TRACE")]).expect_err("trace rejected");
    let message = err.to_string();
    for choice in LogLevel::CHOICES {
        assert!(message.contains(choice.name()), "missing {choice} in {message}");
    }
}

#[test]
fn optional_paths_are_captured() {
    let config = production(&[
        ("TEST_DATA_JSON_FILE_PATH", "fixtures/test_data.json"),
        ("DATABASE_PATH", ""),
    ])
    .expect("config loads");
    assert_eq!(
        config.test_data_path,
        Some(PathBuf::from("fixtures/test_data.json"))
    );
    assert!(config.database_path.is_none());
}

#[test]
fn debug_output_redacts_secret() {
    let config = production(&[]).expect("config loads");
    let rendered = format!("{config:?}");
    assert!(!rendered.contains("prod-secret"));
    assert!(rendered.contains("<redacted>"));
}

fn env_guard() -> &'static Mutex<()> {
    static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
    GUARD.get_or_init(|| Mutex::new(()))
}

#[test]
fn accepts_localhost_host() {
    let _lock = env_guard().lock().expect("env mutex poisoned");
    let config = development(&[("APP_HOST", "localhost"), ("APP_PORT", "8080")])
        .expect("config loads");
    let addr = config.server.socket_addr().expect("localhost resolves");
    assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 8080));
}

#[test]
fn load_reads_process_environment() {
    let _lock = env_guard().lock().expect("env mutex poisoned");
    env::set_var("SECRET_KEY", "from-process");
    env::set_var("PRODUCTION", "false");
    env::set_var("API_RESPONSE_PAGINATION_SIZE", "7");
    let config = AppConfig::load().expect("config loads");
    env::remove_var("SECRET_KEY");
    env::remove_var("PRODUCTION");
    env::remove_var("API_RESPONSE_PAGINATION_SIZE");

    assert_eq!(config.secret_key, "from-process");
    assert_eq!(config.environment, DeploymentMode::Development);
    assert_eq!(config.pagination_size, 7);
}
