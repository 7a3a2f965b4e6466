use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

mod values;

pub use values::{parse_bool, parse_list};

use crate::auth::CommonPasswords;
use values::Lookup;

const DEFAULT_PASSWORD_SIMILARITY: f64 = 0.627;
const DEFAULT_MIN_REFRESH_INTERVAL_SECS: f64 = 300.0;
const DEFAULT_TOKEN_TTL_SECS: f64 = 36_000.0;
/// Ten years. Token lifetimes and refresh intervals above this are rejected.
pub const MAX_TOKEN_DURATION_SECS: f64 = 315_360_000.0;
const DEFAULT_PAGINATION_SIZE: usize = 50;
const DEFAULT_HASH_ITERATIONS: u32 = 600_000;

const PRODUCTION_HOSTS: &[&str] = &["smartserve"];
const PRODUCTION_ORIGINS: &[&str] = &["https://smartserve.com"];
const DEVELOPMENT_HOSTS: &[&str] = &["localhost"];

/// Distinguishes production deployments from local development.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentMode {
    Development,
    Production,
}

impl DeploymentMode {
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Minimum severity emitted by the logging subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    pub const CHOICES: [LogLevel; 5] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Critical,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }

    /// Directive understood by `tracing_subscriber::EnvFilter`. Tracing has no
    /// level above `error`, so CRITICAL collapses onto it.
    pub const fn filter_directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Critical => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let upper = value.trim().to_ascii_uppercase();
        Self::CHOICES
            .into_iter()
            .find(|level| level.name() == upper)
            .ok_or_else(|| ConfigError::UnknownLogLevel {
                value: value.to_string(),
            })
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Top-level configuration for the application.
#[derive(Clone)]
pub struct AppConfig {
    pub environment: DeploymentMode,
    pub secret_key: String,
    pub debug: bool,
    pub allowed_hosts: Vec<String>,
    pub allowed_origins: Vec<String>,
    pub password_similarity: f64,
    pub auth: AuthConfig,
    pub pagination_size: usize,
    pub test_data_path: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("environment", &self.environment)
            .field("secret_key", &"<redacted>")
            .field("debug", &self.debug)
            .field("allowed_hosts", &self.allowed_hosts)
            .field("allowed_origins", &self.allowed_origins)
            .field("password_similarity", &self.password_similarity)
            .field("auth", &self.auth)
            .field("pagination_size", &self.pagination_size)
            .field("test_data_path", &self.test_data_path)
            .field("database_path", &self.database_path)
            .field("server", &self.server)
            .field("telemetry", &self.telemetry)
            .finish()
    }
}

impl AppConfig {
    /// Reads `.env` (if present) and then the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Lookup::new(&lookup);

        let secret_key = vars
            .get("SECRET_KEY")
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingSecretKey)?;

        let environment = if vars.bool_or("PRODUCTION", true) {
            DeploymentMode::Production
        } else {
            DeploymentMode::Development
        };

        let (debug, allowed_hosts, allowed_origins, log_level) = match environment {
            DeploymentMode::Production => {
                let hosts = vars.list_or("ALLOWED_HOSTS", PRODUCTION_HOSTS);
                let origins = vars.list_or("ALLOWED_ORIGINS", PRODUCTION_ORIGINS);
                for origin in &origins {
                    if !(origin.starts_with("http://") || origin.starts_with("https://")) {
                        return Err(ConfigError::InvalidOrigin {
                            value: origin.clone(),
                        });
                    }
                }
                let level = vars.get("LOG_LEVEL").unwrap_or_else(|| "WARNING".to_string());
                (false, hosts, origins, level)
            }
            DeploymentMode::Development => {
                let debug = vars.bool_or("DEBUG", true);
                let hosts = vars.list_or("ALLOWED_HOSTS", DEVELOPMENT_HOSTS);
                let level = vars.get("LOG_LEVEL").unwrap_or_else(|| "INFO".to_string());
                (debug, hosts, Vec::new(), level)
            }
        };
        let log_level = log_level.parse::<LogLevel>()?;

        let password_similarity = vars.parse_or(
            "PASSWORD_SIMILARITY_TO_USER_ATTRIBUTES",
            DEFAULT_PASSWORD_SIMILARITY,
        )?;
        if !(0.1..=1.0).contains(&password_similarity) {
            return Err(ConfigError::PasswordSimilarityOutOfRange {
                value: password_similarity,
            });
        }

        let min_refresh_interval = vars.parse_or(
            "AUTH_TOKEN_MINIMUM_REFRESH_INTERVAL",
            DEFAULT_MIN_REFRESH_INTERVAL_SECS,
        )?;
        if !(min_refresh_interval >= 1.0) {
            return Err(ConfigError::RefreshIntervalTooShort {
                value: min_refresh_interval,
            });
        }
        if !(min_refresh_interval <= MAX_TOKEN_DURATION_SECS) {
            return Err(ConfigError::Invalid {
                name: "AUTH_TOKEN_MINIMUM_REFRESH_INTERVAL",
                value: min_refresh_interval.to_string(),
                expected: "at most 315360000 seconds (ten years)",
            });
        }

        let token_ttl = vars.parse_or("AUTH_TOKEN_TTL", DEFAULT_TOKEN_TTL_SECS)?;
        if !(token_ttl > 0.0 && token_ttl <= MAX_TOKEN_DURATION_SECS) {
            return Err(ConfigError::Invalid {
                name: "AUTH_TOKEN_TTL",
                value: token_ttl.to_string(),
                expected: "a positive number of seconds up to 315360000 (ten years)",
            });
        }

        let hash_iterations =
            vars.parse_or("PASSWORD_HASH_ITERATIONS", DEFAULT_HASH_ITERATIONS)?;
        if hash_iterations == 0 {
            return Err(ConfigError::Invalid {
                name: "PASSWORD_HASH_ITERATIONS",
                value: "0".to_string(),
                expected: "an integer greater than 0",
            });
        }

        let common_passwords = match vars.path("COMMON_PASSWORDS_FILE") {
            Some(path) => CommonPasswords::from_path(&path)
                .map_err(|source| ConfigError::CommonPasswords { path, source })?,
            None => CommonPasswords::bundled(),
        };

        let pagination_size: i64 = vars.parse_or(
            "API_RESPONSE_PAGINATION_SIZE",
            DEFAULT_PAGINATION_SIZE as i64,
        )?;
        if pagination_size <= 0 {
            return Err(ConfigError::PaginationSizeNotPositive {
                value: pagination_size,
            });
        }

        let host = vars.get("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = vars
            .get("APP_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        Ok(Self {
            environment,
            secret_key,
            debug,
            allowed_hosts,
            allowed_origins,
            password_similarity,
            auth: AuthConfig {
                min_refresh_interval_secs: min_refresh_interval,
                token_ttl_secs: token_ttl,
                hash_iterations,
                common_passwords,
            },
            pagination_size: pagination_size as usize,
            test_data_path: vars.path("TEST_DATA_JSON_FILE_PATH"),
            database_path: vars.path("DATABASE_PATH"),
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Token lifetime and password hashing knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthConfig {
    pub min_refresh_interval_secs: f64,
    pub token_ttl_secs: f64,
    pub hash_iterations: u32,
    /// Bundled list unless COMMON_PASSWORDS_FILE names a replacement.
    pub common_passwords: CommonPasswords,
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Logging controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: LogLevel,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("SECRET_KEY must be set to a non-empty value")]
    MissingSecretKey,
    #[error("{name} must be {expected} (found '{value}')")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("COMMON_PASSWORDS_FILE {path} could not be read")]
    CommonPasswords {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("PASSWORD_SIMILARITY_TO_USER_ATTRIBUTES must be a float between 0.1 and 1.0 (found {value})")]
    PasswordSimilarityOutOfRange { value: f64 },
    #[error("AUTH_TOKEN_MINIMUM_REFRESH_INTERVAL must be a float greater than or equal to 1.0 (found {value})")]
    RefreshIntervalTooShort { value: f64 },
    #[error("API_RESPONSE_PAGINATION_SIZE must be an integer greater than 0 (found {value})")]
    PaginationSizeNotPositive { value: i64 },
    #[error(
        "LOG_LEVEL must be one of \"DEBUG\",\"INFO\",\"WARNING\",\"ERROR\" or \"CRITICAL\" (found '{value}')"
    )]
    UnknownLogLevel { value: String },
    #[error("ALLOWED_ORIGINS entries must start with http:// or https:// (found '{value}')")]
    InvalidOrigin { value: String },
    #[error("APP_PORT must be a valid u16")]
    InvalidPort,
    #[error("APP_HOST must parse to an IPv4 or IPv6 address")]
    InvalidHost {
        #[source]
        source: std::net::AddrParseError,
    },
}

#[cfg(test)]
mod tests;
