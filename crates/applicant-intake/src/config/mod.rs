use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::workflows::intake::{ChatId, DocumentRouting};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the bot.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub transport: TransportConfig,
    pub intake: IntakeConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let api_key = env::var("API_KEY")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;
        let reviewer_chat_id = env::var("ADMIN_CHAT_ID")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingAdminChatId)?
            .trim()
            .parse::<i64>()
            .map(ChatId)
            .map_err(|_| ConfigError::InvalidAdminChatId)?;

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let api_url = env::var("TELEGRAM_API_URL")
            .unwrap_or_else(|_| "https://api.telegram.org".to_string())
            .trim_end_matches('/')
            .to_string();
        let poll_timeout_secs = numeric_var("TELEGRAM_POLL_TIMEOUT_SECS", 30)?;

        let session_ttl_secs = numeric_var("INTAKE_SESSION_TTL_SECS", 7 * 24 * 60 * 60)?;
        let sweep_interval_secs = numeric_var("INTAKE_SWEEP_INTERVAL_SECS", 300)?;
        let attempts = numeric_var("INTAKE_DELIVERY_ATTEMPTS", 3)?;
        let backoff_ms = numeric_var("INTAKE_DELIVERY_BACKOFF_MS", 500)?;

        let routing_raw =
            env::var("INTAKE_DOCUMENT_ROUTING").unwrap_or_else(|_| "filename".to_string());
        let document_routing = DocumentRouting::parse(&routing_raw)
            .ok_or(ConfigError::InvalidDocumentRouting { value: routing_raw })?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
                include_targets: environment == AppEnvironment::Development,
            },
            transport: TransportConfig {
                api_key,
                api_url,
                poll_timeout: Duration::from_secs(u64::from(poll_timeout_secs)),
            },
            intake: IntakeConfig {
                reviewer_chat_id,
                session_ttl: chrono::Duration::seconds(i64::from(session_ttl_secs)),
                sweep_interval: Duration::from_secs(u64::from(sweep_interval_secs)),
                delivery: DeliveryConfig {
                    attempts,
                    backoff: Duration::from_millis(u64::from(backoff_ms)),
                },
                document_routing,
            },
        })
    }
}

fn numeric_var(key: &'static str, default: u32) -> Result<u32, ConfigError> {
    let Ok(raw) = env::var(key) else {
        return Ok(default);
    };
    match raw.trim().parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidNumber { key, value: raw }),
    }
}

/// Settings controlling the operations HTTP endpoint.
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub ansi: bool,
    pub include_targets: bool,
}

/// Chat platform credentials and polling behavior.
#[derive(Clone)]
pub struct TransportConfig {
    pub api_key: String,
    pub api_url: String,
    pub poll_timeout: Duration,
}

impl fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportConfig")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("poll_timeout", &self.poll_timeout)
            .finish()
    }
}

/// Intake flow settings: reviewer destination, session lifetime, and delivery retries.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    pub reviewer_chat_id: ChatId,
    pub session_ttl: chrono::Duration,
    pub sweep_interval: Duration,
    pub delivery: DeliveryConfig,
    pub document_routing: DocumentRouting,
}

impl IntakeConfig {
    pub fn new(reviewer_chat_id: ChatId) -> Self {
        Self {
            reviewer_chat_id,
            session_ttl: chrono::Duration::days(7),
            sweep_interval: Duration::from_secs(300),
            delivery: DeliveryConfig::default(),
            document_routing: DocumentRouting::default(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DeliveryConfig {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_millis(500),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    MissingApiKey,
    MissingAdminChatId,
    InvalidAdminChatId,
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str, value: String },
    InvalidDocumentRouting { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingApiKey => write!(
                f,
                "No API key provided. Please set the API_KEY environment variable in the .env file."
            ),
            ConfigError::MissingAdminChatId => write!(
                f,
                "No Admin chat ID provided. Please set the ADMIN_CHAT_ID environment variable in the .env file."
            ),
            ConfigError::InvalidAdminChatId => {
                write!(f, "ADMIN_CHAT_ID must be a numeric chat id")
            }
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be a positive integer (found '{value}')")
            }
            ConfigError::InvalidDocumentRouting { value } => write!(
                f,
                "INTAKE_DOCUMENT_ROUTING must be 'filename' or 'step' (found '{value}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "API_KEY",
            "ADMIN_CHAT_ID",
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "TELEGRAM_API_URL",
            "TELEGRAM_POLL_TIMEOUT_SECS",
            "INTAKE_SESSION_TTL_SECS",
            "INTAKE_SWEEP_INTERVAL_SECS",
            "INTAKE_DELIVERY_ATTEMPTS",
            "INTAKE_DELIVERY_BACKOFF_MS",
            "INTAKE_DOCUMENT_ROUTING",
        ] {
            env::remove_var(key);
        }
    }

    fn set_required() {
        env::set_var("API_KEY", "123456:test-token");
        env::set_var("ADMIN_CHAT_ID", "-1001234567890");
    }

    #[test]
    fn load_uses_defaults_when_optional_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        set_required();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.transport.api_url, "https://api.telegram.org");
        assert_eq!(config.transport.poll_timeout, Duration::from_secs(30));
        assert_eq!(config.intake.reviewer_chat_id, ChatId(-1001234567890));
        assert_eq!(config.intake.session_ttl, chrono::Duration::days(7));
        assert_eq!(config.intake.delivery.attempts, 3);
        assert_eq!(config.intake.document_routing, DocumentRouting::FileName);
    }

    #[test]
    fn missing_api_key_is_fatal() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ADMIN_CHAT_ID", "42");
        let err = AppConfig::load().expect_err("api key required");
        assert!(matches!(err, ConfigError::MissingApiKey));
        assert!(err.to_string().contains("API_KEY"));
    }

    #[test]
    fn missing_admin_chat_id_is_fatal() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("API_KEY", "token");
        let err = AppConfig::load().expect_err("admin chat id required");
        assert!(matches!(err, ConfigError::MissingAdminChatId));
        assert!(err.to_string().contains("ADMIN_CHAT_ID"));
    }

    #[test]
    fn rejects_non_numeric_admin_chat_id() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        set_required();
        env::set_var("ADMIN_CHAT_ID", "@reviewers");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidAdminChatId)
        ));
    }

    #[test]
    fn reads_intake_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        set_required();
        env::set_var("INTAKE_SESSION_TTL_SECS", "3600");
        env::set_var("INTAKE_DELIVERY_ATTEMPTS", "5");
        env::set_var("INTAKE_DOCUMENT_ROUTING", "Step");
        env::set_var("TELEGRAM_API_URL", "http://localhost:8081/");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.intake.session_ttl, chrono::Duration::hours(1));
        assert_eq!(config.intake.delivery.attempts, 5);
        assert_eq!(config.intake.document_routing, DocumentRouting::Step);
        assert_eq!(config.transport.api_url, "http://localhost:8081");
    }

    #[test]
    fn rejects_zero_delivery_attempts() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        set_required();
        env::set_var("INTAKE_DELIVERY_ATTEMPTS", "0");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidNumber {
                key: "INTAKE_DELIVERY_ATTEMPTS",
                ..
            })
        ));
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        set_required();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn transport_debug_redacts_token() {
        let config = TransportConfig {
            api_key: "secret-token".to_string(),
            api_url: "https://api.telegram.org".to_string(),
            poll_timeout: Duration::from_secs(30),
        };
        assert!(!format!("{config:?}").contains("secret-token"));
    }
}
