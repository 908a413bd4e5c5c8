use crate::config::TelemetryConfig;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// HTTP client crates log every long-poll round trip below `warn`.
const QUIET_DEPENDENCIES: &str = "hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn";

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log filter '{value}'")]
    InvalidFilter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("tracing subscriber already installed: {0}")]
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

/// Filter directive for the subscriber. A non-empty `RUST_LOG` is taken verbatim; otherwise
/// the configured level applies with the HTTP stack held at `warn`.
pub fn filter_directive(rust_log: Option<&str>, config: &TelemetryConfig) -> String {
    match rust_log.map(str::trim).filter(|value| !value.is_empty()) {
        Some(explicit) => explicit.to_string(),
        None => format!("{},{QUIET_DEPENDENCIES}", config.log_level.trim()),
    }
}

/// Installs the global compact fmt subscriber. Colors and module targets follow the config.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = filter_directive(rust_log.as_deref(), config);
    let env_filter =
        EnvFilter::try_new(&directive).map_err(|source| TelemetryError::InvalidFilter {
            value: directive.clone(),
            source,
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(config.include_targets)
        .with_ansi(config.ansi)
        .compact()
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(level: &str) -> TelemetryConfig {
        TelemetryConfig {
            log_level: level.to_string(),
            ansi: false,
            include_targets: false,
        }
    }

    #[test]
    fn explicit_rust_log_wins() {
        let directive = filter_directive(Some("applicant_intake=trace"), &config("info"));
        assert_eq!(directive, "applicant_intake=trace");
    }

    #[test]
    fn configured_level_quiets_http_stack() {
        let directive = filter_directive(Some("  "), &config("debug"));
        assert!(directive.starts_with("debug,"));
        assert!(directive.contains("reqwest=warn"));
        assert!(EnvFilter::try_new(&directive).is_ok());
    }

    #[test]
    fn malformed_level_is_reported() {
        let directive = filter_directive(None, &config("applicant_intake=loud"));
        assert!(EnvFilter::try_new(directive).is_err());
    }
}
