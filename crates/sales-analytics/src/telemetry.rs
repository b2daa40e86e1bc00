use crate::config::TelemetryConfig;
use std::{env, fmt};
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Where the active log directives were read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOrigin {
    /// `RUST_LOG`, which overrides the configured level when set.
    RustLog,
    /// `APP_LOG_LEVEL` or its default.
    AppLogLevel,
}

impl FilterOrigin {
    pub fn variable(self) -> &'static str {
        match self {
            FilterOrigin::RustLog => "RUST_LOG",
            FilterOrigin::AppLogLevel => "APP_LOG_LEVEL",
        }
    }
}

#[derive(Debug)]
pub enum TelemetryError {
    Directives {
        origin: FilterOrigin,
        directives: String,
        source: ParseError,
    },
    AlreadyInstalled(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::Directives {
                origin, directives, ..
            } => write!(
                f,
                "{} holds unusable log directives '{}'",
                origin.variable(),
                directives
            ),
            TelemetryError::AlreadyInstalled(err) => {
                write!(f, "a log subscriber is already installed: {err}")
            }
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::Directives { source, .. } => Some(source),
            TelemetryError::AlreadyInstalled(err) => Some(&**err),
        }
    }
}

/// Installs the global subscriber. Logs go to stderr so reports printed on
/// stdout stay machine readable.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let rust_log = env::var("RUST_LOG").ok();
    let filter = build_filter(config, rust_log.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::AlreadyInstalled)
}

/// A blank `RUST_LOG` counts as unset. A malformed one is an error rather than
/// a silent fallback to the configured level.
fn build_filter(
    config: &TelemetryConfig,
    rust_log: Option<&str>,
) -> Result<EnvFilter, TelemetryError> {
    let (origin, directives) = match rust_log.map(str::trim) {
        Some(value) if !value.is_empty() => (FilterOrigin::RustLog, value),
        _ => (FilterOrigin::AppLogLevel, config.log_level.trim()),
    };

    EnvFilter::try_new(directives).map_err(|source| TelemetryError::Directives {
        origin,
        directives: directives.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(log_level: &str) -> TelemetryConfig {
        TelemetryConfig {
            log_level: log_level.to_string(),
        }
    }

    #[test]
    fn configured_level_is_used_without_rust_log() {
        assert!(build_filter(&config("warn,sales_analytics=debug"), None).is_ok());
        assert!(build_filter(&config("info"), Some("   ")).is_ok());
    }

    #[test]
    fn invalid_configured_level_names_its_variable() {
        let err = build_filter(&config("sales_analytics=verbose"), None).expect_err("rejected");
        assert_eq!(
            err.to_string(),
            "APP_LOG_LEVEL holds unusable log directives 'sales_analytics=verbose'"
        );
    }

    #[test]
    fn malformed_rust_log_is_reported_instead_of_ignored() {
        let err = build_filter(&config("info"), Some("sales_analytics=loud"))
            .expect_err("rejected");
        match err {
            TelemetryError::Directives {
                origin, directives, ..
            } => {
                assert_eq!(origin, FilterOrigin::RustLog);
                assert_eq!(directives, "sales_analytics=loud");
            }
            other => panic!("expected directive error, got {other:?}"),
        }
    }

    #[test]
    fn rust_log_overrides_an_unusable_configured_level() {
        assert!(build_filter(&config("verbose=verbose"), Some("debug")).is_ok());
    }
}
