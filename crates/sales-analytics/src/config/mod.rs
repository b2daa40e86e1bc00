use std::env;
use std::fmt;
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the tool.
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

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub catalog: CatalogConfig,
    pub import: ImportConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let rules_path = env::var("APP_RULES_PATH")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        let rules_mode = match env::var("APP_RULES_MODE") {
            Ok(value) => RulesMode::parse(&value)?,
            Err(_) => RulesMode::Extend,
        };

        let defaults = ColumnMapping::default();
        let columns = ColumnMapping {
            product_name: column_var("APP_PRODUCT_COLUMN", defaults.product_name)?,
            order_count: column_var("APP_ORDER_COUNT_COLUMN", defaults.order_count)?,
            refund_status: column_var("APP_REFUND_COLUMN", defaults.refund_status)?,
            shop_type: column_var("APP_SHOP_COLUMN", defaults.shop_type)?,
            paid_at: column_var("APP_PAID_AT_COLUMN", defaults.paid_at)?,
            discounted_amount: column_var("APP_AMOUNT_COLUMN", defaults.discounted_amount)?,
            refunded_marker: column_var("APP_REFUND_MARKER", defaults.refunded_marker)?,
        };

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            catalog: CatalogConfig {
                rules_path,
                rules_mode,
            },
            import: ImportConfig { columns },
        })
    }
}

fn column_var(variable: &'static str, default: String) -> Result<String, ConfigError> {
    match env::var(variable) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Err(ConfigError::EmptyValue { variable })
            } else {
                Ok(trimmed.to_string())
            }
        }
        Err(_) => Ok(default),
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where the product rule table comes from.
#[derive(Debug, Clone, Default)]
pub struct CatalogConfig {
    pub rules_path: Option<PathBuf>,
    pub rules_mode: RulesMode,
}

/// How a rule file combines with the built-in table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RulesMode {
    /// File rules are evaluated ahead of the built-in table.
    #[default]
    Extend,
    Replace,
}

impl RulesMode {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "extend" => Ok(Self::Extend),
            "replace" => Ok(Self::Replace),
            other => Err(ConfigError::InvalidRulesMode(other.to_string())),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Extend => "extend",
            Self::Replace => "replace",
        }
    }
}

/// Spreadsheet import settings.
#[derive(Debug, Clone, Default)]
pub struct ImportConfig {
    pub columns: ColumnMapping,
}

/// Header labels of the order export. Only `product_name` must be present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub product_name: String,
    pub order_count: String,
    pub refund_status: String,
    pub shop_type: String,
    pub paid_at: String,
    pub discounted_amount: String,
    /// Refund-status value marking a completed refund.
    pub refunded_marker: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            product_name: "商品名称".to_string(),
            order_count: "订购数".to_string(),
            refund_status: "是否退款".to_string(),
            shop_type: "店铺类型".to_string(),
            paid_at: "付款时间".to_string(),
            discounted_amount: "让利后金额".to_string(),
            refunded_marker: "退款成功".to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidRulesMode(String),
    EmptyValue { variable: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidRulesMode(value) => write!(
                f,
                "APP_RULES_MODE must be 'extend' or 'replace' (found '{}')",
                value
            ),
            ConfigError::EmptyValue { variable } => {
                write!(f, "{} must not be empty when set", variable)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

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
        for variable in [
            "APP_ENV",
            "APP_LOG_LEVEL",
            "APP_RULES_PATH",
            "APP_RULES_MODE",
            "APP_PRODUCT_COLUMN",
            "APP_ORDER_COUNT_COLUMN",
            "APP_REFUND_COLUMN",
            "APP_SHOP_COLUMN",
            "APP_PAID_AT_COLUMN",
            "APP_AMOUNT_COLUMN",
            "APP_REFUND_MARKER",
        ] {
            env::remove_var(variable);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.catalog.rules_path.is_none());
        assert_eq!(config.catalog.rules_mode, RulesMode::Extend);
        assert_eq!(config.import.columns, ColumnMapping::default());
    }

    #[test]
    fn column_overrides_are_trimmed() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_PRODUCT_COLUMN", "  Product Name ");
        env::set_var("APP_RULES_MODE", "Replace");
        env::set_var("APP_RULES_PATH", "rules/products.json");
        let config = AppConfig::load().expect("config loads");
        reset_env();

        assert_eq!(config.import.columns.product_name, "Product Name");
        assert_eq!(config.import.columns.order_count, "订购数");
        assert_eq!(config.catalog.rules_mode, RulesMode::Replace);
        assert_eq!(
            config.catalog.rules_path,
            Some(PathBuf::from("rules/products.json"))
        );
    }

    #[test]
    fn rejects_unknown_rules_mode_and_blank_columns() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_RULES_MODE", "merge");
        let err = AppConfig::load().expect_err("mode rejected");
        assert!(matches!(err, ConfigError::InvalidRulesMode(ref mode) if mode == "merge"));

        reset_env();
        env::set_var("APP_SHOP_COLUMN", "   ");
        let err = AppConfig::load().expect_err("blank column rejected");
        reset_env();
        assert!(matches!(
            err,
            ConfigError::EmptyValue {
                variable: "APP_SHOP_COLUMN"
            }
        ));
    }
}
