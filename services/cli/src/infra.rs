use chrono::NaiveDate;
use sales_analytics::catalog::{load_rule_set, ProductNameNormalizer};
use sales_analytics::config::AppConfig;
use sales_analytics::error::AppError;
use sales_analytics::orders::report::GroupBy;
use sales_analytics::orders::{OrderImporter, OrderRow};
use sales_analytics::telemetry;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Loaded configuration plus the normalizer built from it.
pub(crate) struct Context {
    pub(crate) config: AppConfig,
    pub(crate) normalizer: ProductNameNormalizer,
}

impl Context {
    pub(crate) fn load() -> Result<Self, AppError> {
        let config = AppConfig::load()?;
        telemetry::init(&config.telemetry)?;

        let rules = load_rule_set(&config.catalog)?;
        info!(
            environment = ?config.environment,
            rules = rules.len(),
            "product rules ready"
        );

        Ok(Self {
            config,
            normalizer: ProductNameNormalizer::new(rules),
        })
    }

    pub(crate) fn load_orders(&self, path: &Path) -> Result<Vec<OrderRow>, AppError> {
        let rows = OrderImporter::from_path(path, &self.config.import.columns)?;
        info!(path = %path.display(), rows = rows.len(), "imported order export");
        Ok(rows)
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_group_by(raw: &str) -> Result<GroupBy, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "date" | "payment_date" => Ok(GroupBy::PaymentDate),
        "shop" => Ok(GroupBy::Shop),
        "product" => Ok(GroupBy::Product),
        "quantity" | "count" => Ok(GroupBy::Quantity),
        other => Err(format!(
            "unknown grouping '{other}' (expected date, shop, product or quantity)"
        )),
    }
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
