use super::channel::Channel;
use super::OrderImportError;
use crate::config::ColumnMapping;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use serde::Serialize;
use std::io::Read;

/// One order line of a sales export, detached from its header labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRow {
    pub product_name: Option<String>,
    pub order_count: i64,
    pub is_refunded: bool,
    pub shop_type: Option<String>,
    /// Payment timestamp as written in the export.
    pub paid_at: Option<String>,
    pub paid_on: Option<NaiveDate>,
    pub discounted_amount: f64,
}

impl OrderRow {
    pub fn channel(&self) -> Channel {
        Channel::classify(self.shop_type.as_deref().unwrap_or_default())
    }

    /// Payment day as `YYYY-MM-DD`, or the raw cell when it is not a date.
    pub fn payment_day(&self) -> Option<String> {
        match (self.paid_on, self.paid_at.as_deref()) {
            (Some(date), _) => Some(date.format("%Y-%m-%d").to_string()),
            (None, raw) => raw.map(str::to_string),
        }
    }

    /// Order count with completed refunds counted negative.
    pub fn net_order_count(&self) -> i64 {
        if self.is_refunded {
            self.order_count.saturating_neg()
        } else {
            self.order_count
        }
    }
}

struct ColumnIndex {
    product_name: usize,
    order_count: Option<usize>,
    refund_status: Option<usize>,
    shop_type: Option<usize>,
    paid_at: Option<usize>,
    discounted_amount: Option<usize>,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord, columns: &ColumnMapping) -> Result<Self, OrderImportError> {
        let position = |label: &str| {
            headers
                .iter()
                .position(|header| clean_header(header) == label)
        };

        let product_name = position(columns.product_name.as_str()).ok_or_else(|| {
            OrderImportError::MissingColumn {
                column: columns.product_name.clone(),
            }
        })?;

        Ok(Self {
            product_name,
            order_count: position(columns.order_count.as_str()),
            refund_status: position(columns.refund_status.as_str()),
            shop_type: position(columns.shop_type.as_str()),
            paid_at: position(columns.paid_at.as_str()),
            discounted_amount: position(columns.discounted_amount.as_str()),
        })
    }
}

pub(crate) fn parse_rows<R: Read>(
    reader: R,
    columns: &ColumnMapping,
) -> Result<Vec<OrderRow>, OrderImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let index = ColumnIndex::resolve(csv_reader.headers()?, columns)?;
    let mut rows = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        let cell = |position: Option<usize>| {
            position
                .and_then(|position| record.get(position))
                .filter(|value| !value.is_empty())
        };

        let paid_at = cell(index.paid_at).map(str::to_string);
        let paid_on = paid_at.as_deref().and_then(parse_payment_date);

        rows.push(OrderRow {
            product_name: cell(Some(index.product_name)).map(str::to_string),
            order_count: cell(index.order_count).map(parse_count).unwrap_or(0),
            is_refunded: cell(index.refund_status) == Some(columns.refunded_marker.as_str()),
            shop_type: cell(index.shop_type).map(str::to_string),
            paid_at,
            paid_on,
            discounted_amount: cell(index.discounted_amount)
                .map(parse_amount)
                .unwrap_or(0.0),
        });
    }

    Ok(rows)
}

fn clean_header(value: &str) -> &str {
    value.trim_start_matches('\u{feff}').trim()
}

// Unparseable and out-of-range counts are zero; fractional counts are
// truncated.
fn parse_count(value: &str) -> i64 {
    if let Ok(count) = value.parse::<i64>() {
        return count;
    }
    match value.parse::<f64>() {
        Ok(count) if count.is_finite() && count.abs() < i64::MAX as f64 => count.trunc() as i64,
        _ => 0,
    }
}

fn parse_amount(value: &str) -> f64 {
    value
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
        .unwrap_or(0.0)
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

fn parse_payment_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc().date());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt.date());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }

    parse_serial_date(trimmed)
}

/// Spreadsheet serial dates count days from 1899-12-30.
fn parse_serial_date(value: &str) -> Option<NaiveDate> {
    let serial = value.parse::<f64>().ok().filter(|serial| serial.is_finite())?;
    if !(1.0..=2_958_465.0).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}

#[cfg(test)]
pub(crate) fn parse_payment_date_for_tests(value: &str) -> Option<NaiveDate> {
    parse_payment_date(value)
}

#[cfg(test)]
pub(crate) fn parse_count_for_tests(value: &str) -> i64 {
    parse_count(value)
}
