use super::super::channel::Channel;
use super::super::parser::OrderRow;
use crate::catalog::ProductNameNormalizer;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("date range ends ({end}) before it starts ({start})")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

/// Inclusive range of payment dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ReportError> {
        if end < start {
            return Err(ReportError::InvertedRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySales {
    pub date: NaiveDate,
    pub quantity: i64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelSales {
    pub channel: Channel,
    pub label: &'static str,
    pub quantity: i64,
}

/// Drill-down for one canonical product over a date range.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    pub product: String,
    pub range: DateRange,
    pub sales_curve: Vec<DailySales>,
    pub total_quantity: i64,
    pub total_amount: f64,
    pub average_order_value: f64,
    pub channel_sales: Vec<ChannelSales>,
}

impl ProductDetail {
    /// Refunded rows contribute neither quantity nor amount; rows without a
    /// readable payment date are left out.
    pub fn build(
        rows: &[OrderRow],
        normalizer: &ProductNameNormalizer,
        product: &str,
        range: DateRange,
    ) -> Self {
        let mut daily: HashMap<NaiveDate, (i64, f64)> = HashMap::new();
        let mut channels: HashMap<Channel, i64> = HashMap::new();

        for row in rows.iter().filter(|row| !row.is_refunded) {
            let Some(paid_on) = row.paid_on.filter(|date| range.contains(*date)) else {
                continue;
            };
            let canonical = normalizer.normalize_optional(row.product_name.as_deref());
            if canonical.as_deref() != Some(product) {
                continue;
            }

            let day = daily.entry(paid_on).or_insert((0, 0.0));
            day.0 = day.0.saturating_add(row.order_count);
            day.1 += row.discounted_amount;
            let channel = channels.entry(row.channel()).or_default();
            *channel = channel.saturating_add(row.order_count);
        }

        let sales_curve: Vec<DailySales> = range
            .days()
            .map(|date| {
                let (quantity, amount) = daily.get(&date).copied().unwrap_or((0, 0.0));
                DailySales {
                    date,
                    quantity,
                    amount,
                }
            })
            .collect();

        let total_quantity = sales_curve
            .iter()
            .fold(0i64, |total, day| total.saturating_add(day.quantity));
        let total_amount: f64 = sales_curve.iter().map(|day| day.amount).sum();
        let average_order_value = if total_quantity > 0 {
            round_cents(total_amount / total_quantity as f64)
        } else {
            0.0
        };

        let channel_sales = Channel::tracked()
            .into_iter()
            .map(|channel| ChannelSales {
                channel,
                label: channel.label(),
                quantity: channels.get(&channel).copied().unwrap_or(0),
            })
            .collect();

        Self {
            product: product.to_string(),
            range,
            sales_curve,
            total_quantity,
            total_amount,
            average_order_value,
            channel_sales,
        }
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
