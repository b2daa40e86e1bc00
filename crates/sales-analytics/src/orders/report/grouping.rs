use super::super::parser::OrderRow;
use crate::catalog::ProductNameNormalizer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const MISSING_KEY: &str = "无";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    PaymentDate,
    Shop,
    Product,
    Quantity,
}

impl GroupBy {
    pub const fn label(self) -> &'static str {
        match self {
            Self::PaymentDate => "付款日期",
            Self::Shop => "店铺类型",
            Self::Product => "商品类型",
            Self::Quantity => "订购数",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupEntry {
    pub key: String,
    pub orders: i64,
}

/// Gross order totals per key, in the order keys first appear.
pub fn group_orders(
    rows: &[OrderRow],
    normalizer: &ProductNameNormalizer,
    by: GroupBy,
) -> Vec<GroupEntry> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut entries: Vec<GroupEntry> = Vec::new();

    for row in rows {
        let key = group_key(row, normalizer, by);
        match positions.get(&key) {
            Some(&position) => {
                let entry = &mut entries[position];
                entry.orders = entry.orders.saturating_add(row.order_count);
            }
            None => {
                positions.insert(key.clone(), entries.len());
                entries.push(GroupEntry {
                    key,
                    orders: row.order_count,
                });
            }
        }
    }

    entries
}

fn group_key(row: &OrderRow, normalizer: &ProductNameNormalizer, by: GroupBy) -> String {
    match by {
        GroupBy::PaymentDate => row
            .payment_day()
            .unwrap_or_else(|| MISSING_KEY.to_string()),
        GroupBy::Shop => row
            .shop_type
            .clone()
            .unwrap_or_else(|| MISSING_KEY.to_string()),
        GroupBy::Product => canonical_or_raw(row, normalizer),
        GroupBy::Quantity => row.order_count.to_string(),
    }
}

/// Canonical name, or the raw cell when normalization leaves nothing.
pub(crate) fn canonical_or_raw(row: &OrderRow, normalizer: &ProductNameNormalizer) -> String {
    let raw = row.product_name.as_deref().unwrap_or_default();
    let canonical = normalizer.normalize(raw);
    if canonical.is_empty() {
        raw.to_string()
    } else {
        canonical
    }
}
