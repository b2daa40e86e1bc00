use super::super::parser::OrderRow;
use crate::catalog::ProductNameNormalizer;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

pub(crate) const UNKNOWN_SHOP: &str = "未知";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSales {
    pub name: String,
    pub net_orders: i64,
    pub shop_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShopOrders {
    pub shop_type: String,
    pub net_orders: i64,
}

/// Net order totals by canonical product and by shop type.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SalesReport {
    pub products: Vec<ProductSales>,
    pub shops: Vec<ShopOrders>,
}

#[derive(Default)]
struct ProductTally {
    net_orders: i64,
    shop_types: BTreeSet<String>,
}

impl SalesReport {
    pub fn build(rows: &[OrderRow], normalizer: &ProductNameNormalizer) -> Self {
        let mut products: HashMap<String, ProductTally> = HashMap::new();
        let mut shops: HashMap<String, i64> = HashMap::new();

        for row in rows {
            let shop = row.shop_type.as_deref().unwrap_or(UNKNOWN_SHOP);
            let shop_total = shops.entry(shop.to_string()).or_default();
            *shop_total = shop_total.saturating_add(row.net_order_count());

            let Some(canonical) = normalizer.normalize_optional(row.product_name.as_deref())
            else {
                continue;
            };
            if canonical.is_empty() {
                continue;
            }

            let tally = products.entry(canonical).or_default();
            tally.net_orders = tally.net_orders.saturating_add(row.net_order_count());
            if let Some(shop_type) = &row.shop_type {
                tally.shop_types.insert(shop_type.clone());
            }
        }

        let mut products: Vec<ProductSales> = products
            .into_iter()
            .filter(|(_, tally)| tally.net_orders > 0)
            .map(|(name, tally)| ProductSales {
                name,
                net_orders: tally.net_orders,
                shop_types: tally.shop_types.into_iter().collect(),
            })
            .collect();
        products.sort_by(|a, b| {
            b.net_orders
                .cmp(&a.net_orders)
                .then_with(|| a.name.cmp(&b.name))
        });

        let mut shops: Vec<ShopOrders> = shops
            .into_iter()
            .map(|(shop_type, net_orders)| ShopOrders {
                shop_type,
                net_orders,
            })
            .collect();
        shops.sort_by(|a, b| {
            b.net_orders
                .cmp(&a.net_orders)
                .then_with(|| a.shop_type.cmp(&b.shop_type))
        });

        Self { products, shops }
    }

    pub fn total_net_orders(&self) -> i64 {
        self.products
            .iter()
            .fold(0i64, |total, product| total.saturating_add(product.net_orders))
    }

    pub fn product(&self, name: &str) -> Option<&ProductSales> {
        self.products.iter().find(|product| product.name == name)
    }
}
