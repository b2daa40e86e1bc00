use super::super::parser::OrderRow;
use crate::catalog::ProductNameNormalizer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A dashboard category: canonical names containing `keyword` and none of
/// the `exclusions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCategory {
    pub name: String,
    pub keyword: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclusions: Vec<String>,
}

impl ProductCategory {
    pub fn new(name: impl Into<String>, keyword: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keyword: keyword.into(),
            exclusions: Vec::new(),
        }
    }

    pub fn excluding(mut self, fragment: impl Into<String>) -> Self {
        self.exclusions.push(fragment.into());
        self
    }

    pub fn standard() -> Vec<Self> {
        vec![
            Self::new("夹克", "夹克"),
            // hoodies share the 帽 character with caps
            Self::new("帽子", "帽").excluding("帽衫"),
            Self::new("包", "包"),
            Self::new("羽绒服", "羽绒服"),
            Self::new("章", "章"),
            Self::new("舰载熊猫", "舰载熊猫"),
        ]
    }

    /// Looks a category up by display name, falling back to a keyword-only
    /// category.
    pub fn resolve(name: &str) -> Self {
        Self::standard()
            .into_iter()
            .find(|category| category.name == name || category.keyword == name)
            .unwrap_or_else(|| Self::new(name, name))
    }

    pub fn includes(&self, canonical: &str) -> bool {
        canonical.contains(self.keyword.as_str())
            && !self
                .exclusions
                .iter()
                .any(|fragment| canonical.contains(fragment.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryEntry {
    pub name: String,
    pub order_count: i64,
    pub discounted_amount: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryReport {
    pub category: ProductCategory,
    pub entries: Vec<CategoryEntry>,
}

impl CategoryReport {
    /// Aggregates non-refunded rows of one category by canonical name.
    pub fn build(
        rows: &[OrderRow],
        normalizer: &ProductNameNormalizer,
        category: &ProductCategory,
    ) -> Self {
        let mut totals: HashMap<String, (i64, f64)> = HashMap::new();

        for row in rows.iter().filter(|row| !row.is_refunded) {
            let Some(canonical) = normalizer.normalize_optional(row.product_name.as_deref())
            else {
                continue;
            };
            if canonical.is_empty() || !category.includes(&canonical) {
                continue;
            }

            let entry = totals.entry(canonical).or_insert((0, 0.0));
            entry.0 = entry.0.saturating_add(row.order_count);
            entry.1 += row.discounted_amount;
        }

        let mut entries: Vec<CategoryEntry> = totals
            .into_iter()
            .map(|(name, (order_count, discounted_amount))| CategoryEntry {
                name,
                order_count,
                discounted_amount,
            })
            .collect();
        entries.sort_by(|a, b| {
            b.order_count
                .cmp(&a.order_count)
                .then_with(|| a.name.cmp(&b.name))
        });

        Self {
            category: category.clone(),
            entries,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
