//! Spend-share weight tables: for every grouping-key bucket, the share of
//! the base metric each ASIN contributed.

use adlink_core::normalize::normalize_asin;
use adlink_core::{Column, GroupingKey, KeyValue, Metric, MetricTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One ASIN's share within a bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductWeight {
    pub asin: String,
    pub weight: f64,
}

/// Flat audit view of a single weight: bucket value, ASIN, weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub key: KeyValue,
    pub asin: String,
    pub weight: f64,
}

/// Weights for one grouping key. Within a bucket the weights sum to 1.
///
/// Export for audit through [`WeightTable::entries`].
#[derive(Debug, Clone, PartialEq)]
pub struct WeightTable {
    key: GroupingKey,
    base_metric: Metric,
    buckets: BTreeMap<KeyValue, Vec<ProductWeight>>,
}

impl WeightTable {
    pub fn empty(key: GroupingKey, base_metric: Metric) -> Self {
        Self {
            key,
            base_metric,
            buckets: BTreeMap::new(),
        }
    }

    pub fn key(&self) -> &GroupingKey {
        &self.key
    }

    pub fn base_metric(&self) -> Metric {
        self.base_metric
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of (bucket, ASIN) entries.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn lookup(&self, value: &KeyValue) -> Option<&[ProductWeight]> {
        self.buckets.get(value).map(Vec::as_slice)
    }

    pub fn entries(&self) -> impl Iterator<Item = WeightEntry> + '_ {
        self.buckets.iter().flat_map(|(key, products)| {
            products.iter().map(move |p| WeightEntry {
                key: key.clone(),
                asin: p.asin.clone(),
                weight: p.weight,
            })
        })
    }
}

/// Build the weight table for `key` from an aggregated advertised-product table.
///
/// Each ASIN's weight is its share of `base_metric` within the bucket. A
/// bucket whose total is not positive splits equally among its ASINs.
/// Rows with a missing key cell or blank ASIN contribute nothing.
pub fn build_weight_table(daily: &MetricTable, key: &GroupingKey, base_metric: Metric) -> WeightTable {
    let mut required = key.columns();
    required.push(Column::Asin);
    if daily.is_empty() || !daily.has_columns(&required) {
        return WeightTable::empty(key.clone(), base_metric);
    }

    let mut bases: BTreeMap<KeyValue, BTreeMap<String, f64>> = BTreeMap::new();
    for row in &daily.rows {
        let Some(value) = key.value_of(row) else {
            continue;
        };
        let asin = normalize_asin(row.asin.as_deref());
        if asin.is_empty() {
            continue;
        }
        *bases.entry(value).or_default().entry(asin).or_insert(0.0) += row.metrics.get(base_metric);
    }

    let buckets = bases
        .into_iter()
        .map(|(value, products)| {
            let total_base: f64 = products.values().sum();
            let asin_count = products.len();
            let weights = products
                .into_iter()
                .map(|(asin, weight_base)| {
                    let weight = if total_base > 0.0 {
                        weight_base / total_base
                    } else if asin_count > 0 {
                        1.0 / asin_count as f64
                    } else {
                        0.0
                    };
                    ProductWeight { asin, weight }
                })
                .collect();
            (value, weights)
        })
        .collect();

    WeightTable {
        key: key.clone(),
        base_metric,
        buckets,
    }
}
