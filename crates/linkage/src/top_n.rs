//! Top-N entity tables per ASIN (search terms, targetings, placements)
//! built from allocated rows.

use adlink_core::{Column, MetricTable, Metrics, Ratios};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// One entity's totals under a (shop, ad type, ASIN).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRanking {
    pub shop: Option<String>,
    pub ad_type: Option<String>,
    pub asin: String,
    /// Entity column values, e.g. search term, match type, campaign.
    pub entity: BTreeMap<Column, Option<String>>,
    pub metrics: Metrics,
    pub ratios: Ratios,
}

type EntityKey = (Option<String>, Option<String>, String, Vec<Option<String>>);

/// Sum allocated rows per (shop, ad type, ASIN, entity), drop groups below
/// `min_spend`, and keep the `top_n` highest-spend entities per ASIN.
///
/// Returns nothing if the table lacks shop, ad type, ASIN or any entity column.
pub fn top_n_entities_by_asin(
    allocated: &MetricTable,
    entity_cols: &[Column],
    top_n: usize,
    min_spend: f64,
) -> Vec<EntityRanking> {
    if allocated.is_empty()
        || !allocated.has_columns(&[Column::Shop, Column::AdType, Column::Asin])
        || !allocated.has_columns(entity_cols)
    {
        return Vec::new();
    }

    let mut groups: BTreeMap<EntityKey, Metrics> = BTreeMap::new();
    for row in &allocated.rows {
        let key = (
            row.shop.clone(),
            row.ad_type.clone(),
            row.asin.clone().unwrap_or_default(),
            entity_cols.iter().map(|&c| row.value(c)).collect(),
        );
        groups.entry(key).or_default().add(&row.metrics);
    }

    let rankings = groups
        .into_iter()
        .filter(|(_, metrics)| metrics.spend >= min_spend)
        .map(|((shop, ad_type, asin, values), metrics)| EntityRanking {
            shop,
            ad_type,
            asin,
            entity: entity_cols.iter().copied().zip(values).collect(),
            ratios: metrics.ratios(),
            metrics,
        })
        .collect();

    rank_within_products(rankings, top_n)
}

fn by_spend_sales_orders(a: &EntityRanking, b: &EntityRanking) -> Ordering {
    b.metrics
        .spend
        .total_cmp(&a.metrics.spend)
        .then_with(|| b.metrics.sales.total_cmp(&a.metrics.sales))
        .then_with(|| b.metrics.orders.total_cmp(&a.metrics.orders))
}

/// Order each (shop, ad type, ASIN) group by spend, sales, orders descending
/// and keep its first `top_n` rows. Groups come out in key order.
pub(crate) fn rank_within_products(rankings: Vec<EntityRanking>, top_n: usize) -> Vec<EntityRanking> {
    let mut by_product: BTreeMap<(Option<String>, Option<String>, String), Vec<EntityRanking>> =
        BTreeMap::new();
    for r in rankings {
        by_product
            .entry((r.shop.clone(), r.ad_type.clone(), r.asin.clone()))
            .or_default()
            .push(r);
    }

    let mut out = Vec::new();
    for (_, mut group) in by_product {
        group.sort_by(by_spend_sales_orders);
        group.truncate(top_n);
        out.extend(group);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use adlink_core::MetricRow;

    const COLUMNS: [Column; 5] = [
        Column::Shop,
        Column::AdType,
        Column::Asin,
        Column::SearchTerm,
        Column::Campaign,
    ];

    fn alloc(asin: &str, term: &str, spend: f64, sales: f64, orders: f64) -> MetricRow {
        MetricRow {
            shop: Some("S1".into()),
            ad_type: Some("SP".into()),
            asin: Some(asin.into()),
            campaign: Some("C1".into()),
            search_term: Some(term.into()),
            metrics: Metrics {
                impressions: 100.0,
                clicks: 10.0,
                spend,
                sales,
                orders,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_entity_column_yields_empty() {
        let table = MetricTable::with_rows(COLUMNS, vec![alloc("A1", "x", 5.0, 0.0, 0.0)]);
        assert!(top_n_entities_by_asin(&table, &[Column::Targeting], 5, 0.0).is_empty());
    }

    #[test]
    fn test_groups_are_summed_and_ratios_derived() {
        let table = MetricTable::with_rows(
            COLUMNS,
            vec![alloc("A1", "x", 5.0, 20.0, 1.0), alloc("A1", "x", 5.0, 20.0, 1.0)],
        );
        let top = top_n_entities_by_asin(&table, &[Column::SearchTerm, Column::Campaign], 5, 1.0);
        assert_eq!(top.len(), 1);
        let r = &top[0];
        assert_eq!(r.entity[&Column::SearchTerm].as_deref(), Some("x"));
        assert_eq!(r.entity[&Column::Campaign].as_deref(), Some("C1"));
        assert!((r.metrics.spend - 10.0).abs() < 1e-9);
        assert!((r.ratios.acos - 0.25).abs() < 1e-9);
        assert!((r.ratios.ctr - 0.1).abs() < 1e-9);
        assert!((r.ratios.cvr - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_min_spend_floor() {
        let table = MetricTable::with_rows(
            COLUMNS,
            vec![alloc("A1", "x", 0.5, 0.0, 0.0), alloc("A1", "y", 2.0, 0.0, 0.0)],
        );
        let top = top_n_entities_by_asin(&table, &[Column::SearchTerm], 5, 2.0);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].entity[&Column::SearchTerm].as_deref(), Some("y"));
    }

    #[test]
    fn test_top_n_per_asin_with_tie_breaks() {
        let table = MetricTable::with_rows(
            COLUMNS,
            vec![
                alloc("A1", "low", 3.0, 0.0, 0.0),
                alloc("A1", "tie-more-sales", 9.0, 30.0, 1.0),
                alloc("A1", "tie-more-orders", 9.0, 20.0, 3.0),
                alloc("A1", "tie-fewer-orders", 9.0, 20.0, 2.0),
                alloc("A2", "only", 1.0, 0.0, 0.0),
            ],
        );
        let top = top_n_entities_by_asin(&table, &[Column::SearchTerm], 3, 1.0);
        let terms: Vec<(String, Option<String>)> = top
            .iter()
            .map(|r| (r.asin.clone(), r.entity[&Column::SearchTerm].clone()))
            .collect();
        assert_eq!(
            terms,
            vec![
                ("A1".to_string(), Some("tie-more-sales".to_string())),
                ("A1".to_string(), Some("tie-more-orders".to_string())),
                ("A1".to_string(), Some("tie-fewer-orders".to_string())),
                ("A2".to_string(), Some("only".to_string())),
            ]
        );
    }
}
