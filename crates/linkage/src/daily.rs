//! Daily aggregation of the advertised-product report, one row per
//! (shop, date, ad type, campaign, ad group, ASIN) with summed metrics.

use adlink_core::normalize::{normalize_asin, normalize_label};
use adlink_core::{Column, MetricRow, MetricTable, Metrics};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

/// Columns the advertised-product report must declare to be aggregated.
pub const REQUIRED_COLUMNS: [Column; 6] = [
    Column::Shop,
    Column::Date,
    Column::AdType,
    Column::Campaign,
    Column::AdGroup,
    Column::Asin,
];

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct DailyKey {
    shop: Option<String>,
    date: Option<NaiveDate>,
    ad_type: Option<String>,
    campaign: String,
    ad_group: String,
    asin: String,
}

/// Collapse the advertised-product report to unique daily tuples.
///
/// Returns an empty table when the report is empty or lacks a required
/// column. Rows whose normalized ASIN or campaign is blank cannot be
/// attributed and are skipped.
pub fn build_ad_product_daily(report: &MetricTable) -> MetricTable {
    if report.is_empty() || !report.has_columns(&REQUIRED_COLUMNS) {
        debug!(
            rows = report.len(),
            "advertised product report empty or missing columns, nothing to aggregate"
        );
        return MetricTable::default();
    }

    let mut groups: BTreeMap<DailyKey, Metrics> = BTreeMap::new();
    let mut skipped = 0usize;

    for row in &report.rows {
        let asin = normalize_asin(row.asin.as_deref());
        let campaign = normalize_label(row.campaign.as_deref());
        if asin.is_empty() || campaign.is_empty() {
            skipped += 1;
            continue;
        }
        let key = DailyKey {
            shop: row.shop.clone(),
            date: row.date,
            ad_type: row.ad_type.clone(),
            campaign,
            ad_group: normalize_label(row.ad_group.as_deref()),
            asin,
        };
        groups.entry(key).or_default().add(&row.metrics);
    }

    let rows: Vec<MetricRow> = groups
        .into_iter()
        .map(|(k, metrics)| MetricRow {
            shop: k.shop,
            date: k.date,
            ad_type: k.ad_type,
            campaign: Some(k.campaign),
            ad_group: Some(k.ad_group),
            asin: Some(k.asin),
            metrics,
            ..Default::default()
        })
        .collect();

    debug!(
        input_rows = report.len(),
        skipped,
        output_rows = rows.len(),
        "aggregated advertised product report"
    );

    MetricTable::with_rows(REQUIRED_COLUMNS, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ap_row(date: u32, campaign: &str, ad_group: &str, asin: &str, spend: f64) -> MetricRow {
        MetricRow {
            shop: Some("S1".into()),
            date: NaiveDate::from_ymd_opt(2024, 1, date),
            ad_type: Some("SP".into()),
            campaign: Some(campaign.into()),
            ad_group: Some(ad_group.into()),
            asin: Some(asin.into()),
            metrics: Metrics {
                impressions: spend * 10.0,
                clicks: spend / 10.0,
                spend,
                sales: spend * 3.0,
                orders: 1.0,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_column_yields_empty() {
        let report = MetricTable::with_rows(
            [Column::Shop, Column::Date, Column::AdType, Column::Campaign, Column::Asin],
            vec![ap_row(1, "C1", "G1", "A1", 10.0)],
        );
        assert!(build_ad_product_daily(&report).is_empty());
        assert!(build_ad_product_daily(&MetricTable::new(REQUIRED_COLUMNS)).is_empty());
    }

    #[test]
    fn test_duplicate_tuples_are_summed() {
        let report = MetricTable::with_rows(
            REQUIRED_COLUMNS,
            vec![
                ap_row(1, "C1", "G1", "a1", 10.0),
                ap_row(1, " C1 ", "G1", "A1 ", 5.0),
                ap_row(2, "C1", "G1", "A1", 7.0),
            ],
        );
        let daily = build_ad_product_daily(&report);
        assert_eq!(daily.len(), 2);
        let first = &daily.rows[0];
        assert_eq!(first.asin.as_deref(), Some("A1"));
        assert_eq!(first.campaign.as_deref(), Some("C1"));
        assert!((first.metrics.spend - 15.0).abs() < 1e-9);
        assert!((first.metrics.orders - 2.0).abs() < 1e-9);
        assert!((daily.totals().spend - 22.0).abs() < 1e-9);
    }

    #[test]
    fn test_unattributable_rows_are_dropped() {
        let report = MetricTable::with_rows(
            REQUIRED_COLUMNS,
            vec![
                ap_row(1, "C1", "G1", "nan", 10.0),
                ap_row(1, "  ", "G1", "A1", 10.0),
                ap_row(1, "C1", "", "A2", 4.0),
            ],
        );
        let daily = build_ad_product_daily(&report);
        assert_eq!(daily.len(), 1);
        assert_eq!(daily.rows[0].asin.as_deref(), Some("A2"));
        assert_eq!(daily.rows[0].ad_group.as_deref(), Some(""));
    }
}
