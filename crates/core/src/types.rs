use crate::schema::{Column, Metric};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Division that resolves a zero denominator to 0 instead of NaN/inf.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// The additive metric block carried by every report row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    #[serde(default)]
    pub impressions: f64,
    #[serde(default)]
    pub clicks: f64,
    #[serde(default)]
    pub spend: f64,
    #[serde(default)]
    pub sales: f64,
    #[serde(default)]
    pub orders: f64,
}

impl Metrics {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Impressions => self.impressions,
            Metric::Clicks => self.clicks,
            Metric::Spend => self.spend,
            Metric::Sales => self.sales,
            Metric::Orders => self.orders,
        }
    }

    pub fn set(&mut self, metric: Metric, value: f64) {
        match metric {
            Metric::Impressions => self.impressions = value,
            Metric::Clicks => self.clicks = value,
            Metric::Spend => self.spend = value,
            Metric::Sales => self.sales = value,
            Metric::Orders => self.orders = value,
        }
    }

    pub fn add(&mut self, other: &Metrics) {
        self.impressions += other.impressions;
        self.clicks += other.clicks;
        self.spend += other.spend;
        self.sales += other.sales;
        self.orders += other.orders;
    }

    /// Multiply the listed metrics by `weight`; unlisted metrics are copied as-is.
    pub fn scaled(&self, weight: f64, only: &[Metric]) -> Metrics {
        let mut out = *self;
        for &metric in only {
            out.set(metric, self.get(metric) * weight);
        }
        out
    }

    pub fn ratios(&self) -> Ratios {
        Ratios {
            acos: safe_div(self.spend, self.sales),
            ctr: safe_div(self.clicks, self.impressions),
            cvr: safe_div(self.orders, self.clicks),
        }
    }
}

/// Derived efficiency ratios. Always computed from summed metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Ratios {
    /// `spend / sales` (cost-per-sale ratio).
    pub acos: f64,
    /// `clicks / impressions`.
    pub ctr: f64,
    /// `orders / clicks`.
    pub cvr: f64,
}

/// One report row on the canonical column set.
///
/// A `None` cell is a missing value; whether the column exists at all is
/// recorded on the owning [`MetricTable`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    #[serde(default)]
    pub shop: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub ad_type: Option<String>,
    #[serde(default)]
    pub campaign: Option<String>,
    #[serde(default)]
    pub ad_group: Option<String>,
    #[serde(default)]
    pub asin: Option<String>,
    #[serde(default)]
    pub search_term: Option<String>,
    #[serde(default)]
    pub targeting: Option<String>,
    #[serde(default)]
    pub match_type: Option<String>,
    #[serde(default)]
    pub placement: Option<String>,
    #[serde(flatten)]
    pub metrics: Metrics,
}

impl MetricRow {
    /// Textual cell value; dates render as `YYYY-MM-DD`.
    pub fn value(&self, column: Column) -> Option<String> {
        let text = |v: &Option<String>| v.clone();
        match column {
            Column::Shop => text(&self.shop),
            Column::Date => self.date.map(|d| d.format("%Y-%m-%d").to_string()),
            Column::AdType => text(&self.ad_type),
            Column::Campaign => text(&self.campaign),
            Column::AdGroup => text(&self.ad_group),
            Column::Asin => text(&self.asin),
            Column::SearchTerm => text(&self.search_term),
            Column::Targeting => text(&self.targeting),
            Column::MatchType => text(&self.match_type),
            Column::Placement => text(&self.placement),
        }
    }
}

/// An in-memory report: a declared column set plus its rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricTable {
    pub columns: BTreeSet<Column>,
    pub rows: Vec<MetricRow>,
}

impl MetricTable {
    pub fn new(columns: impl IntoIterator<Item = Column>) -> Self {
        Self {
            columns: columns.into_iter().collect(),
            rows: Vec::new(),
        }
    }

    pub fn with_rows(columns: impl IntoIterator<Item = Column>, rows: Vec<MetricRow>) -> Self {
        Self {
            columns: columns.into_iter().collect(),
            rows,
        }
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    pub fn has_columns(&self, columns: &[Column]) -> bool {
        columns.iter().all(|c| self.columns.contains(c))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column-wise sum over every row.
    pub fn totals(&self) -> Metrics {
        let mut total = Metrics::default();
        for row in &self.rows {
            total.add(&row.metrics);
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_div_zero_denominator() {
        assert_eq!(safe_div(5.0, 0.0), 0.0);
        assert!((safe_div(1.0, 4.0) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_scaled_only_touches_listed_metrics() {
        let m = Metrics {
            impressions: 100.0,
            clicks: 10.0,
            spend: 50.0,
            sales: 200.0,
            orders: 4.0,
        };
        let s = m.scaled(0.5, &[Metric::Spend, Metric::Clicks]);
        assert_eq!(s.spend, 25.0);
        assert_eq!(s.clicks, 5.0);
        assert_eq!(s.impressions, 100.0);
        assert_eq!(s.orders, 4.0);
    }

    #[test]
    fn test_ratios() {
        let m = Metrics {
            impressions: 1000.0,
            clicks: 20.0,
            spend: 30.0,
            sales: 120.0,
            orders: 2.0,
        };
        let r = m.ratios();
        assert!((r.acos - 0.25).abs() < 1e-12);
        assert!((r.ctr - 0.02).abs() < 1e-12);
        assert!((r.cvr - 0.1).abs() < 1e-12);

        let zero = Metrics::default().ratios();
        assert_eq!(zero, Ratios::default());
    }

    #[test]
    fn test_row_value_renders_date() {
        let row = MetricRow {
            date: NaiveDate::from_ymd_opt(2024, 1, 5),
            campaign: Some("C1".into()),
            ..Default::default()
        };
        assert_eq!(row.value(Column::Date).as_deref(), Some("2024-01-05"));
        assert_eq!(row.value(Column::Campaign).as_deref(), Some("C1"));
        assert_eq!(row.value(Column::AdGroup), None);
    }

    #[test]
    fn test_row_deserializes_with_missing_metrics() {
        let row: MetricRow =
            serde_json::from_str(r#"{"shop":"S1","campaign":"C1","spend":12.5}"#).unwrap();
        assert_eq!(row.metrics.spend, 12.5);
        assert_eq!(row.metrics.clicks, 0.0);
        assert_eq!(row.asin, None);
    }

    #[test]
    fn test_table_column_checks() {
        let t = MetricTable::new([Column::Shop, Column::Campaign]);
        assert!(t.has_columns(&[Column::Shop, Column::Campaign]));
        assert!(!t.has_column(Column::AdGroup));
        assert!(t.is_empty());
    }
}
