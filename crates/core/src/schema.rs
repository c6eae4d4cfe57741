//! Canonical column names shared by every report the linkage layer touches.

use crate::error::LinkageError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every column a report row can carry besides its metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Shop,
    Date,
    AdType,
    Campaign,
    AdGroup,
    Asin,
    SearchTerm,
    Targeting,
    MatchType,
    Placement,
}

impl Column {
    pub const ALL: [Column; 10] = [
        Column::Shop,
        Column::Date,
        Column::AdType,
        Column::Campaign,
        Column::AdGroup,
        Column::Asin,
        Column::SearchTerm,
        Column::Targeting,
        Column::MatchType,
        Column::Placement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Shop => "shop",
            Column::Date => "date",
            Column::AdType => "ad_type",
            Column::Campaign => "campaign",
            Column::AdGroup => "ad_group",
            Column::Asin => "asin",
            Column::SearchTerm => "search_term",
            Column::Targeting => "targeting",
            Column::MatchType => "match_type",
            Column::Placement => "placement",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Column {
    type Err = LinkageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Column::ALL
            .into_iter()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| LinkageError::UnknownColumn(s.to_string()))
    }
}

/// The join-capable subset of [`Column`] that grouping keys are built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Shop,
    AdType,
    Date,
    Campaign,
    AdGroup,
}

impl Dimension {
    pub fn column(&self) -> Column {
        match self {
            Dimension::Shop => Column::Shop,
            Dimension::AdType => Column::AdType,
            Dimension::Date => Column::Date,
            Dimension::Campaign => Column::Campaign,
            Dimension::AdGroup => Column::AdGroup,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.column().as_str()
    }
}

impl From<Dimension> for Column {
    fn from(d: Dimension) -> Self {
        d.column()
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = LinkageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<Column>()? {
            Column::Shop => Ok(Dimension::Shop),
            Column::AdType => Ok(Dimension::AdType),
            Column::Date => Ok(Dimension::Date),
            Column::Campaign => Ok(Dimension::Campaign),
            Column::AdGroup => Ok(Dimension::AdGroup),
            _ => Err(LinkageError::UnknownColumn(s.to_string())),
        }
    }
}

/// Additive performance metrics reported on every advertising row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Impressions,
    Clicks,
    Spend,
    Sales,
    Orders,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Impressions,
        Metric::Clicks,
        Metric::Spend,
        Metric::Sales,
        Metric::Orders,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Impressions => "impressions",
            Metric::Clicks => "clicks",
            Metric::Spend => "spend",
            Metric::Sales => "sales",
            Metric::Orders => "orders",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = LinkageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Metric::ALL
            .into_iter()
            .find(|m| m.as_str() == needle)
            .ok_or_else(|| LinkageError::UnknownMetric(s.to_string()))
    }
}

/// Which export a table came from. Only used to label audits and summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    AdvertisedProduct,
    SearchTerm,
    Targeting,
    Placement,
    Campaign,
    AdGroup,
    PurchasedProduct,
    MatchedTarget,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::AdvertisedProduct => "advertised_product",
            ReportKind::SearchTerm => "search_term",
            ReportKind::Targeting => "targeting",
            ReportKind::Placement => "placement",
            ReportKind::Campaign => "campaign",
            ReportKind::AdGroup => "ad_group",
            ReportKind::PurchasedProduct => "purchased_product",
            ReportKind::MatchedTarget => "matched_target",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
