//! Cumulative ASIN ↔ campaign/ad group map for review, plus the per-ASIN
//! top campaigns view derived from it. Not an input to allocation.

use crate::top_n::{rank_within_products, EntityRanking};
use adlink_core::{Column, MetricTable, Metrics, Ratios};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignMapRow {
    pub shop: Option<String>,
    pub ad_type: Option<String>,
    pub campaign: Option<String>,
    pub ad_group: Option<String>,
    pub asin: Option<String>,
    pub metrics: Metrics,
    pub ratios: Ratios,
}

const REQUIRED_COLUMNS: [Column; 5] = [
    Column::Shop,
    Column::AdType,
    Column::Campaign,
    Column::AdGroup,
    Column::Asin,
];

type MapKey = (
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

/// Sum the daily table across dates into (shop, ad type, campaign, ad group, ASIN).
pub fn build_asin_campaign_map(daily: &MetricTable) -> Vec<CampaignMapRow> {
    if daily.is_empty() || !daily.has_columns(&REQUIRED_COLUMNS) {
        return Vec::new();
    }

    let mut groups: BTreeMap<MapKey, Metrics> = BTreeMap::new();
    for row in &daily.rows {
        let key = (
            row.shop.clone(),
            row.ad_type.clone(),
            row.campaign.clone(),
            row.ad_group.clone(),
            row.asin.clone(),
        );
        groups.entry(key).or_default().add(&row.metrics);
    }

    groups
        .into_iter()
        .map(|((shop, ad_type, campaign, ad_group, asin), metrics)| CampaignMapRow {
            shop,
            ad_type,
            campaign,
            ad_group,
            asin,
            ratios: metrics.ratios(),
            metrics,
        })
        .collect()
}

/// Roll the map up to campaign level and keep each ASIN's `top_n` campaigns
/// by spend, sales, orders.
pub fn top_campaigns_by_asin(map: &[CampaignMapRow], top_n: usize) -> Vec<EntityRanking> {
    let mut groups: BTreeMap<(Option<String>, Option<String>, String, Option<String>), Metrics> =
        BTreeMap::new();
    for row in map {
        let key = (
            row.shop.clone(),
            row.ad_type.clone(),
            row.asin.clone().unwrap_or_default(),
            row.campaign.clone(),
        );
        groups.entry(key).or_default().add(&row.metrics);
    }

    let rankings = groups
        .into_iter()
        .map(|((shop, ad_type, asin, campaign), metrics)| EntityRanking {
            shop,
            ad_type,
            asin,
            entity: BTreeMap::from([(Column::Campaign, campaign)]),
            ratios: metrics.ratios(),
            metrics,
        })
        .collect();

    rank_within_products(rankings, top_n)
}
