//! The fallback chain: weight tables ordered from the finest grouping key
//! to the coarsest, tried in turn by the allocation engine.

use crate::weights::{build_weight_table, WeightTable};
use adlink_core::{Column, Dimension, GroupingKey, Metric, MetricTable};
use tracing::debug;

/// A join key paired with the weight table it is resolved against.
#[derive(Debug, Clone)]
pub struct FallbackLevel {
    pub key: GroupingKey,
    pub weights: WeightTable,
}

/// Built once per allocation run and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct FallbackChain {
    levels: Vec<FallbackLevel>,
}

impl FallbackChain {
    /// Chain over caller-supplied levels, kept in the given order.
    pub fn new(levels: Vec<FallbackLevel>) -> Self {
        Self { levels }
    }

    pub fn levels(&self) -> &[FallbackLevel] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// The four fallback keys, finest first. Without ad-group granularity the
/// ad-group levels degrade to their campaign-only counterparts.
pub fn fallback_keys(has_ad_group: bool) -> [GroupingKey; 4] {
    use Dimension::*;

    let lvl1 = if has_ad_group {
        GroupingKey::of(&[Shop, AdType, Date, Campaign, AdGroup])
    } else {
        GroupingKey::of(&[Shop, AdType, Date, Campaign])
    };
    let lvl2 = GroupingKey::of(&[Shop, AdType, Date, Campaign]);
    let lvl3 = if has_ad_group {
        GroupingKey::of(&[Shop, AdType, Campaign, AdGroup])
    } else {
        GroupingKey::of(&[Shop, AdType, Campaign])
    };
    let lvl4 = GroupingKey::of(&[Shop, AdType, Campaign]);
    [lvl1, lvl2, lvl3, lvl4]
}

/// Default chain with spend weights.
pub fn build_fallback_chain(daily: &MetricTable) -> FallbackChain {
    build_fallback_chain_with(daily, Metric::Spend)
}

/// Levels whose weight table comes out empty are left out of the chain.
pub fn build_fallback_chain_with(daily: &MetricTable, base_metric: Metric) -> FallbackChain {
    let has_ad_group = !daily.is_empty() && daily.has_column(Column::AdGroup);
    let mut levels = Vec::with_capacity(4);

    for key in fallback_keys(has_ad_group) {
        let weights = build_weight_table(daily, &key, base_metric);
        if weights.is_empty() {
            debug!(key = %key, "weight table empty, level omitted");
            continue;
        }
        debug!(key = %key, buckets = weights.bucket_count(), entries = weights.len(), "fallback level built");
        levels.push(FallbackLevel { key, weights });
    }

    FallbackChain { levels }
}
