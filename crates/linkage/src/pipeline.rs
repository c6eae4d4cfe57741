//! One linkage pass: advertised-product report in, ASIN-level campaign map
//! and top entity tables out.

use crate::campaign_map::{build_asin_campaign_map, top_campaigns_by_asin, CampaignMapRow};
use crate::daily::build_ad_product_daily;
use crate::engine::{AllocationAudit, AllocationEngine};
use crate::fallback::{build_fallback_chain_with, FallbackChain};
use crate::top_n::{top_n_entities_by_asin, EntityRanking};
use adlink_core::{Column, LinkageConfig, LinkageResult, Metric, MetricTable, ReportKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

const SEARCH_TERM_ENTITY: [Column; 3] = [Column::SearchTerm, Column::MatchType, Column::Campaign];
const TARGETING_ENTITY: [Column; 3] = [Column::Targeting, Column::MatchType, Column::Campaign];
const PLACEMENT_ENTITY: [Column; 2] = [Column::Placement, Column::Campaign];

/// Product-less detail reports to attribute. Absent reports count as empty.
#[derive(Debug, Clone, Default)]
pub struct DetailReports {
    pub search_term: Option<MetricTable>,
    pub targeting: Option<MetricTable>,
    pub placement: Option<MetricTable>,
}

/// Compact record of a pass, small enough to embed in a metrics bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkageSummary {
    pub run_id: Uuid,
    pub has_ad_product: bool,
    pub campaign_map_rows: usize,
    pub top_campaigns_rows: usize,
    pub top_search_terms_rows: usize,
    pub top_targetings_rows: usize,
    pub top_placements_rows: usize,
    pub allocations: Vec<AllocationAudit>,
    pub generated_at: DateTime<Utc>,
}

impl LinkageSummary {
    pub fn to_json(&self) -> LinkageResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Clone)]
pub struct LinkageOutput {
    pub campaign_map: Vec<CampaignMapRow>,
    pub top_campaigns: Vec<EntityRanking>,
    pub top_search_terms: Vec<EntityRanking>,
    pub top_targetings: Vec<EntityRanking>,
    pub top_placements: Vec<EntityRanking>,
    pub summary: LinkageSummary,
}

pub struct AdLinkage {
    config: LinkageConfig,
    base_metric: Metric,
}

impl AdLinkage {
    pub fn new(config: LinkageConfig) -> LinkageResult<Self> {
        config.validate()?;
        let base_metric = config.base_metric()?;
        Ok(Self {
            config,
            base_metric,
        })
    }

    pub fn config(&self) -> &LinkageConfig {
        &self.config
    }

    /// Run the full pass. Never fails: missing inputs produce empty tables.
    pub fn run(&self, advertised_product: &MetricTable, details: &DetailReports) -> LinkageOutput {
        let run_id = Uuid::new_v4();
        let daily = build_ad_product_daily(advertised_product);

        let mut output = LinkageOutput {
            campaign_map: Vec::new(),
            top_campaigns: Vec::new(),
            top_search_terms: Vec::new(),
            top_targetings: Vec::new(),
            top_placements: Vec::new(),
            summary: LinkageSummary {
                run_id,
                has_ad_product: !advertised_product.is_empty(),
                campaign_map_rows: 0,
                top_campaigns_rows: 0,
                top_search_terms_rows: 0,
                top_targetings_rows: 0,
                top_placements_rows: 0,
                allocations: Vec::new(),
                generated_at: Utc::now(),
            },
        };

        if daily.is_empty() {
            info!(run_id = %run_id, "no attributable advertised product rows, linkage skipped");
            return output;
        }

        output.campaign_map = build_asin_campaign_map(&daily);
        output.top_campaigns = top_campaigns_by_asin(&output.campaign_map, self.config.top_n.campaigns);

        let chain = build_fallback_chain_with(&daily, self.base_metric);
        let min_spend = self.config.min_spend();
        let top_n = &self.config.top_n;

        let (top, audit) = self.attribute(
            &chain,
            ReportKind::SearchTerm,
            details.search_term.as_ref(),
            &SEARCH_TERM_ENTITY,
            top_n.search_terms,
            min_spend,
        );
        output.top_search_terms = top;
        output.summary.allocations.push(audit);

        let (top, audit) = self.attribute(
            &chain,
            ReportKind::Targeting,
            details.targeting.as_ref(),
            &TARGETING_ENTITY,
            top_n.targetings,
            min_spend,
        );
        output.top_targetings = top;
        output.summary.allocations.push(audit);

        let (top, audit) = self.attribute(
            &chain,
            ReportKind::Placement,
            details.placement.as_ref(),
            &PLACEMENT_ENTITY,
            top_n.placements,
            min_spend,
        );
        output.top_placements = top;
        output.summary.allocations.push(audit);

        let summary = &mut output.summary;
        summary.campaign_map_rows = output.campaign_map.len();
        summary.top_campaigns_rows = output.top_campaigns.len();
        summary.top_search_terms_rows = output.top_search_terms.len();
        summary.top_targetings_rows = output.top_targetings.len();
        summary.top_placements_rows = output.top_placements.len();

        info!(
            run_id = %run_id,
            daily_rows = daily.len(),
            fallback_levels = chain.len(),
            campaign_map_rows = summary.campaign_map_rows,
            top_search_terms_rows = summary.top_search_terms_rows,
            top_targetings_rows = summary.top_targetings_rows,
            top_placements_rows = summary.top_placements_rows,
            "linkage pass complete"
        );

        output
    }

    fn attribute(
        &self,
        chain: &FallbackChain,
        report: ReportKind,
        detail: Option<&MetricTable>,
        entity_cols: &[Column],
        top_n: usize,
        min_spend: f64,
    ) -> (Vec<EntityRanking>, AllocationAudit) {
        let empty = MetricTable::default();
        let detail = detail.unwrap_or(&empty);
        let allocation = AllocationEngine::new(chain)
            .with_max_drop_rate(self.config.max_drop_rate)
            .allocate(report, detail);
        let top = top_n_entities_by_asin(&allocation.table, entity_cols, top_n, min_spend);
        (top, allocation.audit)
    }
}
