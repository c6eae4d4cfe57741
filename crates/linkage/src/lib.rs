//! Product-level ad linkage: attributes campaign, search-term, targeting and
//! placement metrics onto ASINs using spend weights from the advertised
//! product report.

pub mod campaign_map;
pub mod daily;
pub mod engine;
pub mod fallback;
pub mod pipeline;
pub mod top_n;
pub mod weights;

pub use campaign_map::{build_asin_campaign_map, top_campaigns_by_asin, CampaignMapRow};
pub use daily::build_ad_product_daily;
pub use engine::{Allocation, AllocationAudit, AllocationEngine, LevelAudit, LevelStatus};
pub use fallback::{build_fallback_chain, build_fallback_chain_with, fallback_keys, FallbackChain, FallbackLevel};
pub use pipeline::{AdLinkage, DetailReports, LinkageOutput, LinkageSummary};
pub use top_n::{top_n_entities_by_asin, EntityRanking};
pub use weights::{build_weight_table, ProductWeight, WeightEntry, WeightTable};
