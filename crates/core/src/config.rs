use crate::error::{LinkageError, LinkageResult};
use crate::schema::Metric;
use serde::Deserialize;
use tracing::info;

/// Root linkage configuration. Loaded from environment variables
/// with the prefix `ADLINK__`.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkageConfig {
    #[serde(default = "default_stage")]
    pub stage: String,
    #[serde(default = "default_base_metric")]
    pub base_metric: String,
    /// Share of detail rows that may go unallocated before a warning is logged.
    #[serde(default = "default_max_drop_rate")]
    pub max_drop_rate: f64,
    #[serde(default)]
    pub top_n: TopNConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopNConfig {
    #[serde(default = "default_top_search_terms")]
    pub search_terms: usize,
    #[serde(default = "default_top_targetings")]
    pub targetings: usize,
    #[serde(default = "default_top_placements")]
    pub placements: usize,
    #[serde(default = "default_top_campaigns")]
    pub campaigns: usize,
}

/// Operating stage of a product line; sets the waste-spend threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Launch,
    Growth,
    Profit,
}

impl Stage {
    /// Unknown or blank names resolve to `Growth`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "launch" => Stage::Launch,
            "profit" => Stage::Profit,
            _ => Stage::Growth,
        }
    }

    /// Spend without orders above which a keyword counts as waste.
    pub fn waste_spend(&self) -> f64 {
        match self {
            Stage::Launch => 15.0,
            Stage::Growth => 10.0,
            Stage::Profit => 8.0,
        }
    }
}

// Default functions
fn default_stage() -> String {
    "growth".to_string()
}
fn default_base_metric() -> String {
    "spend".to_string()
}
fn default_max_drop_rate() -> f64 {
    0.2
}
fn default_top_search_terms() -> usize {
    20
}
fn default_top_targetings() -> usize {
    20
}
fn default_top_placements() -> usize {
    10
}
fn default_top_campaigns() -> usize {
    10
}

impl Default for TopNConfig {
    fn default() -> Self {
        Self {
            search_terms: default_top_search_terms(),
            targetings: default_top_targetings(),
            placements: default_top_placements(),
            campaigns: default_top_campaigns(),
        }
    }
}

impl Default for LinkageConfig {
    fn default() -> Self {
        Self {
            stage: default_stage(),
            base_metric: default_base_metric(),
            max_drop_rate: default_max_drop_rate(),
            top_n: TopNConfig::default(),
        }
    }
}

impl LinkageConfig {
    /// Load configuration from environment variables.
    pub fn load() -> LinkageResult<Self> {
        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("ADLINK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        let cfg: LinkageConfig = config.try_deserialize()?;
        cfg.validate()?;
        info!(
            stage = %cfg.stage,
            base_metric = %cfg.base_metric,
            max_drop_rate = cfg.max_drop_rate,
            "Linkage configuration loaded"
        );
        Ok(cfg)
    }

    pub fn validate(&self) -> LinkageResult<()> {
        if !(0.0..=1.0).contains(&self.max_drop_rate) {
            return Err(LinkageError::InvalidConfig(format!(
                "max_drop_rate must be within [0, 1], got {}",
                self.max_drop_rate
            )));
        }
        self.base_metric()?;
        Ok(())
    }

    pub fn stage(&self) -> Stage {
        Stage::from_name(&self.stage)
    }

    pub fn base_metric(&self) -> LinkageResult<Metric> {
        self.base_metric.parse()
    }

    /// Spend floor for top-N entity tables: a fifth of the stage's waste threshold.
    pub fn min_spend(&self) -> f64 {
        let waste = self.stage().waste_spend();
        if waste > 0.0 {
            waste / 5.0
        } else {
            1.0
        }
    }
}
