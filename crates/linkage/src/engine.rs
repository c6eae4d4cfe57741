//! Allocation engine: spreads product-less detail rows (search terms,
//! targetings, placements) across ASINs by walking the fallback chain.
//!
//! Rows are joined against each level in order. A row that finds its bucket
//! fans out into one output row per ASIN in that bucket, each carrying the
//! row's metrics scaled by the ASIN's weight. Rows that miss are carried to
//! the next, coarser level; rows that miss every level are dropped and
//! counted in the [`AllocationAudit`].

use crate::fallback::{FallbackChain, FallbackLevel};
use adlink_core::normalize::normalize_asin;
use adlink_core::{Column, GroupingKey, Metric, MetricRow, MetricTable, ReportKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

// ─── Audit ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelStatus {
    /// The level was joined against the remaining rows.
    Applied,
    /// The detail table (or the level's weights) lacks a join column.
    SkippedMissingColumns,
    /// The level's weight table has no entries.
    SkippedEmptyWeights,
    /// Every row had already been allocated by a finer level.
    NotReached,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelAudit {
    pub key: String,
    pub status: LevelStatus,
    /// Detail rows allocated at this level.
    pub matched_rows: usize,
    /// Output rows produced (one per matched ASIN).
    pub produced_rows: usize,
}

impl LevelAudit {
    fn new(key: &GroupingKey, status: LevelStatus) -> Self {
        Self {
            key: key.to_string(),
            status,
            matched_rows: 0,
            produced_rows: 0,
        }
    }
}

/// Row accounting for one allocation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationAudit {
    pub report: ReportKind,
    pub input_rows: usize,
    pub levels: Vec<LevelAudit>,
    /// Detail rows that matched no level.
    pub dropped_rows: usize,
    pub output_rows: usize,
}

impl AllocationAudit {
    fn new(report: ReportKind, input_rows: usize) -> Self {
        Self {
            report,
            input_rows,
            levels: Vec::new(),
            dropped_rows: 0,
            output_rows: 0,
        }
    }

    pub fn allocated_rows(&self) -> usize {
        self.input_rows - self.dropped_rows
    }

    /// Share of input rows that could not be allocated (0 for empty input).
    pub fn drop_rate(&self) -> f64 {
        if self.input_rows == 0 {
            0.0
        } else {
            self.dropped_rows as f64 / self.input_rows as f64
        }
    }
}

/// Product-attributed rows plus the audit of how they were produced.
#[derive(Debug, Clone)]
pub struct Allocation {
    pub table: MetricTable,
    pub audit: AllocationAudit,
}

// ─── Engine ─────────────────────────────────────────────────────────────────

pub struct AllocationEngine<'a> {
    chain: &'a FallbackChain,
    metrics: Vec<Metric>,
    max_drop_rate: f64,
}

impl<'a> AllocationEngine<'a> {
    pub fn new(chain: &'a FallbackChain) -> Self {
        Self {
            chain,
            metrics: Metric::ALL.to_vec(),
            max_drop_rate: 0.2,
        }
    }

    /// Restrict scaling to these metrics; the rest are copied unscaled.
    pub fn with_metrics(mut self, metrics: &[Metric]) -> Self {
        self.metrics = metrics.to_vec();
        self
    }

    /// Drop rate above which a completed pass logs a warning.
    pub fn with_max_drop_rate(mut self, rate: f64) -> Self {
        self.max_drop_rate = rate;
        self
    }

    pub fn allocate(&self, report: ReportKind, detail: &MetricTable) -> Allocation {
        let mut audit = AllocationAudit::new(report, detail.len());
        if detail.is_empty() {
            return Allocation {
                table: MetricTable::default(),
                audit,
            };
        }

        let mut remaining: Vec<&MetricRow> = detail.rows.iter().collect();
        let mut output: Vec<MetricRow> = Vec::new();

        for level in self.chain.levels() {
            let level_audit = if remaining.is_empty() {
                LevelAudit::new(&level.key, LevelStatus::NotReached)
            } else if !detail.has_columns(&level.key.columns()) || level.weights.key() != &level.key {
                LevelAudit::new(&level.key, LevelStatus::SkippedMissingColumns)
            } else if level.weights.is_empty() {
                LevelAudit::new(&level.key, LevelStatus::SkippedEmptyWeights)
            } else {
                let (level_audit, unmatched) = self.apply_level(level, remaining, &mut output);
                remaining = unmatched;
                level_audit
            };
            debug!(
                report = %report,
                key = %level_audit.key,
                status = ?level_audit.status,
                matched = level_audit.matched_rows,
                produced = level_audit.produced_rows,
                remaining = remaining.len(),
                "fallback level processed"
            );
            audit.levels.push(level_audit);
        }

        audit.dropped_rows = remaining.len();

        for row in &mut output {
            row.asin = Some(normalize_asin(row.asin.as_deref()));
        }
        output.retain(|row| row.asin.as_deref().is_some_and(|a| !a.is_empty()));
        audit.output_rows = output.len();

        let drop_rate = audit.drop_rate();
        info!(
            report = %report,
            input_rows = audit.input_rows,
            output_rows = audit.output_rows,
            dropped_rows = audit.dropped_rows,
            drop_rate,
            "allocation complete"
        );
        if drop_rate > self.max_drop_rate {
            warn!(
                report = %report,
                drop_rate,
                threshold = self.max_drop_rate,
                "unallocated row share above threshold"
            );
        }

        let mut columns = detail.columns.clone();
        columns.insert(Column::Asin);
        Allocation {
            table: MetricTable::with_rows(columns, output),
            audit,
        }
    }

    /// Join `remaining` against one level; returns its audit and the rows it missed.
    fn apply_level<'r>(
        &self,
        level: &FallbackLevel,
        remaining: Vec<&'r MetricRow>,
        output: &mut Vec<MetricRow>,
    ) -> (LevelAudit, Vec<&'r MetricRow>) {
        let mut audit = LevelAudit::new(&level.key, LevelStatus::Applied);
        let mut unmatched = Vec::new();

        for row in remaining {
            let products = level
                .key
                .value_of(row)
                .and_then(|value| level.weights.lookup(&value))
                .filter(|products| !products.is_empty());
            let Some(products) = products else {
                unmatched.push(row);
                continue;
            };
            audit.matched_rows += 1;
            for product in products {
                output.push(MetricRow {
                    asin: Some(product.asin.clone()),
                    metrics: row.metrics.scaled(product.weight, &self.metrics),
                    ..row.clone()
                });
                audit.produced_rows += 1;
            }
        }

        (audit, unmatched)
    }
}
