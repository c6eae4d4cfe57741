//! Grouping keys: the granularity at which weights and aggregates are computed.

use crate::error::{LinkageError, LinkageResult};
use crate::normalize::normalize_label;
use crate::schema::{Column, Dimension};
use crate::types::MetricRow;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An ordered, duplicate-free list of dimensions. Product is implied and never listed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupingKey(Vec<Dimension>);

/// The normalized values a row takes on a [`GroupingKey`], in key order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyValue(pub Vec<String>);

impl GroupingKey {
    pub fn new(dims: impl IntoIterator<Item = Dimension>) -> LinkageResult<Self> {
        let mut out: Vec<Dimension> = Vec::new();
        for d in dims {
            if !out.contains(&d) {
                out.push(d);
            }
        }
        if out.is_empty() {
            return Err(LinkageError::EmptyGroupingKey);
        }
        Ok(Self(out))
    }

    /// Unchecked constructor for fixed keys known to be non-empty and duplicate-free.
    pub fn of(dims: &[Dimension]) -> Self {
        Self(dims.to_vec())
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.0
    }

    pub fn columns(&self) -> Vec<Column> {
        self.0.iter().map(|d| d.column()).collect()
    }

    /// True when `self` is strictly finer than `other`.
    pub fn refines(&self, other: &GroupingKey) -> bool {
        self.0.len() > other.0.len() && other.0.iter().all(|d| self.0.contains(d))
    }

    /// The row's value on this key, or `None` if any key cell is missing.
    pub fn value_of(&self, row: &MetricRow) -> Option<KeyValue> {
        let mut parts = Vec::with_capacity(self.0.len());
        for dim in &self.0 {
            let raw = row.value(dim.column())?;
            let part = match dim {
                Dimension::Date => raw,
                _ => normalize_label(Some(&raw)),
            };
            parts.push(part);
        }
        Some(KeyValue(parts))
    }
}

impl fmt::Display for GroupingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|d| d.as_str()).collect();
        f.write_str(&names.join("+"))
    }
}

impl FromStr for GroupingKey {
    type Err = LinkageError;

    /// Accepts `shop+ad_type+campaign` or a comma-separated list.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let dims = s
            .split(|c: char| c == '+' || c == ',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::parse::<Dimension>)
            .collect::<LinkageResult<Vec<_>>>()?;
        GroupingKey::new(dims)
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("|"))
    }
}
