use crate::config::{DISSEMINATION_COLUMN, LATENCY_COLUMN};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub String);

impl From<&str> for BlockId {
    fn from(s: &str) -> Self {
        BlockId(s.to_string())
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockObservation {
    pub id: BlockId,
    pub timestamp: i64,
}

/// One node's observations, at most one per block.
#[derive(Debug, Default, Clone)]
pub struct NodeLog {
    pub source: PathBuf,
    pub observations: BTreeMap<BlockId, i64>,
    pub duplicates: usize,
}

impl NodeLog {
    pub fn new(source: PathBuf) -> Self {
        Self {
            source,
            ..Self::default()
        }
    }

    /// Records an observation unless the block was already seen; the first
    /// row in file order wins.
    pub fn insert(&mut self, obs: BlockObservation) -> bool {
        match self.observations.entry(obs.id) {
            std::collections::btree_map::Entry::Occupied(_) => {
                self.duplicates += 1;
                false
            }
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(obs.timestamp);
                true
            }
        }
    }

    pub fn get(&self, id: &BlockId) -> Option<i64> {
        self.observations.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// Timestamps of the blocks seen by every merged node, in node-input order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MergedTable {
    pub node_count: usize,
    pub rows: BTreeMap<BlockId, Vec<i64>>,
    pub dropped: usize,
}

impl MergedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Per-block mean across nodes, truncated toward zero.
    pub fn truncated_means(&self) -> BTreeMap<BlockId, i64> {
        self.rows
            .iter()
            .filter(|(_, ts)| !ts.is_empty())
            .map(|(id, ts)| {
                let sum: i128 = ts.iter().map(|t| *t as i128).sum();
                (id.clone(), (sum / ts.len() as i128) as i64)
            })
            .collect()
    }
}

/// A derived scalar per block.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MetricSeries {
    pub name: String,
    pub rows: BTreeMap<BlockId, i64>,
}

impl MetricSeries {
    pub fn values(&self) -> Vec<i64> {
        self.rows.values().copied().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalizationRow {
    pub latency: i64,
    pub mean_finalization: i64,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct FinalizationTable {
    pub rows: BTreeMap<BlockId, FinalizationRow>,
    pub arrived_only: usize,
    pub finalized_only: usize,
}

impl FinalizationTable {
    pub fn finalization_times(&self) -> Vec<i64> {
        self.rows.values().map(|r| r.mean_finalization).collect()
    }

    pub fn latencies(&self) -> Vec<i64> {
        self.rows.values().map(|r| r.latency).collect()
    }
}

/// Metric column summarized across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Dissemination,
    Latency,
}

impl MetricKind {
    pub fn column(self) -> &'static str {
        match self {
            MetricKind::Dissemination => DISSEMINATION_COLUMN,
            MetricKind::Latency => LATENCY_COLUMN,
        }
    }
}

/// One line of a run index: a labelled metric file.
#[derive(Debug, Clone, PartialEq)]
pub struct RunEntry {
    pub label: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub label: String,
    pub metric: String,
    pub count: usize,
    pub min: f64,
    pub avg: f64,
    pub p10: f64,
    pub median: f64,
    pub p90: f64,
    pub p99: f64,
    pub max: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throughput: Option<f64>,
}
