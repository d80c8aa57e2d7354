use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::config::TableConfig;
use crate::error::Result;
use crate::io_utils::load_node_log;
use crate::model::{BlockId, MergedTable, NodeLog};

/// Loads every node log in input order; the first failure aborts the batch.
pub fn load_node_logs(paths: &[PathBuf], cfg: &TableConfig) -> Result<Vec<NodeLog>> {
    let mut logs = Vec::with_capacity(paths.len());
    for path in paths {
        logs.push(load_node_log(path, cfg)?);
    }
    for log in &logs {
        debug!("{}: {} blocks", log.source.display(), log.len());
    }
    let duplicates: usize = logs.iter().map(|l| l.duplicates).sum();
    info!(
        "loaded {} node logs ({} duplicate rows skipped)",
        logs.len(),
        duplicates
    );
    Ok(logs)
}

fn seed_table(log: &NodeLog) -> MergedTable {
    MergedTable {
        node_count: 1,
        rows: log
            .observations
            .iter()
            .map(|(id, ts)| (id.clone(), vec![*ts]))
            .collect(),
        dropped: 0,
    }
}

/// Inner join of the accumulated table with one more node log.
fn join_node(mut acc: MergedTable, log: &NodeLog) -> MergedTable {
    acc.rows.retain(|id, timestamps| match log.get(id) {
        Some(ts) => {
            timestamps.push(ts);
            true
        }
        None => false,
    });
    acc.node_count += 1;
    acc
}

/// Merges node logs into the table of blocks seen by every node.
pub fn merge_node_logs(logs: &[NodeLog]) -> MergedTable {
    let Some((first, rest)) = logs.split_first() else {
        return MergedTable::default();
    };
    let mut merged = rest.iter().fold(seed_table(first), join_node);

    let seen: BTreeSet<&BlockId> = logs.iter().flat_map(|l| l.observations.keys()).collect();
    merged.dropped = seen.len() - merged.len();
    if merged.dropped > 0 {
        info!(
            "dropped {} blocks not observed by all {} nodes",
            merged.dropped, merged.node_count
        );
    }
    if merged.is_empty() {
        warn!("no block was observed by all {} nodes", merged.node_count);
    }
    debug!("{} blocks observed by every node", merged.len());
    merged
}
