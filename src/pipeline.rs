use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

use crate::analyzer::{dissemination_times, finalization_latency, throughput, throughput_batch};
use crate::config::{TableConfig, FINALIZATION_TIME_COLUMN};
use crate::error::Result;
use crate::io_utils::{
    read_index_file, read_metric_column, read_run_index, write_finalization_table,
    write_metric_series,
};
use crate::model::{FinalizationTable, MergedTable, MetricKind, MetricSeries, RunSummary};
use crate::node_processing::{load_node_logs, merge_node_logs};
use crate::stats::statistics_from_ints;

fn merged_from_index(index: &Path, cfg: &TableConfig) -> Result<MergedTable> {
    let t_load = Instant::now();
    let files = read_index_file(index)?;
    let logs = load_node_logs(&files, cfg)?;
    debug!("load {}: {:.3}s", index.display(), t_load.elapsed().as_secs_f64());
    Ok(merge_node_logs(&logs))
}

pub fn compute_dissemination(index: &Path, cfg: &TableConfig) -> Result<MetricSeries> {
    let merged = merged_from_index(index, cfg)?;
    Ok(dissemination_times(&merged))
}

/// Computes the dissemination series of one run and writes it to `output`.
/// Nothing is written when any input fails.
pub fn run_dissemination(index: &Path, output: &Path, cfg: &TableConfig) -> Result<MetricSeries> {
    let series = compute_dissemination(index, cfg)?;
    write_metric_series(output, cfg, &series)?;
    info!("{} dissemination times written to {}", series.rows.len(), output.display());
    Ok(series)
}

pub fn compute_finalization(
    unfinalized_index: &Path,
    finalized_index: &Path,
    cfg: &TableConfig,
) -> Result<FinalizationTable> {
    let arrived = merged_from_index(unfinalized_index, cfg)?;
    let finalized = merged_from_index(finalized_index, cfg)?;
    Ok(finalization_latency(&arrived, &finalized))
}

pub fn run_finalization(
    unfinalized_index: &Path,
    finalized_index: &Path,
    output: &Path,
    cfg: &TableConfig,
) -> Result<FinalizationTable> {
    let table = compute_finalization(unfinalized_index, finalized_index, cfg)?;
    write_finalization_table(output, cfg, &table)?;
    info!("{} finalization latencies written to {}", table.rows.len(), output.display());
    Ok(table)
}

/// Throughput of every run listed in a run index.
pub fn run_throughput(runs_index: &Path, cfg: &TableConfig) -> Result<Vec<(String, f64)>> {
    let runs = read_run_index(runs_index, cfg)?;
    let mut series = Vec::with_capacity(runs.len());
    for run in &runs {
        let times = read_metric_column(&run.path, cfg, FINALIZATION_TIME_COLUMN)?;
        series.push((run.label.clone(), times.values()));
    }
    throughput_batch(&series)
}

/// Descriptive statistics of one metric for every run listed in a run index.
pub fn run_summary(
    runs_index: &Path,
    metric: MetricKind,
    cfg: &TableConfig,
) -> Result<Vec<RunSummary>> {
    let runs = read_run_index(runs_index, cfg)?;
    let mut summaries = Vec::with_capacity(runs.len());
    for run in &runs {
        let values = read_metric_column(&run.path, cfg, metric.column())?.values();
        let throughput = match metric {
            MetricKind::Latency => {
                let times = read_metric_column(&run.path, cfg, FINALIZATION_TIME_COLUMN)?;
                Some(throughput(&run.label, &times.values())?)
            }
            MetricKind::Dissemination => None,
        };
        let s = statistics_from_ints(&values);
        summaries.push(RunSummary {
            label: run.label.clone(),
            metric: metric.column().to_string(),
            count: s.cnt,
            min: s.min,
            avg: s.avg,
            p10: s.p10,
            median: s.p50,
            p90: s.p90,
            p99: s.p99,
            max: s.max,
            throughput,
        });
    }
    Ok(summaries)
}
