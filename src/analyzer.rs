use tracing::{debug, info};

use crate::config::{DISSEMINATION_COLUMN, MS_PER_SECOND};
use crate::error::{MetricsError, Result};
use crate::model::{FinalizationRow, FinalizationTable, MergedTable, MetricSeries};

/// Time from the first to the last node observing each block.
pub fn dissemination_times(merged: &MergedTable) -> MetricSeries {
    let rows = merged
        .rows
        .iter()
        .filter_map(|(id, ts)| {
            let first = ts.iter().min()?;
            let last = ts.iter().max()?;
            Some((id.clone(), last - first))
        })
        .collect();
    MetricSeries {
        name: DISSEMINATION_COLUMN.to_string(),
        rows,
    }
}

/// Mean finalization minus mean arrival per block, for blocks present in
/// both tables. Means are truncated before subtracting.
pub fn finalization_latency(arrived: &MergedTable, finalized: &MergedTable) -> FinalizationTable {
    let arrival_means = arrived.truncated_means();
    let finalization_means = finalized.truncated_means();

    let mut table = FinalizationTable::default();
    for (id, fin) in &finalization_means {
        match arrival_means.get(id) {
            Some(arr) => {
                table.rows.insert(
                    id.clone(),
                    FinalizationRow {
                        latency: fin - arr,
                        mean_finalization: *fin,
                    },
                );
            }
            None => table.finalized_only += 1,
        }
    }
    table.arrived_only = arrival_means
        .keys()
        .filter(|id| !finalization_means.contains_key(*id))
        .count();

    info!(
        "{} blocks with latency ({} arrived but not finalized, {} finalized but not arrived)",
        table.rows.len(),
        table.arrived_only,
        table.finalized_only
    );
    table
}

/// Blocks per second over a series of finalization timestamps in ms.
pub fn throughput(label: &str, finalization_times: &[i64]) -> Result<f64> {
    let degenerate = || MetricsError::DegenerateSeries {
        label: label.to_string(),
        count: finalization_times.len(),
        span: 0,
    };
    let (Some(min), Some(max)) = (
        finalization_times.iter().min(),
        finalization_times.iter().max(),
    ) else {
        return Err(degenerate());
    };
    let span = i128::from(*max) - i128::from(*min);
    if span == 0 {
        return Err(degenerate());
    }
    let tps = finalization_times.len() as f64 * MS_PER_SECOND / span as f64;
    debug!("{}: {} blocks over {} ms", label, finalization_times.len(), span);
    Ok(tps)
}

/// Throughput of every series; one degenerate series fails the batch.
pub fn throughput_batch(series: &[(String, Vec<i64>)]) -> Result<Vec<(String, f64)>> {
    series
        .iter()
        .map(|(label, times)| Ok((label.clone(), throughput(label, times)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BlockId;
    use std::collections::BTreeMap;

    fn table(rows: Vec<(&str, Vec<i64>)>) -> MergedTable {
        let rows: BTreeMap<BlockId, Vec<i64>> = rows
            .into_iter()
            .map(|(id, ts)| (BlockId::from(id), ts))
            .collect();
        MergedTable {
            node_count: rows.values().next().map(|v| v.len()).unwrap_or(0),
            rows,
            dropped: 0,
        }
    }

    #[test]
    fn test_dissemination_scenario() {
        let merged = table(vec![("A", vec![10, 12, 15]), ("B", vec![20, 50, 20])]);
        let series = dissemination_times(&merged);
        assert_eq!(series.rows[&BlockId::from("A")], 5);
        assert_eq!(series.rows[&BlockId::from("B")], 30);
        assert_eq!(series.name, DISSEMINATION_COLUMN);
    }

    #[test]
    fn test_dissemination_zero_only_when_all_agree() {
        let merged = table(vec![("same", vec![7, 7, 7]), ("diff", vec![7, 7, 8])]);
        let series = dissemination_times(&merged);
        assert_eq!(series.rows[&BlockId::from("same")], 0);
        assert!(series.rows.values().all(|v| *v >= 0));
        assert_eq!(series.rows[&BlockId::from("diff")], 1);
    }

    #[test]
    fn test_finalization_latency_truncated_means() {
        let arrived = table(vec![
            ("a", vec![10, 11]),
            ("b", vec![100, 100]),
            ("only_arrived", vec![1, 1]),
        ]);
        let finalized = table(vec![
            ("a", vec![20, 21]),
            ("b", vec![90, 95]),
            ("only_final", vec![5, 5]),
        ]);
        let result = finalization_latency(&arrived, &finalized);

        // a: trunc(20.5) - trunc(10.5) = 20 - 10
        assert_eq!(
            result.rows[&BlockId::from("a")],
            FinalizationRow {
                latency: 10,
                mean_finalization: 20
            }
        );
        // b: trunc(92.5) - 100, negative latencies are kept
        assert_eq!(result.rows[&BlockId::from("b")].latency, -8);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.arrived_only, 1);
        assert_eq!(result.finalized_only, 1);
    }

    #[test]
    fn test_finalization_latency_odd_sums_truncate_down() {
        let arrived = table(vec![("a", vec![2, 3, 3])]);
        let finalized = table(vec![("a", vec![9, 9, 10])]);
        let result = finalization_latency(&arrived, &finalized);
        // trunc(9.33) - trunc(2.67) = 9 - 2
        assert_eq!(result.rows[&BlockId::from("a")].latency, 7);
        assert_eq!(result.rows[&BlockId::from("a")].mean_finalization, 9);
    }

    #[test]
    fn test_dissemination_extreme_timestamps() {
        let merged = table(vec![("X", vec![0, i64::MAX])]);
        let series = dissemination_times(&merged);
        assert_eq!(series.rows[&BlockId::from("X")], i64::MAX);
    }

    #[test]
    fn test_throughput_wide_span_of_signed_values() {
        let tps = throughput("wide", &[i64::MIN, i64::MAX]).unwrap();
        assert!(tps > 0.0);
    }

    #[test]
    fn test_throughput() {
        let tps = throughput("run", &[100, 150, 200]).unwrap();
        assert!((tps - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_throughput_degenerate() {
        assert!(matches!(
            throughput("single", &[100]),
            Err(MetricsError::DegenerateSeries { count: 1, .. })
        ));
        assert!(matches!(
            throughput("flat", &[5, 5, 5]),
            Err(MetricsError::DegenerateSeries { span: 0, .. })
        ));
        assert!(matches!(
            throughput("empty", &[]),
            Err(MetricsError::DegenerateSeries { count: 0, .. })
        ));
    }

    #[test]
    fn test_throughput_batch_aborts_on_degenerate() {
        let ok = vec![
            ("1".to_string(), vec![0, 1000]),
            ("2".to_string(), vec![0, 500, 1000, 1500]),
        ];
        let out = throughput_batch(&ok).unwrap();
        assert_eq!(out[0].1, 2.0);
        assert!((out[1].1 - 4000.0 / 1500.0).abs() < 1e-9);

        let bad = vec![
            ("1".to_string(), vec![0, 1000]),
            ("2".to_string(), vec![42]),
            ("3".to_string(), vec![0, 10]),
        ];
        match throughput_batch(&bad) {
            Err(MetricsError::DegenerateSeries { label, .. }) => assert_eq!(label, "2"),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
