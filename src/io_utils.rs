use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::{TableConfig, FINALIZATION_TIME_COLUMN, LATENCY_COLUMN, POINTED_FILE_COLUMN};
use crate::error::{MetricsError, Result};
use crate::model::{BlockId, BlockObservation, FinalizationTable, MetricSeries, NodeLog, RunEntry};

/// Reads an index file: one per-node log path per line.
pub fn read_index_file(path: &Path) -> Result<Vec<PathBuf>> {
    let text = fs::read_to_string(path).map_err(|e| MetricsError::io(path, e))?;
    let mut files = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            return Err(MetricsError::malformed(
                path,
                format!("blank line {} in index file", i + 1),
            ));
        }
        files.push(PathBuf::from(line));
    }
    if files.is_empty() {
        return Err(MetricsError::malformed(path, "index file lists no files"));
    }
    debug!("{} lists {} files", path.display(), files.len());
    Ok(files)
}

fn table_reader(path: &Path, cfg: &TableConfig) -> Result<csv::Reader<File>> {
    let file = File::open(path).map_err(|e| MetricsError::io(path, e))?;
    Ok(ReaderBuilder::new()
        .delimiter(cfg.delimiter)
        .quoting(cfg.quoting)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file))
}

fn column_index(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

/// Locates the key and timestamp columns of a node log header.
fn resolve_columns(path: &Path, headers: &StringRecord, cfg: &TableConfig) -> Result<(usize, usize)> {
    let key_idx = column_index(headers, &cfg.key_column).ok_or_else(|| {
        MetricsError::malformed(path, format!("missing key column '{}'", cfg.key_column))
    })?;

    let ts_idx = match &cfg.timestamp_column {
        Some(name) => column_index(headers, name).ok_or_else(|| {
            MetricsError::malformed(path, format!("missing timestamp column '{}'", name))
        })?,
        None => {
            let candidates: Vec<usize> = headers
                .iter()
                .enumerate()
                .filter(|(i, h)| *i != key_idx && !cfg.is_ignored(h))
                .map(|(i, _)| i)
                .collect();
            match candidates.as_slice() {
                [only] => *only,
                [] => return Err(MetricsError::malformed(path, "no timestamp column")),
                _ => {
                    return Err(MetricsError::malformed(
                        path,
                        format!(
                            "ambiguous timestamp column among {} candidates",
                            candidates.len()
                        ),
                    ))
                }
            }
        }
    };
    Ok((key_idx, ts_idx))
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

fn parse_row(
    path: &Path,
    record: &StringRecord,
    key_idx: usize,
    ts_idx: usize,
    allow_negative: bool,
) -> Result<BlockObservation> {
    let line = line_of(record);
    let key = record
        .get(key_idx)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| MetricsError::malformed(path, format!("missing block id on line {}", line)))?;
    let raw_ts = record.get(ts_idx).ok_or_else(|| {
        MetricsError::malformed(path, format!("missing timestamp on line {}", line))
    })?;
    let timestamp = raw_ts.parse::<i64>().map_err(|e| {
        MetricsError::malformed(path, format!("invalid timestamp '{}' on line {}: {}", raw_ts, line, e))
    })?;
    if timestamp < 0 && !allow_negative {
        return Err(MetricsError::malformed(
            path,
            format!("negative timestamp {} on line {}", timestamp, line),
        ));
    }
    Ok(BlockObservation {
        id: BlockId::from(key),
        timestamp,
    })
}

/// Loads one node's observations, keeping the first row of every block.
pub fn load_node_log(path: &Path, cfg: &TableConfig) -> Result<NodeLog> {
    let mut reader = table_reader(path, cfg)?;
    let headers = reader
        .headers()
        .map_err(|e| MetricsError::csv(path, e))?
        .clone();
    let (key_idx, ts_idx) = resolve_columns(path, &headers, cfg)?;

    let mut log = NodeLog::new(path.to_path_buf());
    let mut record = StringRecord::new();
    while reader
        .read_record(&mut record)
        .map_err(|e| MetricsError::csv(path, e))?
    {
        log.insert(parse_row(path, &record, key_idx, ts_idx, cfg.allow_negative)?);
    }

    if log.duplicates > 0 {
        warn!(
            "{}: skipped {} duplicate block rows (first seen kept)",
            path.display(),
            log.duplicates
        );
    }
    if log.is_empty() {
        warn!("{}: no block rows", path.display());
    }
    Ok(log)
}

/// Reads one integer column of a metric file written by this tool.
pub fn read_metric_column(path: &Path, cfg: &TableConfig, column: &str) -> Result<MetricSeries> {
    let mut column_cfg = cfg.with_column(column);
    column_cfg.allow_negative = column == LATENCY_COLUMN;
    let log = load_node_log(path, &column_cfg)?;
    Ok(MetricSeries {
        name: column.to_string(),
        rows: log.observations,
    })
}

/// Reads a run index: a `Pointed File` column plus an optional label column.
pub fn read_run_index(path: &Path, cfg: &TableConfig) -> Result<Vec<RunEntry>> {
    let mut reader = table_reader(path, cfg)?;
    let headers = reader
        .headers()
        .map_err(|e| MetricsError::csv(path, e))?
        .clone();
    let file_idx = column_index(&headers, POINTED_FILE_COLUMN).ok_or_else(|| {
        MetricsError::malformed(path, format!("missing column '{}'", POINTED_FILE_COLUMN))
    })?;
    let label_idx = (0..headers.len()).find(|i| *i != file_idx);

    let mut runs = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| MetricsError::csv(path, e))?;
        let file = record
            .get(file_idx)
            .filter(|f| !f.is_empty())
            .ok_or_else(|| {
                MetricsError::malformed(path, format!("missing file on line {}", line_of(&record)))
            })?;
        let label = label_idx
            .and_then(|i| record.get(i))
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| (row + 1).to_string());
        runs.push(RunEntry {
            label,
            path: PathBuf::from(file),
        });
    }

    if runs.is_empty() {
        return Err(MetricsError::malformed(path, "run index lists no runs"));
    }
    Ok(runs)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| MetricsError::io(parent, e))?;
        }
    }
    Ok(())
}

fn table_writer(path: &Path, cfg: &TableConfig) -> Result<csv::Writer<File>> {
    ensure_parent(path)?;
    let file = File::create(path).map_err(|e| MetricsError::io(path, e))?;
    Ok(WriterBuilder::new()
        .delimiter(cfg.delimiter)
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(file))
}

fn write_rows<I>(path: &Path, cfg: &TableConfig, header: &[&str], rows: I) -> Result<()>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut writer = table_writer(path, cfg)?;
    writer
        .write_record(header)
        .map_err(|e| MetricsError::csv(path, e))?;
    for row in rows {
        writer
            .write_record(&row)
            .map_err(|e| MetricsError::csv(path, e))?;
    }
    writer.flush().map_err(|e| MetricsError::io(path, e))
}

pub fn write_metric_series(path: &Path, cfg: &TableConfig, series: &MetricSeries) -> Result<()> {
    write_rows(
        path,
        cfg,
        &[cfg.key_column.as_str(), series.name.as_str()],
        series
            .rows
            .iter()
            .map(|(id, v)| vec![id.to_string(), v.to_string()]),
    )
}

pub fn write_finalization_table(
    path: &Path,
    cfg: &TableConfig,
    table: &FinalizationTable,
) -> Result<()> {
    write_rows(
        path,
        cfg,
        &[cfg.key_column.as_str(), LATENCY_COLUMN, FINALIZATION_TIME_COLUMN],
        table.rows.iter().map(|(id, r)| {
            vec![
                id.to_string(),
                r.latency.to_string(),
                r.mean_finalization.to_string(),
            ]
        }),
    )
}

pub fn export_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(value).map_err(|source| MetricsError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|e| MetricsError::io(path, e))
}
