mod analyzer;
mod args;
mod config;
mod error;
mod io_utils;
mod model;
mod node_processing;
mod pipeline;
mod report;
mod stats;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use args::{Args, Command, MetricArg};
use config::TableConfig;
use io_utils::export_json;
use model::MetricKind;
use pipeline::{run_dissemination, run_finalization, run_summary, run_throughput};
use report::{metric_table, summary_table, throughput_table};

/// `RUST_LOG` wins over `--log-level`; an unparsable level falls back to info.
fn log_filter(level: &str, rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_new(level).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn init_tracing(level: &str) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(level, rust_log.as_deref()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn table_config(args: &Args) -> Result<TableConfig> {
    if !args.delimiter.is_ascii() {
        return Err(anyhow!("delimiter must be a single ASCII character: {:?}", args.delimiter));
    }
    Ok(TableConfig {
        delimiter: args.delimiter as u8,
        key_column: args.key_column.clone(),
        ..TableConfig::default()
    })
}

fn main() -> Result<()> {
    let t0 = Instant::now();
    let args = Args::parse();
    init_tracing(&args.log_level);
    let cfg = table_config(&args)?;

    match &args.command {
        Command::Dissemination { index, output } => {
            let series = run_dissemination(index, output, &cfg)
                .with_context(|| format!("dissemination for {}", index.display()))?;
            metric_table(&[(series.name.as_str(), series.values())]).printstd();
        }
        Command::Finalization {
            unfinalized_index,
            finalized_index,
            output,
        } => {
            let table = run_finalization(unfinalized_index, finalized_index, output, &cfg)
                .with_context(|| {
                    format!(
                        "finalization for {} / {}",
                        unfinalized_index.display(),
                        finalized_index.display()
                    )
                })?;
            metric_table(&[
                (config::LATENCY_COLUMN, table.latencies()),
                (config::FINALIZATION_TIME_COLUMN, table.finalization_times()),
            ])
            .printstd();
        }
        Command::Throughput { runs } => {
            let throughputs = run_throughput(runs, &cfg)
                .with_context(|| format!("throughput for {}", runs.display()))?;
            throughput_table(&throughputs).printstd();
        }
        Command::Summary { runs, metric, json } => {
            let metric = match metric {
                MetricArg::Dissemination => MetricKind::Dissemination,
                MetricArg::Latency => MetricKind::Latency,
            };
            let summaries = run_summary(runs, metric, &cfg)
                .with_context(|| format!("summary for {}", runs.display()))?;
            if let Some(path) = json {
                export_json(path, &summaries)?;
                info!("summary written to {}", path.display());
            }
            summary_table(&summaries).printstd();
        }
    }

    debug!("total: {:.3}s", t0.elapsed().as_secs_f64());
    Ok(())
}
