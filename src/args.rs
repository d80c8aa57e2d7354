use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Summarize block dissemination, finalization latency and throughput from per-node logs")]
pub struct Args {
    /// Field delimiter of every table read or written
    #[arg(long = "delimiter", default_value_t = ',', global = true)]
    pub delimiter: char,

    /// Name of the block identifier column
    #[arg(long = "key-column", default_value = "BlockID", global = true)]
    pub key_column: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long = "log-level", default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Per-block time between the first and last node receiving it
    Dissemination {
        /// File listing the per-node arrival logs, one path per line
        #[arg(short = 'i', long = "index")]
        index: PathBuf,

        /// Output table of dissemination times
        #[arg(short = 'o', long = "output")]
        output: PathBuf,
    },

    /// Per-block mean finalization time minus mean arrival time
    Finalization {
        /// File listing the per-node arrival (unfinalized) logs
        #[arg(short = 'u', long = "unfinalized-index")]
        unfinalized_index: PathBuf,

        /// File listing the per-node finalized block logs
        #[arg(short = 'f', long = "finalized-index")]
        finalized_index: PathBuf,

        /// Output table of finalization latencies
        #[arg(short = 'o', long = "output")]
        output: PathBuf,
    },

    /// Blocks per second of every run in a run index of finalization tables
    Throughput {
        /// Table with a "Pointed File" column and an optional run label column
        #[arg(short = 'r', long = "runs")]
        runs: PathBuf,
    },

    /// Descriptive statistics of a metric for every run in a run index
    Summary {
        #[arg(short = 'r', long = "runs")]
        runs: PathBuf,

        #[arg(short = 'm', long = "metric", value_enum, default_value_t = MetricArg::Latency)]
        metric: MetricArg,

        /// Also write the summary as JSON
        #[arg(long = "json")]
        json: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum MetricArg {
    Dissemination,
    Latency,
}
