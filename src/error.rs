use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("malformed input in {}: {reason}", path.display())]
    MalformedInput { path: PathBuf, reason: String },

    #[error("degenerate series '{label}': {count} blocks spanning {span} ms")]
    DegenerateSeries {
        label: String,
        count: usize,
        span: i64,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("JSON error in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, MetricsError>;

impl MetricsError {
    pub fn malformed(path: &Path, reason: impl Into<String>) -> Self {
        MetricsError::MalformedInput {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn io(path: &Path, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => MetricsError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => MetricsError::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    pub fn csv(path: &Path, source: csv::Error) -> Self {
        MetricsError::Csv {
            path: path.to_path_buf(),
            source,
        }
    }
}
