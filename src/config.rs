pub const BLOCK_ID_COLUMN: &str = "BlockID";
pub const DISSEMINATION_COLUMN: &str = "Dissemination Times";
pub const LATENCY_COLUMN: &str = "Elapsed Finalization Latency";
pub const FINALIZATION_TIME_COLUMN: &str = "Average Block Finalization Time";
pub const POINTED_FILE_COLUMN: &str = "Pointed File";

/// Milliseconds per second; node timestamps are in ms.
pub const MS_PER_SECOND: f64 = 1000.0;

/// Columns written by the nodes next to the arrival time that play no part in
/// dissemination or finalization.
pub fn incidental_column_names() -> Vec<String> {
    vec!["Num Txs".to_string(), "Block Size".to_string()]
}

/// How delimited tables are parsed and written.
#[derive(Debug, Clone)]
pub struct TableConfig {
    pub delimiter: u8,
    /// Whether quotes are recognized when reading. Written tables always quote
    /// every field.
    pub quoting: bool,
    pub key_column: String,
    /// `None` picks the single column left after the key and ignored columns.
    pub timestamp_column: Option<String>,
    pub ignored_columns: Vec<String>,
    /// Node timestamps are non-negative; only derived latencies may be signed.
    pub allow_negative: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quoting: true,
            key_column: BLOCK_ID_COLUMN.to_string(),
            timestamp_column: None,
            ignored_columns: incidental_column_names(),
            allow_negative: false,
        }
    }
}

impl TableConfig {
    /// Same dialect, reading the named column instead of a detected one.
    pub fn with_column(&self, column: &str) -> Self {
        Self {
            timestamp_column: Some(column.to_string()),
            ..self.clone()
        }
    }

    pub fn is_ignored(&self, column: &str) -> bool {
        self.ignored_columns.iter().any(|c| c == column)
    }
}
