/// Errors that can occur while converting a coordinate file
#[derive(Debug, thiserror::Error)]
pub enum CoordError {
    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error opening or parsing the table
    #[error("Table error: {0}")]
    TableError(#[from] crate::table::TableError),

    /// CSV/TSV parsing error
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    /// JSON error writing the label positions
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A line does not have exactly `sampleId, x, y`
    #[error("{source_name}, line {line}: expected 3 columns (cellId, x, y), found {found}")]
    ColumnCount {
        /// File the coordinates were read from
        source_name: String,
        /// One-based line number
        line: u64,
        /// Number of columns found
        found: usize,
    },

    /// A coordinate is not a finite number
    #[error("{source_name}, line {line}: '{value}' is not a valid coordinate")]
    InvalidNumber {
        /// File the coordinates were read from
        source_name: String,
        /// One-based line number
        line: u64,
        /// Offending cell
        value: String,
    },

    /// The file has a header but no coordinates
    #[error("{0}: no coordinates found")]
    Empty(String),

    /// Label column and coordinates have different lengths
    #[error("{labels} labels for {points} coordinates")]
    LabelCount {
        /// Number of labels
        labels: usize,
        /// Number of coordinates
        points: usize,
    },
}
