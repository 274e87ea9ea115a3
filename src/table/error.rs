/// Errors raised while reading tab- or comma-separated input tables
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// I/O error opening or reading the table
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV/TSV parsing error
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    /// The table has no header line
    #[error("{source_name}: table is empty, expected a header line")]
    MissingHeader {
        /// File the table was read from
        source_name: String,
    },

    /// A header cell is empty
    #[error("{source_name}: header column {index} has no name (trailing tab or Excel export?)")]
    EmptyHeader {
        /// File the table was read from
        source_name: String,
        /// Zero-based column index
        index: usize,
    },

    /// A data line has a different number of fields than the header
    #[error("{source_name}, line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        /// File the table was read from
        source_name: String,
        /// One-based line number
        line: u64,
        /// Number of header columns
        expected: usize,
        /// Number of fields on the line
        found: usize,
    },

    /// A requested column is not present in the header
    #[error("{source_name}: no column named '{column}'")]
    MissingColumn {
        /// File the table was read from
        source_name: String,
        /// Requested column name
        column: String,
    },

    /// Sample identifier (first field) is empty
    #[error("{source_name}, line {line}: sample name (first field) is empty")]
    EmptySampleId {
        /// File the table was read from
        source_name: String,
        /// One-based line number
        line: u64,
    },

    /// Sample identifier seen twice
    #[error("{source_name}, line {line}: sample name '{id}' has been seen before")]
    DuplicateSampleId {
        /// File the table was read from
        source_name: String,
        /// One-based line number
        line: u64,
        /// Duplicated identifier
        id: String,
    },
}
