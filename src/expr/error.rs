/// Errors that can occur while converting or reading the expression matrix
#[derive(Debug, thiserror::Error)]
pub enum ExprError {
    /// I/O error on the matrix, the record stream or the index
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error reading the matrix or gene table
    #[error("Table error: {0}")]
    TableError(#[from] crate::table::TableError),

    /// CSV/TSV parsing error in the matrix
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    /// JSON error on the gene index
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// No matrix row could be mapped to a gene symbol
    #[error(
        "no genes from the expression matrix could be mapped to symbols; \
         is the gene table right for these identifiers? Example ID: {example}"
    )]
    NoGenesMapped {
        /// Last identifier seen in the matrix
        example: String,
    },

    /// A matrix row has a different number of values than the header
    #[error("expression matrix line {line}: expected {expected} values, found {found}")]
    ValueCount {
        /// One-based line number
        line: u64,
        /// Number of sample columns in the header
        expected: usize,
        /// Number of values on the line
        found: usize,
    },

    /// A matrix cell is not a number
    #[error("expression matrix line {line}: '{value}' is not a number")]
    InvalidValue {
        /// One-based line number
        line: u64,
        /// Offending cell
        value: String,
    },

    /// A value does not fit the integer matrix type detected from the first rows
    #[error("gene '{symbol}': value {value} is not a 32-bit integer, but the matrix was detected as Int32; set the matrix type to float")]
    NonIntegerValue {
        /// Gene symbol
        symbol: String,
        /// Offending value
        value: f64,
    },

    /// A gene symbol is too long for its two-byte length prefix
    #[error("gene symbol of {length} bytes exceeds 65535 bytes")]
    SymbolTooLong {
        /// Symbol length in bytes
        length: usize,
    },

    /// A compressed record is malformed
    #[error("Invalid expression record: {0}")]
    InvalidRecord(String),

    /// Symbol missing from the gene index
    #[error("gene '{0}' is not in the expression index")]
    UnknownGene(String),

    /// A sample name appears twice in the matrix header
    #[error("expression matrix header: sample name '{id}' in column {column} has been seen before")]
    DuplicateSample {
        /// Duplicated sample name
        id: String,
        /// Zero-based column index, the gene column included
        column: usize,
    },

    /// A sample name in the matrix header is empty
    #[error("expression matrix header: column {column} has no sample name")]
    EmptySample {
        /// Zero-based column index, the gene column included
        column: usize,
    },

    /// The matrix has no header line
    #[error("expression matrix is empty")]
    EmptyMatrix,
}
