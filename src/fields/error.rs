/// Errors that can occur while encoding metadata fields
#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    /// I/O error writing a field file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error for the schema sidecar
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error reading the metadata or color table
    #[error("Table error: {0}")]
    TableError(#[from] crate::table::TableError),

    /// An enum field has more distinct values than two-byte codes can hold
    #[error("field '{field}' has too many categories: {count} (at most 65535 supported)")]
    TooManyCategories {
        /// Field label
        field: String,
        /// Number of distinct values
        count: usize,
    },

    /// A color table entry is not a hex color
    #[error("invalid color '{color}' for '{label}': colors must be at most six hex digits")]
    InvalidColor {
        /// Metadata value the color belongs to
        label: String,
        /// Offending color string
        color: String,
    },

    /// A field label has no alphanumeric characters left to build a file name
    #[error("field '{label}' has no usable name: labels need at least one alphanumeric character")]
    EmptyFieldName {
        /// Field label
        label: String,
    },

    /// Two field labels reduce to the same file name
    #[error("fields '{first}' and '{second}' both map to the file name '{name}'")]
    DuplicateFieldName {
        /// Cleaned name
        name: String,
        /// First label
        first: String,
        /// Second label
        second: String,
    },

    /// A unique string value contains a line break, which would split its row
    #[error("field '{field}' row {row}: values of a uniqueString field cannot contain line breaks")]
    LineBreakInValue {
        /// Field label
        field: String,
        /// Zero-based row number
        row: usize,
    },

    /// Binary field data does not match its schema
    #[error("Invalid field data: {0}")]
    InvalidData(String),
}
