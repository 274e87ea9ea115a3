use crate::coords::CoordError;
use crate::expr::ExprError;
use crate::fields::FieldError;
use crate::markers::MarkerError;
use crate::row_index::RowIndexError;
use crate::table::TableError;

/// Errors that can occur while building or reading a dataset bundle
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error serializing/deserializing JSON
    #[error("JSON serialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    /// Error reading an input table
    #[error("Table error: {0}")]
    TableError(#[from] TableError),

    /// Error encoding a metadata field
    #[error("Field error: {0}")]
    FieldError(#[from] FieldError),

    /// Error converting the expression matrix
    #[error("Expression matrix error: {0}")]
    ExprError(#[from] ExprError),

    /// Error indexing the metadata table
    #[error("Row index error: {0}")]
    RowIndexError(#[from] RowIndexError),

    /// Error converting a coordinate file
    #[error("Coordinate error: {0}")]
    CoordError(#[from] CoordError),

    /// Error splitting a marker table
    #[error("Marker error: {0}")]
    MarkerError(#[from] MarkerError),

    /// Invalid dataset configuration
    #[error("Invalid dataset configuration: {0}")]
    InvalidConfig(String),

    /// No sample is both in the metadata and in the matrix
    #[error("no sample names are shared between the meta data ({meta_example}, ...) and the expression matrix ({matrix_example}, ...)")]
    NoSampleOverlap {
        /// First metadata sample
        meta_example: String,
        /// First matrix sample
        matrix_example: String,
    },

    /// The configured label field is not a metadata column
    #[error("label field '{0}' is not a column of the meta data")]
    MissingLabelField(String),

    /// A metadata field requested by name does not exist in the bundle
    #[error("unknown meta data field: {0}")]
    UnknownField(String),

    /// A coordinate set requested by position does not exist in the bundle
    #[error("coordinate set {index} does not exist, the dataset has {count}")]
    UnknownCoords {
        /// Requested position
        index: usize,
        /// Number of coordinate sets
        count: usize,
    },
}
