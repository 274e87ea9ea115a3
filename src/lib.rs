//! # cellpack - single-cell datasets for the web
//!
//! `cellpack` converts a single-cell dataset (a per-sample metadata table, a
//! gene-by-sample expression matrix, 2D layouts and marker gene tables) into
//! a directory of small binary files that a browser client can fetch
//! piecewise over HTTP, without any server-side logic.
//!
//! ## Key Features
//!
//! - **Compact metadata fields**: every metadata column is classified
//!   (int, float, enum, unique string), binned into at most ten bins or coded
//!   by category frequency, and stored as one byte (or two) per sample.
//!
//! - **Per-gene random access**: each gene's expression vector is an
//!   independent zlib record; a JSON index maps symbols to byte ranges so a
//!   single range request fetches one gene.
//!
//! - **Row-addressable metadata**: a fixed-width `(offset, length)` index
//!   over the metadata table lets the client load one sample's row.
//!
//! - **Quantized layouts**: coordinates are stored as 16-bit integers or
//!   32-bit floats, in metadata sample order.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cellpack::dataset::{build_dataset, DatasetConfig, InputFile};
//!
//! let mut config = DatasetConfig::new("pbmc3k", "meta.tsv", "exprMatrix.tsv.gz");
//! config.gene_table = Some("gencode22.tab".into());
//! config.coords.push(InputFile::with_label("tsne.tsv", "t-SNE"));
//! config.use_two_bytes = true;
//!
//! let stats = build_dataset(config, "out/pbmc3k")?;
//! println!("{}", stats);
//! # Ok::<(), cellpack::dataset::DatasetError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`table`]: tab/comma separated (optionally gzipped) input tables
//! - [`fields`]: type inference, binning, category coding, field files
//! - [`expr`]: expression matrix records and their index
//! - [`row_index`]: byte offsets of metadata rows
//! - [`coords`]: layout quantization and cluster label positions
//! - [`markers`]: per-cluster marker tables
//! - [`output`]: atomic output files
//! - [`dataset`]: the orchestrator writing a whole bundle
//!
//! ## Features
//!
//! - `parallel`: compress gene records and encode metadata columns on a
//!   rayon thread pool. Output bytes are identical to a serial run.

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![allow(clippy::too_many_arguments)]

pub mod coords;
pub mod dataset;
pub mod expr;
pub mod fields;
pub mod markers;
pub mod output;
pub mod row_index;
pub mod table;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::coords::{CoordEncoding, CoordOptions, CoordStats};
    pub use crate::dataset::{
        build_dataset, Bundle, DatasetBuilder, DatasetConfig, DatasetDescriptor, DatasetError,
        DatasetStats, InputFile,
    };
    pub use crate::expr::{
        convert_matrix, ExprOptions, ExprStats, ExprValues, ExpressionReader, ExpressionRecord,
        GeneMap, MatrixType,
    };
    pub use crate::fields::{
        encode_column, ColorTable, FieldData, FieldSchema, FieldType, MetaOptions,
    };
    pub use crate::row_index::{RowIndex, RowIndexEntry};
    pub use crate::table::Column;
}
