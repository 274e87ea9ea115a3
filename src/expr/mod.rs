//! # Expression matrix
//!
//! Converts a gene-by-sample matrix (genes as rows, samples as columns) into
//! a stream of independently zlib-compressed per-gene records plus a JSON
//! index `symbol -> [offset, length]`, so the client can fetch and inflate a
//! single gene with one HTTP range request.
//!
//! The conversion is streamed: only one batch of genes is held in memory.
//! Rows whose identifier has no symbol, and rows repeating a symbol that was
//! already written, are skipped and reported once at the end.
//!
//! ```rust,no_run
//! use cellpack::expr::{convert_matrix, ExprOptions, ExpressionReader, GeneMap};
//!
//! let genes = GeneMap::from_file("gencode.tab")?;
//! let stats = convert_matrix(
//!     "exprMatrix.tsv.gz",
//!     "out/exprMatrix.bin",
//!     "out/exprMatrix.json",
//!     Some(&genes),
//!     None,
//!     &ExprOptions::default(),
//! )?;
//!
//! let mut reader = ExpressionReader::open("out/exprMatrix.bin", "out/exprMatrix.json", stats.matrix_type)?;
//! let tp53 = reader.gene("TP53")?;
//! println!("{} values", tp53.values.len());
//! # Ok::<(), cellpack::expr::ExprError>(())
//! ```

mod error;
pub mod gene_map;
pub mod index;
pub mod matrix;
pub mod reader;
pub mod record;
pub mod writer;


pub use error::ExprError;
pub use gene_map::{read_quick_genes, strip_version, GeneMap, QuickGene};
pub use index::{ExpressionIndex, IndexEntry};
pub use matrix::{detect_matrix_type, MatrixReader, MatrixRow, MatrixType};
pub use reader::ExpressionReader;
pub use record::{decode_record, encode_record, ExprValues, ExpressionRecord};
pub use writer::{convert_matrix, ExprOptions, ExprStats, ExpressionMatrixWriter};
