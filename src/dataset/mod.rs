//! # Dataset bundles
//!
//! Ties the converters together: reconciles the metadata with the matrix
//! samples, writes every artifact and finally the descriptor.
//!
//! ```text
//! <out>/<name>/
//! ├── dataset.json                          # descriptor, read first
//! ├── meta.tsv                              # metadata in matrix sample order
//! ├── meta.index                            # 6-byte row index records
//! ├── metaFields/<field>.bin                # one file per field
//! ├── metaFields/fields.json                # field schemas
//! ├── exprMatrix.bin                        # zlib gene records
//! ├── exprMatrix.json                       # symbol -> [offset, length]
//! ├── coords/coords_<i>/coords.bin
//! ├── coords/coords_<i>/clusterLabels.json  # with a label field
//! └── markers/markers_<i>/<cluster>.tsv
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cellpack::dataset::{build_dataset, Bundle, DatasetConfig, InputFile};
//!
//! let mut config = DatasetConfig::new("pbmc", "meta.tsv", "exprMatrix.tsv.gz");
//! config.coords.push(InputFile::with_label("umap.tsv", "UMAP"));
//! config.label_field = Some("cluster".to_string());
//!
//! let stats = build_dataset(config, "out/pbmc")?;
//! println!("{}", stats);
//!
//! let bundle = Bundle::open("out/pbmc")?;
//! let cd3e = bundle.gene("CD3E")?;
//! # Ok::<(), cellpack::dataset::DatasetError>(())
//! ```

pub mod builder;
pub mod bundle;
pub mod config;
pub mod descriptor;
mod error;
pub mod reconcile;
mod stats;

#[cfg(test)]
mod tests;

pub use builder::{build_dataset, DatasetBuilder};
pub use bundle::Bundle;
pub use config::{DatasetConfig, InputFile};
pub use descriptor::{CoordsEntry, DatasetDescriptor, MarkersEntry};
pub use error::DatasetError;
pub use reconcile::{reconcile_samples, SampleOrder};
pub use stats::DatasetStats;
