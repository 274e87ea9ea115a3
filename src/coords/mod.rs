//! # 2D layouts
//!
//! A layout file (`cellId, x, y`, t-SNE/UMAP output) is stored as one
//! fixed-width `(x, y)` record per sample, little-endian, in the sample order
//! of the metadata rather than the file order:
//!
//! - `Float32`: the raw coordinates, 8 bytes per sample
//! - `Uint16`: both axes scaled onto `0..=65535`, 4 bytes per sample
//!
//! The stats record (extrema of the stored values plus the type name) goes
//! into the dataset descriptor so the client can map values back to screen
//! space.

mod error;
pub mod labels;
pub mod quantize;

#[cfg(test)]
mod tests;

pub use error::CoordError;
pub use labels::{cluster_midpoints, write_cluster_labels, LabelPosition};
pub use quantize::{
    quantize, read_coords, read_coords_from_reader, write_coords, Bounds, CoordEncoding, CoordOptions,
    CoordStats, CoordinateSet, RawCoords, WrittenCoords,
};
