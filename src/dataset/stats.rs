use std::fmt;

use crate::expr::ExprStats;

/// Statistics from a completed dataset build
#[derive(Debug, Clone)]
pub struct DatasetStats {
    /// Samples in the bundle, after reconciling metadata and matrix
    pub sample_count: usize,

    /// Metadata fields written
    pub field_count: usize,

    /// Statistics from the expression matrix conversion
    pub expr_stats: ExprStats,

    /// Coordinate sets written
    pub coord_sets: usize,

    /// Samples placed at (0,0) summed over all coordinate sets
    pub missing_coords: usize,

    /// Marker files written over all marker tables
    pub marker_files: usize,
}

impl fmt::Display for DatasetStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dataset: {} samples, {} fields, {} genes ({} unmapped, {} duplicates), {} coordinate sets ({} missing coordinates), {} marker files, {} expression bytes",
            self.sample_count,
            self.field_count,
            self.expr_stats.genes_written,
            self.expr_stats.unmapped,
            self.expr_stats.duplicates,
            self.coord_sets,
            self.missing_coords,
            self.marker_files,
            self.expr_stats.bytes_written
        )
    }
}
