//! Inputs and options of one dataset build.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::DatasetError;
use crate::coords::CoordOptions;
use crate::expr::ExprOptions;

/// An input file with its display label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    /// Path of the file
    pub file: PathBuf,
    /// Label shown by the client; the file stem when absent
    pub short_label: Option<String>,
}

impl InputFile {
    /// Input without a label
    pub fn new<P: Into<PathBuf>>(file: P) -> Self {
        Self {
            file: file.into(),
            short_label: None,
        }
    }

    /// Input with a label
    pub fn with_label<P: Into<PathBuf>>(file: P, short_label: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            short_label: Some(short_label.into()),
        }
    }

    /// Configured label, or the file name up to its first dot
    pub fn label(&self) -> String {
        if let Some(label) = &self.short_label {
            return label.clone();
        }
        self.file
            .file_name()
            .map(|name| name.to_string_lossy())
            .and_then(|name| name.split('.').next().map(str::to_string))
            .unwrap_or_default()
    }
}

/// Everything needed to build one bundle. Paths are used as given.
#[derive(Debug, Clone, Default)]
pub struct DatasetConfig {
    /// Internal dataset name, also the name of the output directory
    pub name: String,
    /// Human readable name; defaults to `name`
    pub short_label: Option<String>,
    /// Free-form tags copied into the descriptor
    pub tags: Vec<String>,

    /// Metadata table, one row per sample, sample ids in the first column
    pub meta: PathBuf,
    /// Gene-by-sample expression matrix
    pub expr_matrix: PathBuf,
    /// Gene identifier to symbol table; without it row ids are the symbols
    pub gene_table: Option<PathBuf>,

    /// Value-to-color table for enum fields
    pub colors: Option<PathBuf>,
    /// Fields that are always categorical
    pub enum_fields: Vec<String>,
    /// Field whose values label the clusters in the scatter plot
    pub label_field: Option<String>,
    /// Per-field display options, passed through to the field schemas
    pub meta_opt: BTreeMap<String, serde_json::Value>,

    /// Quantize coordinates to two bytes per axis
    pub use_two_bytes: bool,
    /// Mirror the y axis of all layouts
    pub flip_y: bool,
    /// Layout files
    pub coords: Vec<InputFile>,

    /// Marker gene tables
    pub markers: Vec<InputFile>,
    /// Abbreviation to full name table
    pub acronyms: Option<PathBuf>,
    /// Genes shown first in the client's gene list
    pub quick_genes: Option<PathBuf>,

    /// Expression matrix conversion options
    pub expression: ExprOptions,
}

impl DatasetConfig {
    /// Minimal config for a metadata table and a matrix
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(name: impl Into<String>, meta: P, expr_matrix: Q) -> Self {
        Self {
            name: name.into(),
            meta: meta.into(),
            expr_matrix: expr_matrix.into(),
            ..Default::default()
        }
    }

    /// Label shown by the client
    pub fn short_label(&self) -> &str {
        self.short_label.as_deref().unwrap_or(&self.name)
    }

    /// Coordinate storage options
    pub fn coord_options(&self) -> CoordOptions {
        CoordOptions {
            use_two_bytes: self.use_two_bytes,
            flip_y: self.flip_y,
        }
    }

    /// Check the options that do not need any input file.
    pub fn validate(&self) -> Result<(), DatasetError> {
        if self.name.is_empty() {
            return Err(DatasetError::InvalidConfig("dataset name is empty".to_string()));
        }
        if self.name.contains(['/', '\\']) || self.name == "." || self.name == ".." {
            return Err(DatasetError::InvalidConfig(format!(
                "dataset name '{}' cannot be used as a directory name",
                self.name
            )));
        }
        if self.expression.batch_size == 0 {
            return Err(DatasetError::InvalidConfig("expression batch size must be at least 1".to_string()));
        }
        if self.expression.compression_level > 9 {
            return Err(DatasetError::InvalidConfig(format!(
                "zlib compression level must be 0-9, got {}",
                self.expression.compression_level
            )));
        }
        Ok(())
    }

    /// Resolve every relative input path against `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        resolve(&mut self.meta);
        resolve(&mut self.expr_matrix);
        for path in [
            &mut self.gene_table,
            &mut self.colors,
            &mut self.acronyms,
            &mut self.quick_genes,
        ]
        .into_iter()
        .flatten()
        {
            resolve(path);
        }
        for input in self.coords.iter_mut().chain(self.markers.iter_mut()) {
            resolve(&mut input.file);
        }
    }
}
