//! TOML dataset configuration.
//!
//! A dataset is described by one TOML file; relative paths in it are taken
//! relative to the file's directory:
//!
//! ```toml
//! # cellpack.toml
//! name = "pbmc3k"
//! short_label = "PBMC 3k"
//! meta = "meta.tsv"
//! expr_matrix = "exprMatrix.tsv.gz"
//! gene_table = "gencode22.tab"
//! enum_fields = ["cluster"]
//! label_field = "cluster"
//! use_two_bytes = true
//!
//! [[coords]]
//! file = "tsne.tsv"
//! short_label = "t-SNE"
//!
//! [meta_opt.cluster]
//! sort = "alpha"
//!
//! [expression]
//! compression_level = 6
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use cellpack::dataset::{DatasetConfig, InputFile};
use cellpack::expr::{ExprOptions, MatrixType};

/// Root of a dataset config file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Internal dataset name, also the output directory name.
    pub name: String,

    /// Display name.
    pub short_label: Option<String>,

    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Metadata table.
    pub meta: PathBuf,

    /// Expression matrix.
    pub expr_matrix: PathBuf,

    /// Gene identifier to symbol table.
    pub gene_table: Option<PathBuf>,

    /// Value-to-color table.
    pub colors: Option<PathBuf>,

    /// Fields that are always categorical.
    #[serde(default)]
    pub enum_fields: Vec<String>,

    /// Field labelling the clusters.
    pub label_field: Option<String>,

    /// Store layouts as 16-bit integers.
    #[serde(default)]
    pub use_two_bytes: bool,

    /// Mirror the y axis.
    #[serde(default)]
    pub flip_y: bool,

    /// Abbreviations table.
    pub acronyms: Option<PathBuf>,

    /// Genes listed first by the client.
    pub quick_genes: Option<PathBuf>,

    /// Layout files.
    #[serde(default)]
    pub coords: Vec<InputFileConfig>,

    /// Marker tables.
    #[serde(default)]
    pub markers: Vec<InputFileConfig>,

    /// Per-field display options.
    #[serde(default)]
    pub meta_opt: BTreeMap<String, serde_json::Value>,

    /// Expression matrix settings.
    #[serde(default)]
    pub expression: ExpressionConfig,
}

/// A `[[coords]]` or `[[markers]]` entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputFileConfig {
    /// Input path.
    pub file: PathBuf,

    /// Display label.
    pub short_label: Option<String>,
}

/// The `[expression]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpressionConfig {
    /// Genes compressed per batch.
    pub batch_size: Option<usize>,

    /// zlib level (0-9).
    pub compression_level: Option<u32>,

    /// Rows inspected to detect the matrix type.
    pub detect_rows: Option<usize>,

    /// Force `int` or `float` records.
    pub matrix_type: Option<MatrixType>,
}

impl ExpressionConfig {
    fn into_options(self) -> ExprOptions {
        let defaults = ExprOptions::default();
        ExprOptions {
            batch_size: self.batch_size.unwrap_or(defaults.batch_size),
            compression_level: self.compression_level.unwrap_or(defaults.compression_level),
            detect_rows: self.detect_rows.unwrap_or(defaults.detect_rows),
            matrix_type: self.matrix_type,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Turn the file contents into a build config, resolving relative paths
    /// against `base_dir`.
    pub fn into_dataset_config(self, base_dir: &Path) -> DatasetConfig {
        let inputs = |files: Vec<InputFileConfig>| -> Vec<InputFile> {
            files
                .into_iter()
                .map(|f| InputFile {
                    file: f.file,
                    short_label: f.short_label,
                })
                .collect()
        };

        let mut config = DatasetConfig {
            name: self.name,
            short_label: self.short_label,
            tags: self.tags,
            meta: self.meta,
            expr_matrix: self.expr_matrix,
            gene_table: self.gene_table,
            colors: self.colors,
            enum_fields: self.enum_fields,
            label_field: self.label_field,
            meta_opt: self.meta_opt,
            use_two_bytes: self.use_two_bytes,
            flip_y: self.flip_y,
            coords: inputs(self.coords),
            markers: inputs(self.markers),
            acronyms: self.acronyms,
            quick_genes: self.quick_genes,
            expression: self.expression.into_options(),
        };
        config.resolve_paths(base_dir);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
            name = "cortex-dev"
            short_label = "Cortex development"
            meta = "meta.tsv"
            expr_matrix = "exprMatrix.tsv.gz"
            gene_table = "gencode22.tab"
            enum_fields = ["cluster"]
            label_field = "cluster"
            use_two_bytes = true
            flip_y = true
            tags = ["brain"]

            [[coords]]
            file = "tsne.tsv"
            short_label = "t-SNE"

            [[coords]]
            file = "/abs/umap.tsv"

            [[markers]]
            file = "markers.tsv"

            [meta_opt.cluster]
            sort = "alpha"

            [expression]
            batch_size = 64
            matrix_type = "float"
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.name, "cortex-dev");
        assert_eq!(config.coords.len(), 2);
        assert_eq!(config.expression.batch_size, Some(64));
        assert_eq!(config.expression.matrix_type, Some(MatrixType::Float32));
        assert_eq!(config.meta_opt["cluster"]["sort"], "alpha");

        let dataset = config.into_dataset_config(Path::new("/data/cortex"));
        assert_eq!(dataset.meta, PathBuf::from("/data/cortex/meta.tsv"));
        assert_eq!(dataset.gene_table, Some(PathBuf::from("/data/cortex/gencode22.tab")));
        assert_eq!(dataset.coords[0].file, PathBuf::from("/data/cortex/tsne.tsv"));
        assert_eq!(dataset.coords[1].file, PathBuf::from("/abs/umap.tsv"));
        assert_eq!(dataset.coords[1].short_label, None);
        assert_eq!(dataset.expression.batch_size, 64);
        assert_eq!(dataset.expression.compression_level, 6);
        assert!(dataset.use_two_bytes && dataset.flip_y);
    }

    #[test]
    fn test_minimal_config() {
        let toml = r#"
            name = "tiny"
            meta = "meta.tsv"
            expr_matrix = "matrix.tsv"
        "#;

        let config = Config::from_str(toml).unwrap();
        assert!(config.coords.is_empty());
        assert_eq!(config.expression.compression_level, None);

        let dataset = config.into_dataset_config(Path::new("."));
        assert_eq!(dataset.expression, ExprOptions::default());
        assert!(!dataset.use_two_bytes);
    }

    #[test]
    fn test_rejects_bad_config() {
        assert!(Config::from_str("").is_err());
        assert!(Config::from_str("name = \"x\"\nmeta = \"m\"\nexpr_matrix = \"e\"\nunknown_key = 1").is_err());
    }
}
