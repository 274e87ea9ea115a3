//! The `dataset.json` descriptor.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::coords::CoordStats;
use crate::expr::{MatrixType, QuickGene};
use crate::fields::FieldSchema;

/// Converter name and version recorded in every descriptor
pub fn converter_version() -> String {
    format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// One coordinate set of the bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordsEntry {
    /// Directory name under `coords/`
    pub name: String,
    /// Label shown by the client
    pub short_label: String,
    /// Extrema and storage type of `coords.bin`
    #[serde(flatten)]
    pub stats: CoordStats,
}

/// One marker table of the bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkersEntry {
    /// Directory name under `markers/`
    pub name: String,
    /// Label shown by the client
    pub short_label: String,
}

/// Top-level description of a bundle, read by the client first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetDescriptor {
    /// Internal name
    pub name: String,
    /// Display name
    pub short_label: String,
    /// Free-form tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Rows of every field and values of every expression record
    pub sample_count: usize,
    /// True if matrix samples without metadata were dropped
    pub matrix_was_filtered: bool,
    /// Value type of the expression records
    pub matrix_arr_type: MatrixType,
    /// Schemas of the metadata fields, in column order
    pub meta_fields: Vec<FieldSchema>,
    /// Coordinate sets
    #[serde(default)]
    pub coords: Vec<CoordsEntry>,
    /// Marker tables
    #[serde(default)]
    pub markers: Vec<MarkersEntry>,
    /// Field used to label clusters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_field: Option<String>,
    /// Abbreviations used in the metadata
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub acronyms: BTreeMap<String, String>,
    /// Genes listed first by the client
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quick_genes: Vec<QuickGene>,
    /// RFC 3339 build time
    pub created: String,
    /// Name and version of the converter
    pub converter: String,
}
