//! Bundle layout and random access to a built bundle.

use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt};

use super::descriptor::DatasetDescriptor;
use super::DatasetError;
use crate::coords::CoordEncoding;
use crate::expr::{ExpressionReader, ExpressionRecord};
use crate::fields::{decode_field, FieldData};
use crate::row_index::RowIndex;

/// Descriptor file
pub const DESCRIPTOR_FILE: &str = "dataset.json";
/// Metadata table reordered to matrix sample order
pub const META_TABLE: &str = "meta.tsv";
/// Row index of [`META_TABLE`]
pub const META_INDEX: &str = "meta.index";
/// Directory of the per-field binary files
pub const META_FIELDS_DIR: &str = "metaFields";
/// Compressed expression records
pub const EXPR_BIN: &str = "exprMatrix.bin";
/// Symbol to byte range index of [`EXPR_BIN`]
pub const EXPR_INDEX: &str = "exprMatrix.json";
/// Directory of the coordinate sets
pub const COORDS_DIR: &str = "coords";
/// Coordinate records inside a coordinate set directory
pub const COORDS_BIN: &str = "coords.bin";
/// Cluster label positions inside a coordinate set directory
pub const CLUSTER_LABELS: &str = "clusterLabels.json";
/// Directory of the split marker tables
pub const MARKERS_DIR: &str = "markers";

/// Directory name of the coordinate set at position `index`
pub fn coords_name(index: usize) -> String {
    format!("coords_{}", index)
}

/// Directory name of the marker table at position `index`
pub fn markers_name(index: usize) -> String {
    format!("markers_{}", index)
}

/// A built bundle opened for reading, the way the client accesses it
#[derive(Debug, Clone)]
pub struct Bundle {
    dir: PathBuf,
    descriptor: DatasetDescriptor,
}

impl Bundle {
    /// Open the bundle in `dir` and parse its descriptor.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, DatasetError> {
        let dir = dir.as_ref().to_path_buf();
        let file = File::open(dir.join(DESCRIPTOR_FILE))?;
        let descriptor = serde_json::from_reader(BufReader::new(file))?;
        Ok(Self { dir, descriptor })
    }

    /// Bundle directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Parsed `dataset.json`
    pub fn descriptor(&self) -> &DatasetDescriptor {
        &self.descriptor
    }

    /// Open the expression records for gene lookups.
    pub fn expression_reader(&self) -> Result<ExpressionReader<BufReader<File>>, DatasetError> {
        Ok(ExpressionReader::open(
            self.dir.join(EXPR_BIN),
            self.dir.join(EXPR_INDEX),
            self.descriptor.matrix_arr_type,
        )?)
    }

    /// Decode the expression record of one gene.
    pub fn gene(&self, symbol: &str) -> Result<ExpressionRecord, DatasetError> {
        Ok(self.expression_reader()?.gene(symbol)?)
    }

    /// Text of metadata row `row` (zero-based, header excluded), read
    /// through the row index.
    pub fn meta_row(&self, row: usize) -> Result<String, DatasetError> {
        let index = RowIndex::open(self.dir.join(META_INDEX))?;
        let mut table = BufReader::new(File::open(self.dir.join(META_TABLE))?);
        Ok(index.read_row(&mut table, row)?)
    }

    /// Decode the binary file of the field called `name`.
    pub fn field(&self, name: &str) -> Result<FieldData, DatasetError> {
        let schema = self
            .descriptor
            .meta_fields
            .iter()
            .find(|schema| schema.name == name)
            .ok_or_else(|| DatasetError::UnknownField(name.to_string()))?;
        let bytes = std::fs::read(self.dir.join(META_FIELDS_DIR).join(schema.file_name()))?;
        Ok(decode_field(schema, &bytes)?)
    }

    /// Stored `(x, y)` per sample of the coordinate set at `index`.
    pub fn coordinates(&self, index: usize) -> Result<Vec<(f64, f64)>, DatasetError> {
        let entry = self
            .descriptor
            .coords
            .get(index)
            .ok_or(DatasetError::UnknownCoords {
                index,
                count: self.descriptor.coords.len(),
            })?;
        let bytes = std::fs::read(self.dir.join(COORDS_DIR).join(&entry.name).join(COORDS_BIN))?;
        let mut cursor = Cursor::new(bytes);
        let mut points = Vec::with_capacity(self.descriptor.sample_count);
        for _ in 0..self.descriptor.sample_count {
            let point = match entry.stats.encoding {
                CoordEncoding::Uint16 => (
                    f64::from(cursor.read_u16::<LittleEndian>()?),
                    f64::from(cursor.read_u16::<LittleEndian>()?),
                ),
                CoordEncoding::Float32 => (
                    f64::from(cursor.read_f32::<LittleEndian>()?),
                    f64::from(cursor.read_f32::<LittleEndian>()?),
                ),
            };
            points.push(point);
        }
        Ok(points)
    }
}
