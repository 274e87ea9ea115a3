//! Streaming reader for gene-by-sample expression matrices.
//!
//! The first line holds a gene column name followed by one sample name per
//! column; every further line is a gene identifier followed by its values.

use std::collections::{HashMap, HashSet};
use std::io::{BufRead, Read};
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use super::ExprError;
use crate::table;

/// Default number of leading rows inspected to pick the matrix type
pub const DEFAULT_DETECT_ROWS: usize = 10;

/// Numeric type of the values stored in expression records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatrixType {
    /// 32-bit signed integers (count matrices)
    #[serde(alias = "int", alias = "int32")]
    Int32,
    /// 32-bit floats (normalized matrices)
    #[serde(alias = "float", alias = "float32")]
    Float32,
}

impl std::fmt::Display for MatrixType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatrixType::Int32 => write!(f, "Int32"),
            MatrixType::Float32 => write!(f, "Float32"),
        }
    }
}

/// One parsed matrix line
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixRow {
    /// Identifier in the first column
    pub gene_id: String,
    /// Values, projected onto the selected samples
    pub values: Vec<f64>,
}

/// Row iterator over an expression matrix
pub struct MatrixReader<R: Read> {
    records: csv::ByteRecordsIntoIter<R>,
    sample_names: Vec<String>,
    projection: Option<Vec<usize>>,
    line: u64,
}

impl MatrixReader<Box<dyn BufRead>> {
    /// Open a matrix file (`.gz` and `.csv` aware).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ExprError> {
        let path = path.as_ref();
        Self::from_reader(table::open_text(path)?, table::delimiter_for(path))
    }
}

impl<R: Read> MatrixReader<R> {
    /// Read the header line from `reader`.
    pub fn from_reader(reader: R, delimiter: u8) -> Result<Self, ExprError> {
        let mut records = table::csv_reader(reader, delimiter).into_byte_records();
        let header = records.next().ok_or(ExprError::EmptyMatrix)??;
        let sample_names: Vec<String> = table::record_to_strings(&header).into_iter().skip(1).collect();

        let mut seen = HashSet::with_capacity(sample_names.len());
        for (i, name) in sample_names.iter().enumerate() {
            if name.is_empty() {
                return Err(ExprError::EmptySample { column: i + 1 });
            }
            if !seen.insert(name.as_str()) {
                return Err(ExprError::DuplicateSample {
                    id: name.clone(),
                    column: i + 1,
                });
            }
        }

        Ok(Self {
            records,
            sample_names,
            projection: None,
            line: 1,
        })
    }

    /// Sample names from the header, in column order
    pub fn sample_names(&self) -> &[String] {
        &self.sample_names
    }

    /// Only return the values of `samples`, in the given order.
    ///
    /// Names not present in the header are ignored.
    pub fn project(&mut self, samples: &[String]) {
        let columns: HashMap<&str, usize> = self
            .sample_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();
        let projection: Vec<usize> = samples
            .iter()
            .filter_map(|s| columns.get(s.as_str()).copied())
            .collect();
        let identity = projection.len() == self.sample_names.len()
            && projection.iter().enumerate().all(|(i, &c)| i == c);
        self.projection = if identity { None } else { Some(projection) };
    }

    /// Number of values per returned row
    pub fn row_len(&self) -> usize {
        self.projection
            .as_ref()
            .map_or(self.sample_names.len(), Vec::len)
    }

    fn parse_row(&self, record: csv::ByteRecord) -> Result<MatrixRow, ExprError> {
        let expected = self.sample_names.len();
        if record.len() != expected + 1 {
            return Err(ExprError::ValueCount {
                line: self.line,
                expected,
                found: record.len().saturating_sub(1),
            });
        }

        let parse = |cell: &[u8]| -> Result<f64, ExprError> {
            std::str::from_utf8(cell)
                .ok()
                .and_then(|s| s.trim().parse::<f64>().ok())
                .ok_or_else(|| ExprError::InvalidValue {
                    line: self.line,
                    value: String::from_utf8_lossy(cell).into_owned(),
                })
        };

        let gene_id = String::from_utf8_lossy(&record[0]).into_owned();
        let values = match &self.projection {
            Some(columns) => columns
                .iter()
                .map(|&c| parse(&record[c + 1]))
                .collect::<Result<Vec<_>, _>>()?,
            None => record
                .iter()
                .skip(1)
                .map(parse)
                .collect::<Result<Vec<_>, _>>()?,
        };
        Ok(MatrixRow { gene_id, values })
    }
}

impl<R: Read> Iterator for MatrixReader<R> {
    type Item = Result<MatrixRow, ExprError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        self.line += 1;
        Some(record.map_err(ExprError::from).and_then(|r| self.parse_row(r)))
    }
}

/// True if every value has a zero fractional part.
pub fn is_integral(values: &[f64]) -> bool {
    values.iter().all(|v| v.fract() == 0.0)
}

/// Pick the matrix type from the first `rows` gene rows.
pub fn detect_matrix_type<I>(rows: I, max_rows: usize) -> Result<MatrixType, ExprError>
where
    I: IntoIterator<Item = Result<MatrixRow, ExprError>>,
{
    for row in rows.into_iter().take(max_rows) {
        let row = row?;
        if !is_integral(&row.values) {
            debug!("Row '{}' has fractional values", row.gene_id);
            return Ok(MatrixType::Float32);
        }
    }
    Ok(MatrixType::Int32)
}

/// Detect the matrix type of a file by reading its first rows.
pub fn detect_file_matrix_type<P: AsRef<Path>>(path: P, max_rows: usize) -> Result<MatrixType, ExprError> {
    detect_matrix_type(MatrixReader::open(path)?, max_rows)
}
