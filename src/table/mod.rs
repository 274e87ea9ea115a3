//! Line-oriented table input.
//!
//! All inputs of a dataset (metadata, expression matrix, coordinates, marker
//! lists, key/value side tables) are plain tab- or comma-separated text,
//! optionally gzip-compressed. The separator is picked from the file name:
//! anything containing `.csv` is comma-separated, everything else uses tabs.
//!
//! Cells are decoded lossily as UTF-8 so that Latin-1 metadata exported from
//! spreadsheets does not abort a run.

mod error;


pub use error::TableError;

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;

/// Input buffer size for table readers (64KB)
pub const DEFAULT_INPUT_BUFFER_SIZE: usize = 64 * 1024;

/// A named column of raw cell values, one per sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Header text of the column
    pub name: String,
    /// Cell values in row order
    pub values: Vec<String>,
}

impl Column {
    /// Create a column from a name and its values
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the column has no rows
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Field separator for a file name: `,` for CSV files, tab otherwise.
pub fn delimiter_for<P: AsRef<Path>>(path: P) -> u8 {
    let name = path.as_ref().to_string_lossy().to_lowercase();
    if name.contains(".csv") {
        b','
    } else {
        b'\t'
    }
}

/// Open a text file, transparently decompressing `.gz` files.
pub fn open_text<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>, TableError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let is_gzip = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false);

    if is_gzip {
        let decoder = MultiGzDecoder::new(BufReader::with_capacity(DEFAULT_INPUT_BUFFER_SIZE, file));
        Ok(Box::new(BufReader::with_capacity(
            DEFAULT_INPUT_BUFFER_SIZE,
            decoder,
        )))
    } else {
        Ok(Box::new(BufReader::with_capacity(
            DEFAULT_INPUT_BUFFER_SIZE,
            file,
        )))
    }
}

/// Build a headerless CSV reader that accepts ragged lines.
///
/// Headers and field counts are validated by the callers so that errors can
/// name the offending line.
pub(crate) fn csv_reader<R: Read>(reader: R, delimiter: u8) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .quoting(delimiter == b',')
        .from_reader(reader)
}

pub(crate) fn record_to_strings(record: &csv::ByteRecord) -> Vec<String> {
    record
        .iter()
        .map(|cell| String::from_utf8_lossy(cell).into_owned())
        .collect()
}

/// Clean up a header line: strip a leading `#`, name an unnamed first column
/// `rowName` (R writes tables like that) and reject any other empty name.
fn check_headers(mut headers: Vec<String>, source_name: &str) -> Result<Vec<String>, TableError> {
    if let Some(first) = headers.first_mut() {
        if let Some(stripped) = first.strip_prefix('#') {
            *first = stripped.to_string();
        }
        if first.is_empty() {
            *first = "rowName".to_string();
        }
    }
    if let Some(index) = headers.iter().position(|h| h.trim().is_empty()) {
        return Err(TableError::EmptyHeader {
            source_name: source_name.to_string(),
            index,
        });
    }
    Ok(headers)
}

/// Parse a whole table vertically into one [`Column`] per header cell.
pub fn read_columns_from_reader<R: Read>(
    reader: R,
    delimiter: u8,
    source_name: &str,
) -> Result<Vec<Column>, TableError> {
    let mut csv_reader = csv_reader(reader, delimiter);
    let mut records = csv_reader.byte_records();

    let header = match records.next() {
        Some(record) => record?,
        None => {
            return Err(TableError::MissingHeader {
                source_name: source_name.to_string(),
            })
        }
    };
    let headers = check_headers(record_to_strings(&header), source_name)?;

    let mut columns: Vec<Column> = headers
        .into_iter()
        .map(|name| Column::new(name, Vec::new()))
        .collect();

    for (i, record) in records.enumerate() {
        let record = record?;
        if record.len() != columns.len() {
            return Err(TableError::FieldCount {
                source_name: source_name.to_string(),
                line: i as u64 + 2,
                expected: columns.len(),
                found: record.len(),
            });
        }
        for (column, cell) in columns.iter_mut().zip(record.iter()) {
            column.values.push(String::from_utf8_lossy(cell).into_owned());
        }
    }

    Ok(columns)
}

/// Parse a table file into columns.
pub fn read_columns<P: AsRef<Path>>(path: P) -> Result<Vec<Column>, TableError> {
    let path = path.as_ref();
    read_columns_from_reader(
        open_text(path)?,
        delimiter_for(path),
        &path.display().to_string(),
    )
}

/// Return the header cells of a table file.
pub fn read_headers<P: AsRef<Path>>(path: P) -> Result<Vec<String>, TableError> {
    let path = path.as_ref();
    let mut line = String::new();
    open_text(path)?.read_line(&mut line)?;
    let line = line.trim_end_matches(&['\n', '\r'][..]);
    if line.is_empty() {
        return Err(TableError::MissingHeader {
            source_name: path.display().to_string(),
        });
    }
    let delimiter = delimiter_for(path) as char;
    Ok(line.split(delimiter).map(str::to_string).collect())
}

/// Return a single named column of a table file.
pub fn read_column<P: AsRef<Path>>(path: P, name: &str) -> Result<Column, TableError> {
    let path = path.as_ref();
    read_columns(path)?
        .into_iter()
        .find(|column| column.name == name)
        .ok_or_else(|| TableError::MissingColumn {
            source_name: path.display().to_string(),
            column: name.to_string(),
        })
}

/// Read the sample identifiers (first column) of a table, header skipped.
///
/// Empty and duplicated identifiers are fatal.
pub fn read_sample_names_from_reader<R: Read>(
    reader: R,
    delimiter: u8,
    source_name: &str,
) -> Result<Vec<String>, TableError> {
    let mut csv_reader = csv_reader(reader, delimiter);
    let mut names = Vec::new();
    let mut seen = HashSet::new();

    for (i, record) in csv_reader.byte_records().enumerate().skip(1) {
        let record = record?;
        let line = i as u64 + 1;
        let name = record
            .get(0)
            .map(|cell| String::from_utf8_lossy(cell).into_owned())
            .unwrap_or_default();
        if name.is_empty() {
            return Err(TableError::EmptySampleId {
                source_name: source_name.to_string(),
                line,
            });
        }
        if !seen.insert(name.clone()) {
            return Err(TableError::DuplicateSampleId {
                source_name: source_name.to_string(),
                line,
                id: name,
            });
        }
        names.push(name);
    }
    Ok(names)
}

/// Read the sample identifiers of a table file.
pub fn read_sample_names<P: AsRef<Path>>(path: P) -> Result<Vec<String>, TableError> {
    let path = path.as_ref();
    read_sample_names_from_reader(
        open_text(path)?,
        delimiter_for(path),
        &path.display().to_string(),
    )
}

/// Parse a headerless `key<sep>value` table, keeping file order.
pub fn read_key_values_from_reader<R: Read>(
    reader: R,
    delimiter: u8,
    source_name: &str,
) -> Result<Vec<(String, String)>, TableError> {
    let mut csv_reader = csv_reader(reader, delimiter);
    let mut pairs = Vec::new();
    for (i, record) in csv_reader.byte_records().enumerate() {
        let record = record?;
        if record.len() != 2 {
            return Err(TableError::FieldCount {
                source_name: source_name.to_string(),
                line: i as u64 + 1,
                expected: 2,
                found: record.len(),
            });
        }
        let mut cells = record_to_strings(&record).into_iter();
        if let (Some(key), Some(value)) = (cells.next(), cells.next()) {
            pairs.push((key, value));
        }
    }
    Ok(pairs)
}

/// Parse a headerless key/value file.
pub fn read_key_values<P: AsRef<Path>>(path: P) -> Result<Vec<(String, String)>, TableError> {
    let path = path.as_ref();
    read_key_values_from_reader(
        open_text(path)?,
        delimiter_for(path),
        &path.display().to_string(),
    )
}
