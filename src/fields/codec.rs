//! Binary layout of metadata fields.
//!
//! Numeric and enum fields are stored as one little-endian code per row
//! (`Uint8` or `Uint16`), unique-string fields as the literal values, each
//! terminated by `\n`. There is no header; the [`FieldSchema`] describes how
//! to read the bytes back.

use std::io::{Cursor, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::category::{encode_categories, ColorTable};
use super::discretize::{discretize, BinScheme, Discretized};
use super::infer::{infer_column, InferredColumn};
use super::types::{clean_field_name, ArrType, BinValues, FieldSchema, FieldType};
use super::FieldError;
use crate::output::AtomicFile;
use crate::table::Column;

/// Per-field encoding options
#[derive(Debug, Clone, Default)]
pub struct FieldOptions<'a> {
    /// Treat the column as categorical regardless of its content
    pub force_enum: bool,
    /// Optional value-to-color table for enum fields
    pub colors: Option<&'a ColorTable>,
    /// Display options copied verbatim into the schema
    pub opt: Option<serde_json::Value>,
}

/// Per-row payload of an encoded field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldData {
    /// Fixed-width bin or category codes
    Codes {
        /// Width of every code
        arr_type: ArrType,
        /// One code per row
        codes: Vec<u16>,
    },
    /// Raw strings, written newline-terminated
    Lines(Vec<String>),
}

impl FieldData {
    /// Number of rows
    pub fn len(&self) -> usize {
        match self {
            FieldData::Codes { codes, .. } => codes.len(),
            FieldData::Lines(lines) => lines.len(),
        }
    }

    /// True if there are no rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serialize the rows in their on-disk layout
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        match self {
            FieldData::Codes {
                arr_type: ArrType::Uint8,
                codes,
            } => {
                for &code in codes {
                    writer.write_u8(code as u8)?;
                }
            }
            FieldData::Codes {
                arr_type: ArrType::Uint16,
                codes,
            } => {
                for &code in codes {
                    writer.write_u16::<LittleEndian>(code)?;
                }
            }
            FieldData::Lines(lines) => {
                for line in lines {
                    writer.write_all(line.as_bytes())?;
                    writer.write_all(b"\n")?;
                }
            }
        }
        Ok(())
    }

    /// On-disk bytes of the field
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        // writing into a Vec cannot fail
        let _ = self.write_to(&mut bytes);
        bytes
    }
}

/// Schema plus data of one metadata column
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedField {
    /// Descriptor written to the schema sidecar
    pub schema: FieldSchema,
    /// Row payload written to `<name>.bin`
    pub data: FieldData,
}

fn numeric_field<T: Copy + PartialOrd>(
    schema: &mut FieldSchema,
    result: Discretized<T>,
    wrap: impl Fn(Vec<T>) -> BinValues,
) -> FieldData {
    schema.bin_method = Some(result.method());
    match result.scheme {
        BinScheme::Raw { values } => schema.values = Some(wrap(values)),
        BinScheme::Quantiles { breaks } => schema.breaks = Some(wrap(breaks)),
    }
    schema.bin_counts = result.bin_counts;
    schema.arr_type = Some(ArrType::Uint8);
    FieldData::Codes {
        arr_type: ArrType::Uint8,
        codes: result.bins.into_iter().map(u16::from).collect(),
    }
}

fn distinct_count(values: &[String]) -> usize {
    values
        .iter()
        .map(String::as_str)
        .collect::<std::collections::HashSet<_>>()
        .len()
}

/// Infer the type of a column and encode it.
pub fn encode_column(column: &Column, options: &FieldOptions<'_>) -> Result<EncodedField, FieldError> {
    let name = clean_field_name(&column.name);
    if name.is_empty() {
        return Err(FieldError::EmptyFieldName {
            label: column.name.clone(),
        });
    }

    let inferred = infer_column(&column.values, options.force_enum);
    let mut schema = FieldSchema::new(name, column.name.clone(), inferred.field_type());
    schema.opt = options.opt.clone();

    let data = match inferred {
        InferredColumn::Int(values) => {
            let data = numeric_field(&mut schema, discretize(&values), BinValues::Int);
            schema.diff_val_count = distinct_count(&column.values);
            data
        }
        InferredColumn::Float(values) => {
            let data = numeric_field(&mut schema, discretize(&values), BinValues::Float);
            schema.diff_val_count = distinct_count(&column.values);
            data
        }
        InferredColumn::UniqueString => {
            if let Some(row) = column.values.iter().position(|v| v.contains(['\n', '\r'])) {
                return Err(FieldError::LineBreakInValue {
                    field: column.name.clone(),
                    row,
                });
            }
            schema.diff_val_count = column.values.len();
            schema.max_size = Some(column.values.iter().map(String::len).max().unwrap_or(0));
            FieldData::Lines(column.values.clone())
        }
        InferredColumn::Enum => {
            let enc = encode_categories(&column.name, &column.values, options.colors)?;
            schema.diff_val_count = enc.labels.len();
            schema.values = Some(BinValues::Labels(enc.labels));
            schema.bin_counts = enc.counts;
            schema.arr_type = Some(enc.arr_type);
            schema.colors = enc.colors;
            FieldData::Codes {
                arr_type: enc.arr_type,
                codes: enc.codes,
            }
        }
    };

    Ok(EncodedField { schema, data })
}

/// Read a field's bytes back using its schema.
pub fn decode_field(schema: &FieldSchema, bytes: &[u8]) -> Result<FieldData, FieldError> {
    if schema.field_type == FieldType::UniqueString {
        if bytes.is_empty() && schema.diff_val_count == 0 {
            return Ok(FieldData::Lines(Vec::new()));
        }
        let body = bytes.strip_suffix(b"\n").ok_or_else(|| {
            FieldError::InvalidData(format!("{}: last value is not newline-terminated", schema.name))
        })?;
        let lines: Vec<String> = body
            .split(|&b| b == b'\n')
            .map(|line| String::from_utf8_lossy(line).into_owned())
            .collect();
        if lines.len() != schema.diff_val_count {
            return Err(FieldError::InvalidData(format!(
                "{}: expected {} rows, found {}",
                schema.name,
                schema.diff_val_count,
                lines.len()
            )));
        }
        return Ok(FieldData::Lines(lines));
    }

    let arr_type = schema.arr_type.ok_or_else(|| {
        FieldError::InvalidData(format!("{}: schema has no arrType", schema.name))
    })?;
    let width = arr_type.byte_width();
    if bytes.len() % width != 0 {
        return Err(FieldError::InvalidData(format!(
            "{}: {} bytes is not a multiple of {}",
            schema.name,
            bytes.len(),
            width
        )));
    }
    let rows = bytes.len() / width;
    if rows as u64 != schema.binned_row_count() {
        return Err(FieldError::InvalidData(format!(
            "{}: expected {} rows, found {}",
            schema.name,
            schema.binned_row_count(),
            rows
        )));
    }

    let mut cursor = Cursor::new(bytes);
    let mut codes = Vec::with_capacity(rows);
    for _ in 0..rows {
        let code = match arr_type {
            ArrType::Uint8 => u16::from(cursor.read_u8()?),
            ArrType::Uint16 => cursor.read_u16::<LittleEndian>()?,
        };
        codes.push(code);
    }
    Ok(FieldData::Codes { arr_type, codes })
}

/// Write a field's binary file into `dir` atomically; returns its size.
pub fn write_field<P: AsRef<Path>>(dir: P, field: &EncodedField) -> Result<u64, FieldError> {
    let path = dir.as_ref().join(field.schema.file_name());
    let mut file = AtomicFile::create(&path)?;
    field.data.write_to(&mut file)?;
    Ok(file.commit()?)
}
