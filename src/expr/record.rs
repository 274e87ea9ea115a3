//! Compressed per-gene expression records.
//!
//! Before compression a record is laid out as
//!
//! ```text
//! [u16 LE symbol length][symbol bytes][n x 4-byte LE values]
//! ```
//!
//! with values stored as `i32` or `f32` depending on the [`MatrixType`].
//! Every record is an independent zlib stream, so one gene can be decoded
//! without touching any other.

use std::io::{Cursor, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use super::matrix::MatrixType;
use super::ExprError;

/// Default zlib compression level
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Typed values of one gene
#[derive(Debug, Clone, PartialEq)]
pub enum ExprValues {
    /// Integer counts
    Int32(Vec<i32>),
    /// Float values
    Float32(Vec<f32>),
}

impl ExprValues {
    /// Number of samples
    pub fn len(&self) -> usize {
        match self {
            ExprValues::Int32(v) => v.len(),
            ExprValues::Float32(v) => v.len(),
        }
    }

    /// True if there are no values
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values widened to `f64`
    pub fn to_f64(&self) -> Vec<f64> {
        match self {
            ExprValues::Int32(v) => v.iter().map(|&x| f64::from(x)).collect(),
            ExprValues::Float32(v) => v.iter().map(|&x| f64::from(x)).collect(),
        }
    }
}

/// A decoded expression record
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionRecord {
    /// Gene symbol embedded in the record
    pub symbol: String,
    /// One value per sample
    pub values: ExprValues,
}

fn to_i32(symbol: &str, value: f64) -> Result<i32, ExprError> {
    if value.fract() != 0.0 || value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
        return Err(ExprError::NonIntegerValue {
            symbol: symbol.to_string(),
            value,
        });
    }
    Ok(value as i32)
}

/// Lay out a record without compressing it.
pub fn pack_record(symbol: &str, values: &[f64], matrix_type: MatrixType) -> Result<Vec<u8>, ExprError> {
    let length = u16::try_from(symbol.len()).map_err(|_| ExprError::SymbolTooLong {
        length: symbol.len(),
    })?;

    let mut buf = Vec::with_capacity(2 + symbol.len() + 4 * values.len());
    buf.write_u16::<LittleEndian>(length)?;
    buf.extend_from_slice(symbol.as_bytes());
    match matrix_type {
        MatrixType::Int32 => {
            for &value in values {
                buf.write_i32::<LittleEndian>(to_i32(symbol, value)?)?;
            }
        }
        MatrixType::Float32 => {
            for &value in values {
                buf.write_f32::<LittleEndian>(value as f32)?;
            }
        }
    }
    Ok(buf)
}

/// Build and zlib-compress one record.
pub fn encode_record(
    symbol: &str,
    values: &[f64],
    matrix_type: MatrixType,
    level: u32,
) -> Result<Vec<u8>, ExprError> {
    let raw = pack_record(symbol, values, matrix_type)?;
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(raw.len() / 2), Compression::new(level));
    encoder.write_all(&raw)?;
    Ok(encoder.finish()?)
}

/// Inflate and parse one record.
pub fn decode_record(compressed: &[u8], matrix_type: MatrixType) -> Result<ExpressionRecord, ExprError> {
    let mut raw = Vec::new();
    ZlibDecoder::new(compressed)
        .read_to_end(&mut raw)
        .map_err(|e| ExprError::InvalidRecord(format!("zlib stream: {}", e)))?;

    let mut cursor = Cursor::new(raw.as_slice());
    let length = cursor
        .read_u16::<LittleEndian>()
        .map_err(|_| ExprError::InvalidRecord("record shorter than its length prefix".to_string()))?
        as usize;
    let body = &raw[2..];
    if body.len() < length {
        return Err(ExprError::InvalidRecord(format!(
            "symbol length {} exceeds record size {}",
            length,
            raw.len()
        )));
    }
    let symbol = String::from_utf8_lossy(&body[..length]).into_owned();

    let data = &body[length..];
    if data.len() % 4 != 0 {
        return Err(ExprError::InvalidRecord(format!(
            "'{}': {} value bytes is not a multiple of 4",
            symbol,
            data.len()
        )));
    }
    let count = data.len() / 4;
    let mut cursor = Cursor::new(data);
    let values = match matrix_type {
        MatrixType::Int32 => {
            let mut values = vec![0i32; count];
            cursor.read_i32_into::<LittleEndian>(&mut values)?;
            ExprValues::Int32(values)
        }
        MatrixType::Float32 => {
            let mut values = vec![0f32; count];
            cursor.read_f32_into::<LittleEndian>(&mut values)?;
            ExprValues::Float32(values)
        }
    };

    Ok(ExpressionRecord { symbol, values })
}
