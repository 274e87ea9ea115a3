//! Parsing, quantization and ordered writing of coordinates.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::CoordError;
use crate::output::AtomicFile;
use crate::table;

/// Largest value of a quantized coordinate
pub const SCALED_MAX: f64 = 65535.0;

const MAX_REPORTED_SAMPLES: usize = 10;

/// Storage type of `coords.bin`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordEncoding {
    /// Coordinates scaled onto `0..=65535`
    Uint16,
    /// Raw coordinates as 32-bit floats
    Float32,
}

/// How coordinates are stored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordOptions {
    /// Quantize to two bytes per axis instead of storing floats
    pub use_two_bytes: bool,
    /// Mirror the y axis, as R plots do
    pub flip_y: bool,
}

impl CoordOptions {
    /// Storage type these options produce
    pub fn encoding(&self) -> CoordEncoding {
        if self.use_two_bytes {
            CoordEncoding::Uint16
        } else {
            CoordEncoding::Float32
        }
    }
}

/// Axis extrema
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Smallest x
    pub min_x: f64,
    /// Largest x
    pub max_x: f64,
    /// Smallest y
    pub min_y: f64,
    /// Largest y
    pub max_y: f64,
}

impl Bounds {
    fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    fn update(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
    }
}

/// Coordinates as read from the input, in file order
#[derive(Debug, Clone, PartialEq)]
pub struct RawCoords {
    /// `(sampleId, x, y)`
    pub points: Vec<(String, f64, f64)>,
    /// Extrema over all points
    pub bounds: Bounds,
}

/// Parse a `sampleId, x, y` table; the header line is skipped.
pub fn read_coords_from_reader<R: Read>(
    reader: R,
    delimiter: u8,
    source_name: &str,
) -> Result<RawCoords, CoordError> {
    let mut csv_reader = table::csv_reader(reader, delimiter);
    let mut points = Vec::new();
    let mut bounds = Bounds::empty();

    for (i, record) in csv_reader.byte_records().enumerate().skip(1) {
        let record = record?;
        let line = i as u64 + 1;
        if record.len() != 3 {
            return Err(CoordError::ColumnCount {
                source_name: source_name.to_string(),
                line,
                found: record.len(),
            });
        }
        let parse = |cell: &[u8]| {
            let text = String::from_utf8_lossy(cell);
            text.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| CoordError::InvalidNumber {
                    source_name: source_name.to_string(),
                    line,
                    value: text.to_string(),
                })
        };
        let x = parse(&record[1])?;
        let y = parse(&record[2])?;
        bounds.update(x, y);
        points.push((String::from_utf8_lossy(&record[0]).into_owned(), x, y));
    }

    if points.is_empty() {
        return Err(CoordError::Empty(source_name.to_string()));
    }
    Ok(RawCoords { points, bounds })
}

/// Parse a coordinate file (`.gz` and `.csv` aware).
pub fn read_coords<P: AsRef<Path>>(path: P) -> Result<RawCoords, CoordError> {
    let path = path.as_ref();
    info!("Parsing coordinates from {}", path.display());
    read_coords_from_reader(
        table::open_text(path)?,
        table::delimiter_for(path),
        &path.display().to_string(),
    )
}

fn axis_scale(min: f64, max: f64) -> f64 {
    let span = max - min;
    if span > 0.0 {
        SCALED_MAX / span
    } else {
        0.0
    }
}

/// Coordinates keyed by sample, ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateSet {
    /// Storage type
    pub encoding: CoordEncoding,
    /// Stored `(x, y)` per sample; integral values when quantized
    pub coords: HashMap<String, (f64, f64)>,
}

/// Scale (or keep) and optionally flip the coordinates.
///
/// Quantized values are `round(65535 / (max - min) * (v - min))` per axis;
/// an axis without spread maps to 0.
pub fn quantize(raw: &RawCoords, options: CoordOptions) -> CoordinateSet {
    let b = raw.bounds;
    let (scale_x, scale_y) = (axis_scale(b.min_x, b.max_x), axis_scale(b.min_y, b.max_y));

    let coords = raw
        .points
        .iter()
        .map(|(id, x, y)| {
            let point = if options.use_two_bytes {
                let qx = (scale_x * (x - b.min_x)).round();
                let qy = (scale_y * (y - b.min_y)).round();
                (qx, if options.flip_y { SCALED_MAX - qy } else { qy })
            } else {
                (*x, if options.flip_y { b.max_y - y } else { *y })
            };
            (id.clone(), point)
        })
        .collect();

    CoordinateSet {
        encoding: options.encoding(),
        coords,
    }
}

/// Extrema of the stored values and their type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordStats {
    /// Smallest stored x
    pub min_x: f64,
    /// Largest stored x
    pub max_x: f64,
    /// Smallest stored y
    pub min_y: f64,
    /// Largest stored y
    pub max_y: f64,
    /// Storage type
    #[serde(rename = "type")]
    pub encoding: CoordEncoding,
}

/// Result of writing one coordinate set
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenCoords {
    /// Stats record for the descriptor
    pub stats: CoordStats,
    /// Samples without coordinates, written as `(0, 0)`
    pub missing: usize,
    /// Stored x values in sample order
    pub xs: Vec<f64>,
    /// Stored y values in sample order
    pub ys: Vec<f64>,
}

/// Write one record per sample of `sample_names`, in that order.
pub fn write_coords<P: AsRef<Path>>(
    set: &CoordinateSet,
    sample_names: &[String],
    path: P,
) -> Result<WrittenCoords, CoordError> {
    let path = path.as_ref();
    let mut file = AtomicFile::create(path)?;
    let mut bounds = Bounds::empty();
    let mut xs = Vec::with_capacity(sample_names.len());
    let mut ys = Vec::with_capacity(sample_names.len());
    let mut missing = Vec::new();

    for name in sample_names {
        let (x, y) = match set.coords.get(name) {
            Some(&point) => point,
            None => {
                missing.push(name.as_str());
                (0.0, 0.0)
            }
        };
        match set.encoding {
            CoordEncoding::Uint16 => {
                file.write_u16::<LittleEndian>(x as u16)?;
                file.write_u16::<LittleEndian>(y as u16)?;
            }
            CoordEncoding::Float32 => {
                file.write_f32::<LittleEndian>(x as f32)?;
                file.write_f32::<LittleEndian>(y as f32)?;
            }
        }
        bounds.update(x, y);
        xs.push(x);
        ys.push(y);
    }
    file.commit()?;

    if !missing.is_empty() {
        warn!(
            "{}: {} samples are in the meta data but not in the coordinate file, placed at (0,0); examples: {}",
            path.display(),
            missing.len(),
            missing[..missing.len().min(MAX_REPORTED_SAMPLES)].join(", ")
        );
    }
    info!("Wrote {} coordinates to {}", sample_names.len(), path.display());

    if sample_names.is_empty() {
        bounds = Bounds {
            min_x: 0.0,
            max_x: 0.0,
            min_y: 0.0,
            max_y: 0.0,
        };
    }
    Ok(WrittenCoords {
        stats: CoordStats {
            min_x: bounds.min_x,
            max_x: bounds.max_x,
            min_y: bounds.min_y,
            max_y: bounds.max_y,
            encoding: set.encoding,
        },
        missing: missing.len(),
        xs,
        ys,
    })
}
