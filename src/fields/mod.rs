//! # Metadata fields
//!
//! Turns each column of the metadata table into a compact binary file the
//! client can load with a single typed-array view:
//!
//! 1. [`infer`] classifies the column as `int`, `float`, `enum` or
//!    `uniqueString`.
//! 2. Numeric columns are binned by [`discretize`] (raw values or ten
//!    quantile bins), enum columns coded by [`category`] (most frequent
//!    label first).
//! 3. [`codec`] packs the codes (or raw strings) and can read them back.
//! 4. [`meta`] drives the whole table and writes the `fields.json` sidecar.
//!
//! ```rust
//! use cellpack::fields::{encode_column, FieldOptions, FieldType};
//! use cellpack::table::Column;
//!
//! let column = Column::new("cluster", vec!["a".into(), "a".into(), "b".into()]);
//! let field = encode_column(&column, &FieldOptions::default())?;
//! assert_eq!(field.schema.field_type, FieldType::Enum);
//! assert_eq!(field.data.to_bytes(), vec![0, 0, 1]);
//! # Ok::<(), cellpack::fields::FieldError>(())
//! ```

pub mod category;
pub mod codec;
pub mod discretize;
mod error;
pub mod infer;
pub mod meta;
mod types;


pub use category::{encode_categories, CategoryEncoding, ColorTable, PLACEHOLDER_COLOR};
pub use codec::{decode_field, encode_column, write_field, EncodedField, FieldData, FieldOptions};
pub use discretize::{discretize, BinScheme, Discretized, MAX_BINS};
pub use error::FieldError;
pub use infer::{infer_column, infer_field_type, InferredColumn};
pub use meta::{write_meta_fields, MetaOptions, FIELDS_JSON};
pub use types::{clean_field_name, ArrType, BinMethod, BinValues, FieldSchema, FieldType};
