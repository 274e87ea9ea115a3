use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::FieldError;

/// Semantic type of a metadata field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    /// Every value is an integer literal
    Int,
    /// Every value is a float literal and there are more than 10 distinct values
    Float,
    /// Categorical values, coded by descending frequency
    Enum,
    /// Every value is distinct (e.g. sample identifiers)
    UniqueString,
}

impl FieldType {
    /// True for `int` and `float`
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Int | FieldType::Float)
    }
}

/// How a numeric field was binned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinMethod {
    /// One bin per distinct value
    Raw,
    /// Ten decile-style bins over the distinct values
    Quantiles,
}

/// Element type of a fixed-width binary field, named like JavaScript typed arrays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArrType {
    /// One byte per row
    Uint8,
    /// Two bytes per row, little-endian
    Uint16,
}

impl ArrType {
    /// Bytes per value
    pub fn byte_width(&self) -> usize {
        match self {
            ArrType::Uint8 => 1,
            ArrType::Uint16 => 2,
        }
    }

    /// Smallest type that can hold `count` distinct codes.
    ///
    /// Up to 255 values fit one byte, up to 65535 two bytes; anything larger
    /// cannot be represented.
    pub fn for_category_count(field: &str, count: usize) -> Result<Self, FieldError> {
        match count {
            0..=255 => Ok(ArrType::Uint8),
            256..=65535 => Ok(ArrType::Uint16),
            _ => Err(FieldError::TooManyCategories {
                field: field.to_string(),
                count,
            }),
        }
    }
}

/// Bin boundaries or labels of a field.
///
/// Serialized as a plain JSON array; the variant follows the field type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BinValues {
    /// Integer values or breaks
    Int(Vec<i64>),
    /// Float values or breaks
    Float(Vec<f64>),
    /// Enum labels, in code order
    Labels(Vec<String>),
}

impl BinValues {
    /// Number of entries
    pub fn len(&self) -> usize {
        match self {
            BinValues::Int(v) => v.len(),
            BinValues::Float(v) => v.len(),
            BinValues::Labels(v) => v.len(),
        }
    }

    /// True if there are no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Descriptor of one metadata field, as listed in `fields.json` and in the
/// `metaFields` array of the dataset descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    /// File-system safe name (ASCII alphanumerics of the label)
    pub name: String,

    /// Original header text
    pub label: String,

    /// Inferred field type
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Binning method (numeric fields only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin_method: Option<BinMethod>,

    /// Eleven bin bounds (quantile-binned fields only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breaks: Option<BinValues>,

    /// Literal bin values (raw-binned fields) or labels (enum fields)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<BinValues>,

    /// Number of rows per bin
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bin_counts: Vec<u64>,

    /// Element type of the binary file (absent for unique strings)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arr_type: Option<ArrType>,

    /// Number of distinct values in the column
    pub diff_val_count: usize,

    /// Label to hex color, only when a color table matched at least one label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<BTreeMap<String, String>>,

    /// Longest value in bytes (unique strings only); a buffer size hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<usize>,

    /// Per-field display options passed through from the dataset config
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opt: Option<serde_json::Value>,
}

impl FieldSchema {
    /// Schema skeleton with no binning information
    pub fn new(name: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            field_type,
            bin_method: None,
            breaks: None,
            values: None,
            bin_counts: Vec::new(),
            arr_type: None,
            diff_val_count: 0,
            colors: None,
            max_size: None,
            opt: None,
        }
    }

    /// Number of rows described by the bin counts
    pub fn binned_row_count(&self) -> u64 {
        self.bin_counts.iter().sum()
    }

    /// Name of the binary file holding this field
    pub fn file_name(&self) -> String {
        format!("{}.bin", self.name)
    }
}

/// Reduce a header label to its ASCII alphanumeric characters.
pub fn clean_field_name(label: &str) -> String {
    label.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arr_type_boundaries() {
        assert_eq!(ArrType::for_category_count("f", 255).unwrap(), ArrType::Uint8);
        assert_eq!(ArrType::for_category_count("f", 256).unwrap(), ArrType::Uint16);
        assert_eq!(ArrType::for_category_count("f", 65535).unwrap(), ArrType::Uint16);
        assert!(matches!(
            ArrType::for_category_count("f", 65536),
            Err(FieldError::TooManyCategories { count: 65536, .. })
        ));
    }

    #[test]
    fn test_clean_field_name() {
        assert_eq!(clean_field_name("Cell type (major)"), "Celltypemajor");
        assert_eq!(clean_field_name("nUMI"), "nUMI");
        assert_eq!(clean_field_name("%%"), "");
    }

    #[test]
    fn test_schema_json_keys() {
        let mut schema = FieldSchema::new("cluster", "Cluster", FieldType::Enum);
        schema.values = Some(BinValues::Labels(vec!["a".into(), "b".into()]));
        schema.bin_counts = vec![2, 1];
        schema.arr_type = Some(ArrType::Uint8);
        schema.diff_val_count = 2;

        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["type"], "enum");
        assert_eq!(json["arrType"], "Uint8");
        assert_eq!(json["diffValCount"], 2);
        assert_eq!(json["binCounts"], serde_json::json!([2, 1]));
        assert!(json.get("binMethod").is_none());
        assert!(json.get("colors").is_none());

        let restored: FieldSchema = serde_json::from_value(json).unwrap();
        assert_eq!(restored, schema);
    }

    #[test]
    fn test_bin_values_untagged() {
        let ints: BinValues = serde_json::from_str("[1, 2, 3]").unwrap();
        assert_eq!(ints, BinValues::Int(vec![1, 2, 3]));
        let floats: BinValues = serde_json::from_str("[1.5, 2.0]").unwrap();
        assert_eq!(floats, BinValues::Float(vec![1.5, 2.0]));
        let labels: BinValues = serde_json::from_str("[\"a\"]").unwrap();
        assert_eq!(labels, BinValues::Labels(vec!["a".into()]));
    }
}
